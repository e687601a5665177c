//! `/v1`: the eligibility endpoint, served by the portal itself.
//!
//! Answers `{ "success": true, "data": <student> }` on success and
//! `{ "error": ... }` otherwise, the contract [`crate::eligibility`] speaks.

use crate::state::AppState;
use crate::store::{decode_row, Filter, Row, StoreError, UNDEFINED_COLUMN};
use actix_web::http::StatusCode;
use actix_web::web::{put, scope};
use actix_web::{web, HttpResponse, Scope};
use common::model::student::Student;
use common::requests::{EligibilityErrorBody, EligibilityRequest};
use log::{error, info};
use serde::Serialize;
use serde_json::Value;

#[derive(Serialize)]
struct Updated {
    success: bool,
    data: Student,
}

fn failure(status: StatusCode, error: String) -> HttpResponse {
    HttpResponse::build(status).json(EligibilityErrorBody { error })
}

/// Store errors caused by triggers that still touch dropped columns.
fn is_trigger_error(err: &StoreError) -> bool {
    err.code() == Some(UNDEFINED_COLUMN) || err.to_string().contains("has no field")
}

async fn set_eligibility(
    state: web::Data<AppState>,
    id: web::Path<i64>,
    body: web::Json<EligibilityRequest>,
) -> HttpResponse {
    let id = id.into_inner();
    let mut changes = Row::new();
    changes.insert("eligible".to_string(), Value::Bool(body.eligible));

    let rows = match state
        .store
        .update("students", &Filter::eq("student_id", id), changes)
        .await
    {
        Ok(rows) => rows,
        Err(e) if is_trigger_error(&e) => {
            error!("eligibility trigger failure for student {}: {}", id, e);
            return failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database trigger error: {e}"),
            );
        }
        Err(e) => {
            error!("eligibility update for student {} failed: {}", id, e);
            return failure(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
        }
    };

    let Some(row) = rows.into_iter().next() else {
        return failure(StatusCode::NOT_FOUND, "Student not found".to_string());
    };
    match decode_row::<Student>(row) {
        Ok(student) => {
            info!("student {} eligible={}", id, student.eligible);
            HttpResponse::Ok().json(Updated {
                success: true,
                data: student,
            })
        }
        Err(e) => failure(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

pub fn configure_routes() -> Scope {
    scope("/v1").route("/students/{id}/eligibility", put().to(set_eligibility))
}
