//! Eligibility and approval switches of the admin tables.

use crate::auth::AdminSession;
use crate::eligibility::success_toast;
use crate::services::crud::{self, respond, Action, Entity, Messages};
use crate::state::AppState;
use crate::store::Row;
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use common::model::student::Student;
use common::model::toast::PageResponse;
use common::requests::{EligibilityRequest, ToggleRequest};
use log::error;
use serde_json::Value;

/// `PUT /{id}/eligibility`: sends `!current` to the eligibility endpoint.
pub async fn eligibility(
    _admin: AdminSession,
    state: web::Data<AppState>,
    id: web::Path<i64>,
    toggle: web::Json<ToggleRequest>,
) -> HttpResponse {
    let id = id.into_inner();
    let eligible = !toggle.current;
    match state.eligibility.set(id, eligible).await {
        Ok(()) => HttpResponse::Ok().json(PageResponse::with_toast(
            Some(EligibilityRequest { eligible }),
            success_toast(eligible),
        )),
        Err(e) => {
            error!("eligibility of student {} not updated: {}", id, e);
            HttpResponse::build(StatusCode::BAD_GATEWAY)
                .json(PageResponse::<()>::with_toast(None, e.toast()))
        }
    }
}

/// `PUT /{id}/approval`: flips `certificate_approved` through the store.
pub async fn approval(
    _admin: AdminSession,
    state: web::Data<AppState>,
    id: web::Path<i64>,
    toggle: web::Json<ToggleRequest>,
) -> HttpResponse {
    let approved = !toggle.current;
    let messages = Messages {
        updated: if approved {
            "Certificate approved successfully."
        } else {
            "Certificate approval revoked."
        },
        update_failed: "Failed to update certificate approval.",
        ..Student::MESSAGES
    };
    let mut changes = Row::new();
    changes.insert("certificate_approved".to_string(), Value::Bool(approved));
    let result = crud::update_columns::<Student>(state.store.as_ref(), id.into_inner(), changes).await;
    respond(result, &messages, Action::Update)
}
