//! `/api/me`: the student pages (dashboard, certificates, downloads,
//! student info, company info).

use crate::auth::StudentSession;
use crate::certificates::preview::{certificate_file_name, fetch_pdf, preview};
use crate::errors::PortalError;
use crate::services::crud::{self, Entity};
use crate::state::AppState;
use crate::store::{decode_row, select_single, Filter, Query, Row};
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::http::StatusCode;
use actix_web::web::{get, post, scope};
use actix_web::{web, HttpResponse, Scope};
use common::model::college::College;
use common::model::company::Company;
use common::model::student::{Student, StudentView};
use common::model::toast::PageResponse;
use log::{error, info};
use serde_json::Value;

async fn load_student(state: &AppState, student_id: i64) -> Result<Student, PortalError> {
    let row = select_single(
        state.store.as_ref(),
        Student::TABLE,
        Query::all()
            .columns(Student::LIST_COLUMNS)
            .filter(Filter::eq(Student::ID_COLUMN, student_id)),
    )
    .await?
    .ok_or_else(|| PortalError::NotFound(format!("Student {student_id}")))?;
    Ok(decode_row(row)?)
}

async fn profile(
    session: StudentSession,
    state: web::Data<AppState>,
) -> Result<HttpResponse, PortalError> {
    let student = load_student(&state, session.student_id).await?;
    let college_name = match student.college_id {
        Some(id) => select_single(
            state.store.as_ref(),
            College::TABLE,
            Query::all()
                .columns(&["college_id", "college_name"])
                .filter(Filter::eq(College::ID_COLUMN, id)),
        )
        .await?
        .map(decode_row::<College>)
        .transpose()?
        .map(|c| c.college_name),
        None => None,
    };
    Ok(HttpResponse::Ok().json(PageResponse::data(StudentView::from_student(
        student,
        college_name,
    ))))
}

async fn companies(
    _session: StudentSession,
    state: web::Data<AppState>,
) -> Result<HttpResponse, PortalError> {
    let companies = crud::list::<Company>(state.store.as_ref(), None).await?;
    Ok(HttpResponse::Ok().json(PageResponse::data(companies)))
}

async fn preview_certificate(session: StudentSession, state: web::Data<AppState>) -> HttpResponse {
    match preview(&state, session.student_id).await {
        Ok(preview) => {
            let toast = preview.toast();
            HttpResponse::Ok().json(PageResponse::with_toast(Some(preview), toast))
        }
        Err(e) => {
            error!("preview for student {} failed: {}", session.student_id, e);
            HttpResponse::build(StatusCode::UNPROCESSABLE_ENTITY)
                .json(PageResponse::<()>::with_toast(None, e.toast()))
        }
    }
}

/// The certificate PDF as an attachment; counts the download.
///
/// The count is read and written back as two store calls, so concurrent
/// downloads of the same student can lose an increment.
async fn download_certificate(session: StudentSession, state: web::Data<AppState>) -> HttpResponse {
    let id = session.student_id;
    let pdf = match fetch_pdf(&state, id).await {
        Ok(pdf) => pdf,
        Err(e) => {
            error!("download for student {} failed: {}", id, e);
            return HttpResponse::build(StatusCode::UNPROCESSABLE_ENTITY)
                .json(PageResponse::<()>::with_toast(None, e.toast()));
        }
    };

    let counted = async {
        let student = load_student(&state, id).await?;
        let mut changes = Row::new();
        changes.insert(
            "downloaded_count".to_string(),
            Value::from(student.downloaded_count + 1),
        );
        crud::update_columns::<Student>(state.store.as_ref(), id, changes).await
    }
    .await;
    match counted {
        Ok(student) => info!("student {} downloaded certificate ({})", id, student.downloaded_count),
        Err(e) => error!("download count of student {} not updated: {}", id, e),
    }

    let file_name = certificate_file_name(&pdf.student_name);
    HttpResponse::Ok()
        .content_type("application/pdf")
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(file_name)],
        })
        .body(pdf.bytes)
}

pub fn configure_routes() -> Scope {
    scope("/me")
        .route("", get().to(profile))
        .route("/companies", get().to(companies))
        .route("/certificate", get().to(download_certificate))
        .route("/certificate/preview", post().to(preview_certificate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Session;
    use crate::services;
    use actix_web::{test, App};
    use serde_json::json;

    async fn seed(state: &AppState, eligible: bool) -> i64 {
        let row = json!({
            "name": "Asha",
            "phone_number": "9000000001",
            "eligible": eligible,
            "certificate_approved": true,
            "certificate": "data:image/png;base64,iVBORw==",
        });
        let stored = state
            .store
            .insert("students", row.as_object().unwrap().clone())
            .await
            .unwrap();
        stored["student_id"].as_i64().unwrap()
    }

    #[actix_web::test]
    async fn downloads_are_counted() {
        let state = AppState::for_tests();
        let id = seed(&state, true).await;
        let token = state.sessions.create(Session::student(id)).await;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .configure(services::configure),
        )
        .await;

        for _ in 0..2 {
            let req = test::TestRequest::get()
                .uri("/api/me/certificate")
                .insert_header(("Authorization", format!("Bearer {token}")))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::OK);
            assert_eq!(
                resp.headers().get("content-disposition").unwrap(),
                "attachment; filename=\"Asha_certificate.pdf\""
            );
            assert_eq!(test::read_body(resp).await.as_ref(), b"%PDF-1.3 test");
        }

        let req = test::TestRequest::get()
            .uri("/api/me")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_request();
        let body: PageResponse<StudentView> = test::call_and_read_body_json(&app, req).await;
        let view = body.data.unwrap();
        assert_eq!(view.downloaded_count, 2);
        assert_eq!(view.certificates.len(), 1);
    }

    #[actix_web::test]
    async fn ineligible_students_get_the_not_eligible_toast() {
        let state = AppState::for_tests();
        let id = seed(&state, false).await;
        let token = state.sessions.create(Session::student(id)).await;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .configure(services::configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/me/certificate/preview")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: PageResponse<()> = test::read_body_json(resp).await;
        assert_eq!(body.toast.unwrap().title, "Not Eligible");
    }

    #[actix_web::test]
    async fn admins_have_no_student_pages() {
        let state = AppState::for_tests();
        let token = state.sessions.create(Session::admin()).await;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .configure(services::configure),
        )
        .await;
        let req = test::TestRequest::get()
            .uri("/api/me")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
    }
}
