use crate::auth::AdminSession;
use crate::certificates::preview::preview;
use crate::state::AppState;
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use common::model::toast::PageResponse;
use log::error;

/// `POST /{id}/preview`: shows the certificate of one student to the admin.
pub async fn process(
    _admin: AdminSession,
    state: web::Data<AppState>,
    id: web::Path<i64>,
) -> HttpResponse {
    let id = id.into_inner();
    match preview(&state, id).await {
        Ok(preview) => {
            let toast = preview.toast();
            HttpResponse::Ok().json(PageResponse::with_toast(Some(preview), toast))
        }
        Err(e) => {
            error!("preview of student {} failed: {}", id, e);
            HttpResponse::build(StatusCode::UNPROCESSABLE_ENTITY)
                .json(PageResponse::<()>::with_toast(None, e.toast()))
        }
    }
}
