use crate::auth::AdminSession;
use crate::services::crud::{self, respond, Action, Entity, Messages};
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use common::model::template::Template;
use common::requests::ToggleRequest;

/// `PUT /{id}/selection`: marks the template selected when `current` is false, and the reverse.
pub async fn process(
    _admin: AdminSession,
    state: web::Data<AppState>,
    id: web::Path<i64>,
    payload: web::Json<ToggleRequest>,
) -> HttpResponse {
    let messages = Messages {
        updated: if payload.current {
            "Template deselected successfully"
        } else {
            "Template selected successfully"
        },
        ..Template::MESSAGES
    };
    let result = crud::update::<Template>(state.store.as_ref(), id.into_inner(), &payload).await;
    respond(result, &messages, Action::Update)
}
