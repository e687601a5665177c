//! `/api/session`: login and logout.
//!
//! Admins sign in with the configured admin key, students with the phone
//! number they were registered with. The session token is returned in the
//! body and set as an HTTP-only cookie.

use crate::auth::{CurrentSession, Session, SESSION_COOKIE};
use crate::errors::PortalError;
use crate::state::AppState;
use crate::store::{decode_row, select_single, Filter, Query};
use actix_web::cookie::Cookie;
use actix_web::web::{delete, post, scope};
use actix_web::{web, HttpResponse, Scope};
use common::model::session::{Role, SessionInfo};
use common::model::toast::{PageResponse, Toast};
use common::requests::LoginRequest;
use log::info;
use serde::Deserialize;

#[derive(Deserialize)]
struct LoginRow {
    student_id: i64,
    #[serde(default)]
    deleted: Option<bool>,
}

async fn authenticate(state: &AppState, request: &LoginRequest) -> Result<Session, PortalError> {
    match request {
        LoginRequest::Admin { key } => match &state.config.admin_key {
            Some(expected) if !expected.is_empty() && expected == key.trim() => Ok(Session::admin()),
            _ => Err(PortalError::InvalidCredentials("Invalid admin key.".to_string())),
        },
        LoginRequest::Student { phone_number } => {
            let phone = phone_number.trim();
            if phone.is_empty() {
                return Err(PortalError::Validation(
                    "Please enter your phone number.".to_string(),
                ));
            }
            let row = select_single(
                state.store.as_ref(),
                "students",
                Query::all()
                    .columns(&["student_id", "deleted"])
                    .filter(Filter::eq("phone_number", phone)),
            )
            .await?;
            match row.map(decode_row::<LoginRow>).transpose()? {
                Some(found) if !found.deleted.unwrap_or(false) => {
                    Ok(Session::student(found.student_id))
                }
                _ => Err(PortalError::InvalidCredentials(
                    "No student is registered with this phone number.".to_string(),
                )),
            }
        }
    }
}

async fn login(
    state: web::Data<AppState>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse, PortalError> {
    let session = authenticate(&state, &request).await?;
    let role: Role = session.role;
    let token = state.sessions.create(session).await;
    info!("{:?} signed in", role);

    let cookie = Cookie::build(SESSION_COOKIE, token.clone())
        .path("/")
        .http_only(true)
        .finish();
    let info = SessionInfo {
        token,
        role,
        home: role.home().to_string(),
    };
    Ok(HttpResponse::Ok().cookie(cookie).json(PageResponse::with_toast(
        Some(info),
        Toast::success("Signed in successfully."),
    )))
}

async fn logout(state: web::Data<AppState>, current: CurrentSession) -> HttpResponse {
    state.sessions.remove(&current.token).await;
    let mut cookie = Cookie::new(SESSION_COOKIE, "");
    cookie.set_path("/");
    cookie.make_removal();
    HttpResponse::Ok().cookie(cookie).json(PageResponse::<()>::with_toast(
        None,
        Toast::success("Signed out successfully."),
    ))
}

pub fn configure_routes() -> Scope {
    scope("/session")
        .route("", post().to(login))
        .route("", delete().to(logout))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use serde_json::json;

    #[actix_web::test]
    async fn admins_and_students_sign_in() {
        let state = AppState::for_tests();
        let mut row = crate::store::Row::new();
        row.insert("name".to_string(), json!("Asha"));
        row.insert("phone_number".to_string(), json!("9000000001"));
        state.store.insert("students", row).await.unwrap();

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .service(scope("/api").service(configure_routes())),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/session")
            .set_json(json!({ "role": "admin", "key": "admin-secret" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp
            .response()
            .cookies()
            .any(|c| c.name() == SESSION_COOKIE));
        let body: PageResponse<SessionInfo> = test::read_body_json(resp).await;
        let info = body.data.unwrap();
        assert_eq!(info.home, "/admin/dashboard");
        assert!(state.sessions.get(&info.token).await.is_some());

        let req = test::TestRequest::post()
            .uri("/api/session")
            .set_json(json!({ "role": "student", "phone_number": " 9000000001 " }))
            .to_request();
        let body: PageResponse<SessionInfo> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.data.unwrap().role, Role::Student);

        let req = test::TestRequest::delete()
            .uri("/api/session")
            .cookie(Cookie::new(SESSION_COOKIE, info.token.clone()))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
        assert!(state.sessions.get(&info.token).await.is_none());
    }

    #[actix_web::test]
    async fn wrong_credentials_are_rejected() {
        let state = AppState::for_tests();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .service(configure_routes()),
        )
        .await;

        for body in [
            json!({ "role": "admin", "key": "guess" }),
            json!({ "role": "student", "phone_number": "9999999999" }),
        ] {
            let req = test::TestRequest::post()
                .uri("/session")
                .set_json(body)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
            let body: PageResponse<()> = test::read_body_json(resp).await;
            assert!(body.toast.unwrap().is_error());
        }

        let req = test::TestRequest::delete().uri("/session").to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::UNAUTHORIZED
        );
    }
}
