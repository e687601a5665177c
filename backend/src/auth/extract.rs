use super::session::Session;
use super::SESSION_COOKIE;
use crate::errors::PortalError;
use crate::state::AppState;
use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{web, FromRequest, HttpRequest};
use common::model::session::Role;
use futures_util::future::LocalBoxFuture;

/// Reads the session token from the session cookie or an `Authorization: Bearer` header.
pub fn session_token(req: &HttpRequest) -> Option<String> {
    if let Some(cookie) = req.cookie(SESSION_COOKIE) {
        return Some(cookie.value().to_string());
    }
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
}

fn lookup(req: &HttpRequest) -> LocalBoxFuture<'static, Result<(String, Session), PortalError>> {
    let token = session_token(req);
    let sessions = req
        .app_data::<web::Data<AppState>>()
        .map(|state| state.sessions.clone());
    Box::pin(async move {
        let sessions =
            sessions.ok_or_else(|| PortalError::Unexpected("application state missing".into()))?;
        let token = token.ok_or(PortalError::Unauthorized)?;
        let session = sessions.get(&token).await.ok_or(PortalError::Unauthorized)?;
        Ok((token, session))
    })
}

/// Any signed-in user.
#[derive(Debug, Clone)]
pub struct CurrentSession {
    pub token: String,
    pub session: Session,
}

impl FromRequest for CurrentSession {
    type Error = PortalError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let found = lookup(req);
        Box::pin(async move {
            let (token, session) = found.await?;
            Ok(CurrentSession { token, session })
        })
    }
}

/// A signed-in admin; other roles are answered with 403.
#[derive(Debug, Clone)]
pub struct AdminSession;

impl FromRequest for AdminSession {
    type Error = PortalError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let found = lookup(req);
        Box::pin(async move {
            match found.await?.1.role {
                Role::Admin => Ok(AdminSession),
                Role::Student => Err(PortalError::Forbidden),
            }
        })
    }
}

/// A signed-in student.
#[derive(Debug, Clone, Copy)]
pub struct StudentSession {
    pub student_id: i64,
}

impl FromRequest for StudentSession {
    type Error = PortalError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let found = lookup(req);
        Box::pin(async move {
            let (_, session) = found.await?;
            match (session.role, session.student_id) {
                (Role::Student, Some(student_id)) => Ok(StudentSession { student_id }),
                _ => Err(PortalError::Forbidden),
            }
        })
    }
}
