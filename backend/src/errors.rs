use crate::store::StoreError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use common::model::toast::{PageResponse, Toast};
use thiserror::Error;

pub const UNEXPECTED_MESSAGE: &str = "An unexpected error occurred.";

#[derive(Error, Debug)]
pub enum PortalError {
    /// A required field is missing or a payload was rejected before any remote call.
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Missing or invalid session")]
    Unauthorized,

    /// A login attempt with an unknown key or phone number.
    #[error("{0}")]
    InvalidCredentials(String),

    #[error("This page is not available for your role")]
    Forbidden,

    #[error("{0}")]
    Conflict(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unexpected Error: {0}")]
    Unexpected(String),
}

impl PortalError {
    /// Whether the error falls in the "unexpected" category, as opposed to a
    /// validation or remote-store failure the pages have a message for.
    pub fn is_unexpected(&self) -> bool {
        match self {
            PortalError::Store(err) => !err.is_remote(),
            PortalError::Config(_) | PortalError::Unexpected(_) => true,
            _ => false,
        }
    }
}

impl ResponseError for PortalError {
    fn status_code(&self) -> StatusCode {
        match self {
            PortalError::Validation(_) => StatusCode::BAD_REQUEST,
            PortalError::Unauthorized | PortalError::InvalidCredentials(_) => {
                StatusCode::UNAUTHORIZED
            }
            PortalError::Forbidden => StatusCode::FORBIDDEN,
            PortalError::NotFound(_) => StatusCode::NOT_FOUND,
            PortalError::Conflict(_) => StatusCode::CONFLICT,
            PortalError::Store(err) if err.is_unique_violation() => StatusCode::CONFLICT,
            PortalError::Store(err) if err.is_remote() => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let description = if self.is_unexpected() {
            UNEXPECTED_MESSAGE.to_string()
        } else {
            self.to_string()
        };
        HttpResponse::build(self.status_code())
            .json(PageResponse::<()>::with_toast(None, Toast::error(description)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[test]
    fn statuses_follow_the_error_category() {
        let unique = PortalError::Store(StoreError::remote(Some("23505"), "duplicate key"));
        let remote = PortalError::Store(StoreError::remote(Some("23503"), "still referenced"));
        let transport = PortalError::Store(StoreError::Transport("timed out".into()));
        assert_eq!(unique.status_code(), StatusCode::CONFLICT);
        assert_eq!(remote.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(transport.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(transport.is_unexpected());
        assert!(!remote.is_unexpected());
        assert_eq!(
            PortalError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[actix_web::test]
    async fn unexpected_errors_hide_their_details() {
        let response = PortalError::Unexpected("stack trace".into()).error_response();
        let body = to_bytes(response.into_body()).await.unwrap();
        let page: PageResponse<()> = serde_json::from_slice(&body).unwrap();
        let toast = page.toast.unwrap();
        assert_eq!(toast.description, UNEXPECTED_MESSAGE);
        assert!(toast.is_error());
    }
}
