//! Client of the eligibility endpoint (`PUT {api_url}/v1/students/{id}/eligibility`).
//!
//! Eligibility is not written through the generic store: the endpoint runs
//! server-side hooks on the change. Its error bodies are `{ "error": ... }`.
//! Errors that point at a stale database trigger (references to dropped
//! columns) are a configuration problem of the deployment rather than of
//! the request, and get their own toast.

use common::model::toast::{Toast, ToastVariant};
use common::requests::{EligibilityErrorBody, EligibilityRequest};
use log::{info, warn};
use regex::Regex;
use reqwest::Client;
use std::sync::OnceLock;
use std::time::Duration;
use thiserror::Error;

const TRIGGER_ISSUE: &str = "Database trigger still references dropped columns. \
Remove the triggers referencing dropped columns from the database.";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EligibilityError {
    #[error("Database trigger error: {0}")]
    TriggerMisconfigured(String),

    #[error("{0}")]
    Rejected(String),

    #[error("{0}")]
    Transport(String),
}

impl EligibilityError {
    fn classify(message: String) -> Self {
        if trigger_pattern().is_match(&message) {
            EligibilityError::TriggerMisconfigured(message)
        } else {
            EligibilityError::Rejected(message)
        }
    }

    pub fn toast(&self) -> Toast {
        match self {
            EligibilityError::TriggerMisconfigured(_) => Toast::new(
                "Database Configuration Issue",
                TRIGGER_ISSUE,
                ToastVariant::Destructive,
            ),
            other => Toast::error(format!("Failed to update student eligibility: {other}")),
        }
    }
}

fn trigger_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)database trigger|has no field").expect("valid regex")
    })
}

pub fn success_toast(eligible: bool) -> Toast {
    let state = if eligible { "enabled" } else { "disabled" };
    Toast::success(format!("Student eligibility {state} successfully."))
}

#[derive(Clone)]
pub struct EligibilityClient {
    client: Client,
    base_url: String,
}

impl EligibilityClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, EligibilityError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EligibilityError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Sets the eligibility of `student_id` to `eligible`.
    pub async fn set(&self, student_id: i64, eligible: bool) -> Result<(), EligibilityError> {
        let url = format!("{}/v1/students/{}/eligibility", self.base_url, student_id);
        let response = self
            .client
            .put(&url)
            .json(&EligibilityRequest { eligible })
            .send()
            .await
            .map_err(|e| EligibilityError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            info!("student {} eligibility set to {}", student_id, eligible);
            return Ok(());
        }

        let text = response.text().await.unwrap_or_default();
        warn!("eligibility endpoint answered {}: {}", status, text);
        let message = serde_json::from_str::<EligibilityErrorBody>(&text)
            .map(|body| body.error)
            .unwrap_or_else(|_| {
                format!("HTTP {}: Failed to update eligibility", status.as_u16())
            });
        Err(EligibilityError::classify(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{web, App, HttpResponse, HttpServer};
    use serde_json::{json, Value};
    use std::sync::Mutex;

    type Seen = web::Data<Mutex<Vec<(String, Value)>>>;

    async fn record(req: actix_web::HttpRequest, body: web::Json<Value>, seen: Seen) -> HttpResponse {
        seen.lock()
            .unwrap()
            .push((req.path().to_string(), body.into_inner()));
        match req.match_info().get("id") {
            Some("13") => HttpResponse::InternalServerError().json(json!({
                "error": "Database trigger error: record \"new\" has no field \"certificate_status\""
            })),
            Some("14") => HttpResponse::NotFound().json(json!({ "error": "Student not found" })),
            Some("15") => HttpResponse::BadGateway().body("upstream down"),
            _ => HttpResponse::Ok().json(json!({ "success": true })),
        }
    }

    #[actix_web::test]
    async fn sends_the_new_value_and_classifies_failures() {
        let seen: Seen = web::Data::new(Mutex::new(Vec::new()));
        let recorded = seen.clone();
        let server = HttpServer::new(move || {
            App::new()
                .app_data(recorded.clone())
                .route("/v1/students/{id}/eligibility", web::put().to(record))
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .unwrap();
        let addr = server.addrs()[0];
        let server = server.run();
        let handle = server.handle();
        actix_web::rt::spawn(server);

        let client = EligibilityClient::new(&format!("http://{addr}"), Duration::from_secs(5)).unwrap();

        client.set(7, true).await.unwrap();
        client.set(8, false).await.unwrap();
        assert_eq!(
            seen.lock().unwrap().as_slice(),
            [
                ("/v1/students/7/eligibility".to_string(), json!({ "eligible": true })),
                ("/v1/students/8/eligibility".to_string(), json!({ "eligible": false })),
            ]
        );

        let err = client.set(13, true).await.unwrap_err();
        assert!(matches!(err, EligibilityError::TriggerMisconfigured(_)));
        assert_eq!(err.toast().title, "Database Configuration Issue");

        let err = client.set(14, true).await.unwrap_err();
        assert_eq!(err, EligibilityError::Rejected("Student not found".to_string()));
        assert_eq!(
            err.toast().description,
            "Failed to update student eligibility: Student not found"
        );

        let err = client.set(15, true).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "HTTP 502: Failed to update eligibility"
        );

        handle.stop(true).await;
    }

    #[actix_web::test]
    async fn unreachable_endpoints_are_transport_errors() {
        let client = EligibilityClient::new("http://127.0.0.1:1", Duration::from_secs(2)).unwrap();
        let err = client.set(1, true).await.unwrap_err();
        assert!(matches!(err, EligibilityError::Transport(_)));
        assert!(err.toast().is_error());
    }

    #[test]
    fn only_trigger_errors_are_configuration_issues() {
        let err = EligibilityError::classify(
            "Database trigger error: column \"certificate_status\" does not exist".to_string(),
        );
        assert!(matches!(err, EligibilityError::TriggerMisconfigured(_)));

        let message = "null value in column \"eligible\" violates not-null constraint";
        let err = EligibilityError::classify(message.to_string());
        assert_eq!(err, EligibilityError::Rejected(message.to_string()));
        assert_eq!(
            err.toast().description,
            format!("Failed to update student eligibility: {message}")
        );
    }

    #[test]
    fn success_toasts_name_the_new_state() {
        assert_eq!(success_toast(true).description, "Student eligibility enabled successfully.");
        assert_eq!(success_toast(false).description, "Student eligibility disabled successfully.");
    }
}
