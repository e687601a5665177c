//! Temporary "object URLs" for generated bytes.
//!
//! A registered blob is served from `/blobs/{token}` until it is revoked.
//! Previews revoke their URL after a fixed delay through
//! [`BlobRegistry::revoke_after`].

use crate::state::AppState;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::web::{get, scope};
use actix_web::{web, HttpResponse, Scope};
use log::debug;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct Blob {
    pub bytes: Arc<Vec<u8>>,
    pub content_type: String,
    pub file_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectUrl {
    pub token: String,
    pub url: String,
}

#[derive(Clone)]
pub struct BlobRegistry {
    blobs: Arc<RwLock<HashMap<String, Blob>>>,
    base_url: String,
}

impl BlobRegistry {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            blobs: Arc::new(RwLock::new(HashMap::new())),
            base_url: base_url.into(),
        }
    }

    pub async fn create(&self, bytes: Vec<u8>, content_type: &str, file_name: &str) -> ObjectUrl {
        let token = Uuid::new_v4().to_string();
        let blob = Blob {
            bytes: Arc::new(bytes),
            content_type: content_type.to_string(),
            file_name: file_name.to_string(),
        };
        self.blobs.write().await.insert(token.clone(), blob);
        ObjectUrl {
            url: format!("{}/blobs/{}", self.base_url, token),
            token,
        }
    }

    pub async fn get(&self, token: &str) -> Option<Blob> {
        self.blobs.read().await.get(token).cloned()
    }

    pub async fn revoke(&self, token: &str) -> bool {
        self.blobs.write().await.remove(token).is_some()
    }

    /// Revokes `token` once `delay` has passed.
    pub fn revoke_after(&self, token: String, delay: Duration) {
        let registry = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if registry.revoke(&token).await {
                debug!("revoked object URL {}", token);
            }
        });
    }
}

async fn serve(state: web::Data<AppState>, token: web::Path<String>) -> HttpResponse {
    match state.blobs.get(&token).await {
        Some(blob) => HttpResponse::Ok()
            .content_type(blob.content_type.as_str())
            .insert_header(ContentDisposition {
                disposition: DispositionType::Inline,
                parameters: vec![DispositionParam::Filename(blob.file_name.clone())],
            })
            .body(blob.bytes.as_ref().clone()),
        None => HttpResponse::NotFound().body("Not Found"),
    }
}

pub fn configure_routes() -> Scope {
    scope("/blobs").route("/{token}", get().to(serve))
}
