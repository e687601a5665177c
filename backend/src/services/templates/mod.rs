//! # Template Service Module
//!
//! Certificate templates of the companies, under `/api/admin/templates`.
//! A template is an image stored as a base64 data URL; each company holds
//! at most one, and a template can be marked as selected.
//!
//! ## Sub-modules:
//! - `list`: lists templates joined with their company names.
//! - `upload`: validates and stores a multipart image upload.
//! - `save`: toggles the selection of a template.
//! - `preview`: serves the decoded image of a template.

mod list;
mod preview;
mod save;
mod upload;

use crate::errors::PortalError;
use crate::services::crud::{delete_handler, Entity, Messages};
use crate::store::{Order, Row};
use actix_web::web::{delete, get, post, put, scope};
use actix_web::Scope;
use common::model::template::Template;
use common::requests::ToggleRequest;
use serde_json::Value;

impl Entity for Template {
    const TABLE: &'static str = "templates";
    const ID_COLUMN: &'static str = "id";
    const ORDER: Order = Order::desc("created_at");
    const MESSAGES: Messages = Messages {
        required: "Please select both a company and an image file",
        duplicate: Some(
            "A template already exists for this company. Please delete the existing one first.",
        ),
        fetch_failed: "Failed to fetch templates",
        add_failed: "Failed to add template",
        update_failed: "Failed to update template selection",
        delete_failed: "Failed to delete template",
        added: "Template uploaded successfully",
        updated: "Template updated successfully",
        deleted: "Template deleted successfully",
    };

    /// Templates are created by upload; the only edit is the selection toggle.
    type Draft = ToggleRequest;

    fn id(&self) -> i64 {
        self.id
    }

    /// Matches on the ids; `list::list_views` adds the company name.
    fn matches(&self, needle: &str) -> bool {
        self.id.to_string().contains(needle) || self.company_id.to_string().contains(needle)
    }

    fn columns(draft: &ToggleRequest, _creating: bool) -> Result<Row, PortalError> {
        let mut row = Row::new();
        row.insert("is_selected".to_string(), Value::Bool(!draft.current));
        Ok(row)
    }
}

/// Configures and returns the Actix `Scope` for all template-related routes.
///
/// # Registered Routes:
///
/// *   **`GET /`**: templates with company names, newest first (`?search=` on the company name).
/// *   **`POST /`**: multipart upload with a `company_id` and a `file` field.
/// *   **`PUT /{id}/selection`**: flips `is_selected` from the `current` value in the body.
/// *   **`DELETE /{id}`**: removes the template.
/// *   **`GET /{id}/image`**: the decoded template image.
pub fn configure_routes() -> Scope {
    scope("/templates")
        .route("", get().to(list::process))
        .route("", post().to(upload::process))
        .route("/{id}/selection", put().to(save::process))
        .route("/{id}", delete().to(delete_handler::<Template>))
        .route("/{id}/image", get().to(preview::process))
}
