//! `/api/admin/students`: the certificates and requests pages.

mod flags;
mod list;
mod preview;
mod remove;

use crate::errors::PortalError;
use crate::services::crud::{add_handler, update_handler, Entity, Messages};
use crate::services::search::contains_ci;
use crate::services::validation::{optional_text, required};
use crate::store::{Order, Row};
use actix_web::web::{delete, get, post, put, scope};
use actix_web::Scope;
use common::model::student::Student;
use common::requests::StudentDraft;
use serde_json::Value;

impl Entity for Student {
    const TABLE: &'static str = "students";
    const ID_COLUMN: &'static str = "student_id";
    const ORDER: Order = Order::asc("student_id");
    const MESSAGES: Messages = Messages {
        required: "Name and phone number are required.",
        duplicate: None,
        fetch_failed: "Failed to fetch students data.",
        add_failed: "Failed to add student. Phone number may already exist.",
        update_failed: "Failed to update student.",
        delete_failed: "Failed to delete student.",
        added: "Student added successfully.",
        updated: "Student updated successfully.",
        deleted: "Student deleted successfully.",
    };
    // everything but the certificate blob
    const LIST_COLUMNS: &'static [&'static str] = &[
        "student_id",
        "name",
        "phone_number",
        "email",
        "year",
        "branch",
        "college_id",
        "eligible",
        "certificate_approved",
        "certificate_id",
        "downloaded_count",
        "deleted",
        "created_at",
    ];

    type Draft = StudentDraft;

    fn id(&self) -> i64 {
        self.student_id
    }

    fn matches(&self, needle: &str) -> bool {
        contains_ci(&self.name, needle)
            || self.student_id.to_string().contains(needle)
            || contains_ci(&self.phone_number, needle)
    }

    fn columns(draft: &StudentDraft, creating: bool) -> Result<Row, PortalError> {
        let name = required(&draft.name, Self::MESSAGES.required)?;
        let phone = required(&draft.phone_number, Self::MESSAGES.required)?;

        let mut row = Row::new();
        row.insert("name".to_string(), Value::String(name));
        row.insert("phone_number".to_string(), Value::String(phone));
        row.insert("year".to_string(), draft.year.map_or(Value::Null, Value::from));
        row.insert("branch".to_string(), optional_text(draft.branch.as_deref()));
        row.insert(
            "college_id".to_string(),
            draft.college_id.map_or(Value::Null, Value::from),
        );
        if creating {
            row.insert("eligible".to_string(), Value::Bool(false));
        } else if let Some(count) = draft.downloaded_count {
            row.insert("downloaded_count".to_string(), Value::from(count.max(0)));
        }
        Ok(row)
    }
}

pub fn configure_routes() -> Scope {
    scope("/students")
        .route("", get().to(list::process))
        .route("", post().to(add_handler::<Student>))
        .route("/{id}", put().to(update_handler::<Student>))
        .route("/{id}", delete().to(remove::process))
        .route("/{id}/eligibility", put().to(flags::eligibility))
        .route("/{id}/approval", put().to(flags::approval))
        .route("/{id}/preview", post().to(preview::process))
}
