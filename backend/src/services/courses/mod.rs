//! `/api/admin/courses`: the courses page.

use crate::errors::PortalError;
use crate::services::crud::{entity_scope, Entity, Messages};
use crate::services::search::contains_ci;
use crate::services::validation::required;
use crate::store::{Order, Row};
use actix_web::Scope;
use common::model::course::Course;
use common::requests::CourseDraft;
use serde_json::Value;

impl Entity for Course {
    const TABLE: &'static str = "courses";
    const ID_COLUMN: &'static str = "course_id";
    const ORDER: Order = Order::asc("course_name");
    const MESSAGES: Messages = Messages {
        required: "Course name is required.",
        duplicate: None,
        fetch_failed: "Failed to fetch courses data.",
        add_failed: "Failed to add course. It may already exist.",
        update_failed: "Failed to update course.",
        delete_failed: "Failed to delete course. It may be in use by students.",
        added: "Course added successfully.",
        updated: "Course updated successfully.",
        deleted: "Course deleted successfully.",
    };

    type Draft = CourseDraft;

    fn id(&self) -> i64 {
        self.course_id
    }

    fn matches(&self, needle: &str) -> bool {
        contains_ci(&self.course_name, needle)
    }

    fn columns(draft: &CourseDraft, _creating: bool) -> Result<Row, PortalError> {
        let name = required(&draft.course_name, Self::MESSAGES.required)?;
        let mut row = Row::new();
        row.insert("course_name".to_string(), Value::String(name));
        Ok(row)
    }
}

pub fn configure_routes() -> Scope {
    entity_scope::<Course>("/courses")
}
