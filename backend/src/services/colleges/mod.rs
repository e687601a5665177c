//! `/api/admin/colleges`: the colleges page.

use crate::errors::PortalError;
use crate::services::crud::{entity_scope, Entity, Messages};
use crate::services::search::contains_ci;
use crate::services::validation::required;
use crate::store::{Order, Row};
use actix_web::Scope;
use common::model::college::College;
use common::requests::CollegeDraft;
use serde_json::Value;

impl Entity for College {
    const TABLE: &'static str = "colleges";
    const ID_COLUMN: &'static str = "college_id";
    const ORDER: Order = Order::asc("college_id");
    const MESSAGES: Messages = Messages {
        required: "Please enter a college name.",
        duplicate: Some("A college with this name already exists."),
        fetch_failed: "Failed to fetch colleges data.",
        add_failed: "Failed to add college.",
        update_failed: "Failed to update college.",
        delete_failed: "Failed to delete college.",
        added: "College added successfully.",
        updated: "College updated successfully.",
        deleted: "College deleted successfully.",
    };

    type Draft = CollegeDraft;

    fn id(&self) -> i64 {
        self.college_id
    }

    fn matches(&self, needle: &str) -> bool {
        contains_ci(&self.college_name, needle)
    }

    fn columns(draft: &CollegeDraft, _creating: bool) -> Result<Row, PortalError> {
        let name = required(&draft.college_name, Self::MESSAGES.required)?;
        let mut row = Row::new();
        row.insert("college_name".to_string(), Value::String(name));
        Ok(row)
    }
}

pub fn configure_routes() -> Scope {
    entity_scope::<College>("/colleges")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::crud::{self, failure_toast, Action};
    use crate::store::sqlite::SqliteStore;

    fn draft(name: &str) -> CollegeDraft {
        CollegeDraft {
            college_name: name.to_string(),
        }
    }

    #[tokio::test]
    async fn names_are_trimmed_and_duplicates_rejected() {
        let store = SqliteStore::open_in_memory().unwrap();
        let added = crud::add::<College>(&store, &draft("  Govt Engineering College ")).await.unwrap();
        assert_eq!(added.college_name, "Govt Engineering College");

        let err = crud::add::<College>(&store, &draft("Govt Engineering College"))
            .await
            .unwrap_err();
        assert_eq!(
            failure_toast(&College::MESSAGES, Action::Add, &err).description,
            "A college with this name already exists."
        );
    }

    #[tokio::test]
    async fn list_is_ordered_by_id_and_searchable() {
        let store = SqliteStore::open_in_memory().unwrap();
        for name in ["Zenith Institute", "Alpha College", "Engineering Hub"] {
            crud::add::<College>(&store, &draft(name)).await.unwrap();
        }
        let all = crud::list::<College>(&store, None).await.unwrap();
        let names: Vec<_> = all.iter().map(|c| c.college_name.as_str()).collect();
        assert_eq!(names, vec!["Zenith Institute", "Alpha College", "Engineering Hub"]);

        let hits = crud::list::<College>(&store, Some("COLLEGE")).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].college_name, "Alpha College");
    }

    #[tokio::test]
    async fn deleting_a_missing_college_leaves_the_list_unchanged() {
        let store = SqliteStore::open_in_memory().unwrap();
        crud::add::<College>(&store, &draft("GEC")).await.unwrap();

        let err = crud::delete::<College>(&store, 999).await.unwrap_err();
        assert!(matches!(err, PortalError::NotFound(_)));
        assert_eq!(
            failure_toast(&College::MESSAGES, Action::Delete, &err).description,
            "Failed to delete college."
        );
        assert_eq!(crud::list::<College>(&store, None).await.unwrap().len(), 1);
    }
}
