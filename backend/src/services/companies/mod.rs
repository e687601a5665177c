//! `/api/admin/companies`: the company-info page.

use crate::errors::PortalError;
use crate::services::crud::{entity_scope, Entity, Messages};
use crate::services::search::contains_ci;
use crate::services::validation::required;
use crate::store::{Order, Row};
use actix_web::Scope;
use common::model::company::Company;
use common::requests::CompanyDraft;
use serde_json::Value;

impl Entity for Company {
    const TABLE: &'static str = "companies";
    const ID_COLUMN: &'static str = "company_id";
    const ORDER: Order = Order::asc("company_name");
    const MESSAGES: Messages = Messages {
        required: "Company name is required.",
        duplicate: None,
        fetch_failed: "Failed to fetch companies data.",
        add_failed: "Failed to add company.",
        update_failed: "Failed to update company.",
        delete_failed: "Failed to delete company.",
        added: "Company added successfully.",
        updated: "Company updated successfully.",
        deleted: "Company deleted successfully.",
    };

    type Draft = CompanyDraft;

    fn id(&self) -> i64 {
        self.company_id
    }

    fn matches(&self, needle: &str) -> bool {
        contains_ci(&self.company_name, needle)
    }

    fn columns(draft: &CompanyDraft, _creating: bool) -> Result<Row, PortalError> {
        let name = required(&draft.company_name, Self::MESSAGES.required)?;
        let mut row = Row::new();
        row.insert("company_name".to_string(), Value::String(name));
        Ok(row)
    }
}

pub fn configure_routes() -> Scope {
    entity_scope::<Company>("/companies")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::crud;
    use crate::store::sqlite::SqliteStore;
    use crate::store::{Filter, Query, RemoteStore};

    #[tokio::test]
    async fn deleting_a_company_cascades_to_its_templates() {
        let store = SqliteStore::open_in_memory().unwrap();
        let company = crud::add::<Company>(
            &store,
            &CompanyDraft {
                company_name: "Acme".to_string(),
            },
        )
        .await
        .unwrap();

        let mut template = Row::new();
        template.insert("company_id".to_string(), company.company_id.into());
        template.insert("template".to_string(), "data:image/png;base64,AAAA".into());
        store.insert("templates", template).await.unwrap();

        crud::delete::<Company>(&store, company.company_id).await.unwrap();
        let left = store
            .select(
                "templates",
                &Query::all().filter(Filter::eq("company_id", company.company_id)),
            )
            .await
            .unwrap();
        assert!(left.is_empty());
    }
}
