//! Listing of templates for the templates page.
//!
//! Templates are selected newest first, then joined with the names of their
//! companies (a second select on `companies`). The optional search matches
//! the company name case-insensitively, or the template and company ids.

use crate::auth::AdminSession;
use crate::errors::PortalError;
use crate::services::crud::{self, respond, Action, Entity};
use crate::services::search::{contains_ci, filter_rows};
use crate::state::AppState;
use crate::store::{decode_rows, Query, RemoteStore};
use actix_web::{web, HttpResponse};
use common::model::company::Company;
use common::model::template::{Template, TemplateView};
use common::requests::ListQuery;
use std::collections::HashMap;

pub async fn list_views(
    store: &dyn RemoteStore,
    search: Option<&str>,
) -> Result<Vec<TemplateView>, PortalError> {
    let templates = crud::list::<Template>(store, None).await?;
    let companies: Vec<Company> = decode_rows(
        store
            .select(Company::TABLE, &Query::all().columns(&["company_id", "company_name"]))
            .await?,
    )?;
    let names: HashMap<i64, String> = companies
        .into_iter()
        .map(|c| (c.company_id, c.company_name))
        .collect();

    let views = templates
        .into_iter()
        .map(|template| TemplateView {
            company_name: names.get(&template.company_id).cloned(),
            template,
        })
        .collect();
    Ok(filter_rows(views, search, |view: &TemplateView, needle| {
        view.template.matches(needle)
            || view
                .company_name
                .as_deref()
                .is_some_and(|name| contains_ci(name, needle))
    }))
}

/// Actix web handler for `GET /api/admin/templates`.
pub async fn process(
    _admin: AdminSession,
    state: web::Data<AppState>,
    query: web::Query<ListQuery>,
) -> HttpResponse {
    let result = list_views(state.store.as_ref(), query.search.as_deref()).await;
    respond(result, &Template::MESSAGES, Action::Fetch)
}
