//! The add/edit/delete/list contract shared by every entity page.
//!
//! An entity describes its table, ordering, search fields, validation and
//! user-facing messages once; the generic operations and Actix handlers in
//! this module do the rest. Failures are mapped onto the entity's messages:
//! validation errors keep their own text, a unique violation becomes the
//! entity's duplicate message (when it has one), other store errors become
//! the action's failure message, and anything else is reported as
//! unexpected.

use crate::auth::AdminSession;
use crate::errors::{PortalError, UNEXPECTED_MESSAGE};
use crate::services::search;
use crate::state::AppState;
use crate::store::{decode_row, decode_rows, Filter, Order, Query, RemoteStore, Row};
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError, Scope};
use common::model::toast::{PageResponse, Toast};
use common::requests::ListQuery;
use log::{error, info};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// User-facing texts of one entity page.
#[derive(Debug, Clone, Copy)]
pub struct Messages {
    pub required: &'static str,
    /// Shown for unique violations; `None` falls back to the action's failure text.
    pub duplicate: Option<&'static str>,
    pub fetch_failed: &'static str,
    pub add_failed: &'static str,
    pub update_failed: &'static str,
    pub delete_failed: &'static str,
    pub added: &'static str,
    pub updated: &'static str,
    pub deleted: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Fetch,
    Add,
    Update,
    Delete,
}

pub trait Entity: DeserializeOwned + Serialize + Send + 'static {
    const TABLE: &'static str;
    const ID_COLUMN: &'static str;
    const ORDER: Order;
    const MESSAGES: Messages;
    /// Columns fetched by `list`; empty selects all of them.
    const LIST_COLUMNS: &'static [&'static str] = &[];

    /// The add/edit form of the entity.
    type Draft: DeserializeOwned + Send + 'static;

    fn id(&self) -> i64;

    /// Whether the row matches a lower-cased search needle.
    fn matches(&self, needle: &str) -> bool;

    /// Validates a draft into the columns to write. `creating` is false for edits.
    fn columns(draft: &Self::Draft, creating: bool) -> Result<Row, PortalError>;
}

pub async fn list<E: Entity>(
    store: &dyn RemoteStore,
    search: Option<&str>,
) -> Result<Vec<E>, PortalError> {
    let query = Query::all().columns(E::LIST_COLUMNS).order(E::ORDER);
    let rows = store.select(E::TABLE, &query).await?;
    let rows: Vec<E> = decode_rows(rows)?;
    Ok(search::filter_rows(rows, search, |row, needle| row.matches(needle)))
}

pub async fn add<E: Entity>(store: &dyn RemoteStore, draft: &E::Draft) -> Result<E, PortalError> {
    let columns = E::columns(draft, true)?;
    let row = store.insert(E::TABLE, columns).await?;
    Ok(decode_row(row)?)
}

pub async fn update<E: Entity>(
    store: &dyn RemoteStore,
    id: i64,
    draft: &E::Draft,
) -> Result<E, PortalError> {
    let columns = E::columns(draft, false)?;
    update_columns(store, id, columns).await
}

/// Writes raw columns to one row; used by toggles that bypass the edit form.
pub async fn update_columns<E: Entity>(
    store: &dyn RemoteStore,
    id: i64,
    columns: Row,
) -> Result<E, PortalError> {
    let mut rows = store
        .update(E::TABLE, &Filter::eq(E::ID_COLUMN, id), columns)
        .await?;
    if rows.is_empty() {
        return Err(PortalError::NotFound(format!("{} {}", E::TABLE, id)));
    }
    Ok(decode_row(rows.swap_remove(0))?)
}

pub async fn delete<E: Entity>(store: &dyn RemoteStore, id: i64) -> Result<E, PortalError> {
    let mut rows = store
        .delete(E::TABLE, &Filter::eq(E::ID_COLUMN, id))
        .await?;
    if rows.is_empty() {
        return Err(PortalError::NotFound(format!("{} {}", E::TABLE, id)));
    }
    Ok(decode_row(rows.swap_remove(0))?)
}

pub fn success_toast(messages: &Messages, action: Action) -> Option<Toast> {
    match action {
        Action::Fetch => None,
        Action::Add => Some(Toast::success(messages.added)),
        Action::Update => Some(Toast::success(messages.updated)),
        Action::Delete => Some(Toast::success(messages.deleted)),
    }
}

pub fn failure_toast(messages: &Messages, action: Action, err: &PortalError) -> Toast {
    let fallback = match action {
        Action::Fetch => messages.fetch_failed,
        Action::Add => messages.add_failed,
        Action::Update => messages.update_failed,
        Action::Delete => messages.delete_failed,
    };
    let description = match err {
        PortalError::Validation(message) | PortalError::Conflict(message) => message.as_str(),
        PortalError::Store(store_err) if store_err.is_unique_violation() => {
            messages.duplicate.unwrap_or(fallback)
        }
        err if err.is_unexpected() => UNEXPECTED_MESSAGE,
        _ => fallback,
    };
    Toast::error(description)
}

/// Turns the result of an entity operation into the JSON envelope of the API.
pub fn respond<T: Serialize>(
    result: Result<T, PortalError>,
    messages: &Messages,
    action: Action,
) -> HttpResponse {
    match result {
        Ok(data) => {
            let body = PageResponse {
                data: Some(data),
                toast: success_toast(messages, action),
            };
            let status = if action == Action::Add {
                StatusCode::CREATED
            } else {
                StatusCode::OK
            };
            HttpResponse::build(status).json(body)
        }
        Err(err) => {
            if !matches!(err, PortalError::Validation(_)) {
                error!("{:?} failed: {}", action, err);
            }
            let toast = failure_toast(messages, action, &err);
            HttpResponse::build(err.status_code()).json(PageResponse::<()>::with_toast(None, toast))
        }
    }
}

pub async fn list_handler<E: Entity>(
    _admin: AdminSession,
    state: web::Data<AppState>,
    query: web::Query<ListQuery>,
) -> HttpResponse {
    let result = list::<E>(state.store.as_ref(), query.search.as_deref()).await;
    respond(result, &E::MESSAGES, Action::Fetch)
}

pub async fn add_handler<E: Entity>(
    _admin: AdminSession,
    state: web::Data<AppState>,
    draft: web::Json<E::Draft>,
) -> HttpResponse {
    let result = add::<E>(state.store.as_ref(), &draft).await;
    if let Ok(row) = &result {
        info!("added {} {}", E::TABLE, row.id());
    }
    respond(result, &E::MESSAGES, Action::Add)
}

pub async fn update_handler<E: Entity>(
    _admin: AdminSession,
    state: web::Data<AppState>,
    id: web::Path<i64>,
    draft: web::Json<E::Draft>,
) -> HttpResponse {
    let result = update::<E>(state.store.as_ref(), id.into_inner(), &draft).await;
    respond(result, &E::MESSAGES, Action::Update)
}

pub async fn delete_handler<E: Entity>(
    _admin: AdminSession,
    state: web::Data<AppState>,
    id: web::Path<i64>,
) -> HttpResponse {
    let id = id.into_inner();
    let result = delete::<E>(state.store.as_ref(), id).await;
    if result.is_ok() {
        info!("deleted {} {}", E::TABLE, id);
    }
    respond(result, &E::MESSAGES, Action::Delete)
}

/// The standard scope of an entity page:
///
/// * `GET /` lists (optional `?search=`),
/// * `POST /` adds,
/// * `PUT /{id}` edits,
/// * `DELETE /{id}` deletes.
pub fn entity_scope<E: Entity>(path: &str) -> Scope {
    web::scope(path)
        .route("", web::get().to(list_handler::<E>))
        .route("", web::post().to(add_handler::<E>))
        .route("/{id}", web::put().to(update_handler::<E>))
        .route("/{id}", web::delete().to(delete_handler::<E>))
}
