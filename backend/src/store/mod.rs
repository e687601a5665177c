//! Generic request/response access to the remote relational store.
//!
//! Every page talks to the store through [`RemoteStore`]: select, insert,
//! update and delete against a named table, filtered by column equality and
//! ordered by one column. Rows travel as JSON objects, the same shape the
//! hosted PostgREST API answers with. Two backends exist:
//!
//! - [`rest::RestStore`]: the hosted store, reached over HTTPS.
//! - [`sqlite::SqliteStore`]: a local SQLite file with the same tables,
//!   used for development and tests.

pub mod rest;
pub mod schema;
pub mod sqlite;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

pub type Row = serde_json::Map<String, Value>;

pub const UNIQUE_VIOLATION: &str = "23505";
pub const FOREIGN_KEY_VIOLATION: &str = "23503";
pub const NOT_NULL_VIOLATION: &str = "23502";
pub const UNDEFINED_TABLE: &str = "42P01";
pub const UNDEFINED_COLUMN: &str = "42703";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// The store answered with an error (`{code, message}`).
    #[error("{message}")]
    Remote {
        code: Option<String>,
        message: String,
    },

    #[error("Store unreachable: {0}")]
    Transport(String),

    #[error("Unexpected store payload: {0}")]
    Decode(String),
}

impl StoreError {
    pub fn remote(code: Option<&str>, message: impl Into<String>) -> Self {
        StoreError::Remote {
            code: code.map(str::to_string),
            message: message.into(),
        }
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            StoreError::Remote { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, StoreError::Remote { .. })
    }

    pub fn is_unique_violation(&self) -> bool {
        self.code() == Some(UNIQUE_VIOLATION)
    }
}

/// Column equality (`col = value`). A `null` value matches missing values.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub value: Value,
}

impl Filter {
    pub fn eq(column: &str, value: impl Into<Value>) -> Self {
        Self {
            column: column.to_string(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Order {
    pub column: &'static str,
    pub ascending: bool,
}

impl Order {
    pub const fn asc(column: &'static str) -> Self {
        Self {
            column,
            ascending: true,
        }
    }

    pub const fn desc(column: &'static str) -> Self {
        Self {
            column,
            ascending: false,
        }
    }
}

/// A select request. An empty column list selects every column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub columns: Vec<String>,
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn columns(mut self, columns: &[&str]) -> Self {
        self.columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn order(mut self, order: Order) -> Self {
        self.order = Some(order);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Row>, StoreError>;

    /// Inserts one row and returns it as stored (with generated columns).
    async fn insert(&self, table: &str, row: Row) -> Result<Row, StoreError>;

    /// Updates the matching rows and returns them after the change.
    async fn update(&self, table: &str, filter: &Filter, changes: Row)
        -> Result<Vec<Row>, StoreError>;

    /// Deletes the matching rows and returns what was removed.
    async fn delete(&self, table: &str, filter: &Filter) -> Result<Vec<Row>, StoreError>;
}

/// Selects at most one row.
pub async fn select_single(
    store: &dyn RemoteStore,
    table: &str,
    query: Query,
) -> Result<Option<Row>, StoreError> {
    let mut rows = store.select(table, &query.limit(1)).await?;
    Ok(if rows.is_empty() {
        None
    } else {
        Some(rows.swap_remove(0))
    })
}

pub fn decode_row<T: DeserializeOwned>(row: Row) -> Result<T, StoreError> {
    serde_json::from_value(Value::Object(row)).map_err(|e| StoreError::Decode(e.to_string()))
}

pub fn decode_rows<T: DeserializeOwned>(rows: Vec<Row>) -> Result<Vec<T>, StoreError> {
    rows.into_iter().map(decode_row).collect()
}
