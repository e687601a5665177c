use super::schema::{self, Column, ColumnKind, Table};
use super::{
    Filter, Query, RemoteStore, Row, StoreError, FOREIGN_KEY_VIOLATION, NOT_NULL_VIOLATION,
    UNDEFINED_COLUMN, UNDEFINED_TABLE, UNIQUE_VIOLATION,
};
use async_trait::async_trait;
use log::debug;
use rusqlite::types::Value as SqlValue;
use rusqlite::{ffi, params_from_iter, Connection};
use serde_json::Value;
use std::path::Path;
use std::sync::Mutex;

/// A [`RemoteStore`] over a local SQLite database.
///
/// Store errors carry the same codes the hosted store uses (`23505` for
/// unique violations, `23503` for foreign keys), so pages cannot tell the
/// two backends apart.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(map_sqlite_error)?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(map_sqlite_error)?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(map_sqlite_error)?;
        for table in schema::TABLES {
            conn.execute_batch(table.ddl).map_err(map_sqlite_error)?;
        }
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| StoreError::Transport("sqlite connection poisoned".to_string()))?;
        f(&conn)
    }
}

fn lookup(name: &str) -> Result<&'static Table, StoreError> {
    schema::table(name).ok_or_else(|| {
        StoreError::remote(
            Some(UNDEFINED_TABLE),
            format!("relation \"{name}\" does not exist"),
        )
    })
}

fn lookup_column(table: &Table, name: &str) -> Result<&'static Column, StoreError> {
    table.column(name).ok_or_else(|| {
        StoreError::remote(
            Some(UNDEFINED_COLUMN),
            format!("column {}.{} does not exist", table.name, name),
        )
    })
}

fn map_sqlite_error(err: rusqlite::Error) -> StoreError {
    if let rusqlite::Error::SqliteFailure(failure, message) = &err {
        let code = match failure.extended_code {
            ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                Some(UNIQUE_VIOLATION)
            }
            ffi::SQLITE_CONSTRAINT_FOREIGNKEY => Some(FOREIGN_KEY_VIOLATION),
            ffi::SQLITE_CONSTRAINT_NOTNULL => Some(NOT_NULL_VIOLATION),
            _ => None,
        };
        let message = message.clone().unwrap_or_else(|| failure.to_string());
        return StoreError::remote(code, message);
    }
    StoreError::remote(None, err.to_string())
}

fn to_sql(value: &Value, kind: ColumnKind) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => SqlValue::Real(n.as_f64().unwrap_or_default()),
        },
        Value::String(s) if kind == ColumnKind::Boolean && (s == "true" || s == "false") => {
            SqlValue::Integer(i64::from(s == "true"))
        }
        Value::String(s) => SqlValue::Text(s.clone()),
        other => SqlValue::Text(other.to_string()),
    }
}

fn read_row(row: &rusqlite::Row<'_>, columns: &[&Column]) -> rusqlite::Result<Row> {
    let mut out = Row::new();
    for (i, column) in columns.iter().enumerate() {
        let value = match column.kind {
            ColumnKind::Integer => row.get::<_, Option<i64>>(i)?.map(Value::from),
            ColumnKind::Boolean => row.get::<_, Option<i64>>(i)?.map(|v| Value::Bool(v != 0)),
            ColumnKind::Text => row.get::<_, Option<String>>(i)?.map(Value::String),
        };
        out.insert(column.name.to_string(), value.unwrap_or(Value::Null));
    }
    Ok(out)
}

fn column_list(columns: &[&Column]) -> String {
    columns
        .iter()
        .map(|c| c.name)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Builds `WHERE a IS ?n AND ...`, numbering placeholders from `first`.
fn where_clause(
    table: &Table,
    filters: &[Filter],
    first: usize,
    params: &mut Vec<SqlValue>,
) -> Result<String, StoreError> {
    if filters.is_empty() {
        return Ok(String::new());
    }
    let mut parts = Vec::with_capacity(filters.len());
    for (i, filter) in filters.iter().enumerate() {
        let column = lookup_column(table, &filter.column)?;
        parts.push(format!("{} IS ?{}", column.name, first + i));
        params.push(to_sql(&filter.value, column.kind));
    }
    Ok(format!(" WHERE {}", parts.join(" AND ")))
}

/// Columns and values of a row to write, validated against the table.
fn assignments(
    table: &Table,
    row: &Row,
) -> Result<(Vec<&'static Column>, Vec<SqlValue>), StoreError> {
    let mut columns = Vec::with_capacity(row.len());
    let mut values = Vec::with_capacity(row.len());
    for (name, value) in row {
        let column = lookup_column(table, name)?;
        columns.push(column);
        values.push(to_sql(value, column.kind));
    }
    Ok((columns, values))
}

fn run_returning(
    conn: &Connection,
    sql: &str,
    params: Vec<SqlValue>,
    columns: &[&Column],
) -> Result<Vec<Row>, StoreError> {
    debug!("sqlite: {}", sql);
    let mut stmt = conn.prepare(sql).map_err(map_sqlite_error)?;
    let rows = stmt
        .query_map(params_from_iter(params), |row| read_row(row, columns))
        .map_err(map_sqlite_error)?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .map_err(map_sqlite_error)
}

#[async_trait]
impl RemoteStore for SqliteStore {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Row>, StoreError> {
        let table = lookup(table)?;
        let columns: Vec<&Column> = if query.columns.is_empty() {
            table.columns.iter().collect()
        } else {
            query
                .columns
                .iter()
                .map(|c| lookup_column(table, c))
                .collect::<Result<_, _>>()?
        };

        let mut params = Vec::new();
        let mut sql = format!("SELECT {} FROM {}", column_list(&columns), table.name);
        sql.push_str(&where_clause(table, &query.filters, 1, &mut params)?);
        if let Some(order) = query.order {
            let column = lookup_column(table, order.column)?;
            let direction = if order.ascending { "ASC" } else { "DESC" };
            sql.push_str(&format!(" ORDER BY {} {}", column.name, direction));
        }
        if let Some(limit) = query.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        self.with_conn(|conn| run_returning(conn, &sql, params, &columns))
    }

    async fn insert(&self, table: &str, row: Row) -> Result<Row, StoreError> {
        let table = lookup(table)?;
        let all: Vec<&Column> = table.columns.iter().collect();
        let (columns, params) = assignments(table, &row)?;

        let sql = if columns.is_empty() {
            format!(
                "INSERT INTO {} DEFAULT VALUES RETURNING {}",
                table.name,
                column_list(&all)
            )
        } else {
            let placeholders = (1..=columns.len())
                .map(|i| format!("?{i}"))
                .collect::<Vec<_>>()
                .join(", ");
            format!(
                "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
                table.name,
                column_list(&columns),
                placeholders,
                column_list(&all)
            )
        };

        let mut rows = self.with_conn(|conn| run_returning(conn, &sql, params, &all))?;
        if rows.is_empty() {
            return Err(StoreError::Decode("insert returned no row".to_string()));
        }
        Ok(rows.swap_remove(0))
    }

    async fn update(
        &self,
        table: &str,
        filter: &Filter,
        changes: Row,
    ) -> Result<Vec<Row>, StoreError> {
        let table = lookup(table)?;
        let all: Vec<&Column> = table.columns.iter().collect();
        let (columns, mut params) = assignments(table, &changes)?;
        if columns.is_empty() {
            return Err(StoreError::remote(None, "no columns to update"));
        }

        let sets = columns
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{} = ?{}", c.name, i + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let filters = std::slice::from_ref(filter);
        let condition = where_clause(table, filters, columns.len() + 1, &mut params)?;
        let sql = format!(
            "UPDATE {} SET {}{} RETURNING {}",
            table.name,
            sets,
            condition,
            column_list(&all)
        );

        self.with_conn(|conn| run_returning(conn, &sql, params, &all))
    }

    async fn delete(&self, table: &str, filter: &Filter) -> Result<Vec<Row>, StoreError> {
        let table = lookup(table)?;
        let all: Vec<&Column> = table.columns.iter().collect();
        let mut params = Vec::new();
        let condition = where_clause(table, std::slice::from_ref(filter), 1, &mut params)?;
        let sql = format!(
            "DELETE FROM {}{} RETURNING {}",
            table.name,
            condition,
            column_list(&all)
        );

        self.with_conn(|conn| run_returning(conn, &sql, params, &all))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Order;
    use serde_json::json;

    fn row(value: Value) -> Row {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[tokio::test]
    async fn insert_returns_generated_columns() {
        let store = SqliteStore::open_in_memory().unwrap();
        let inserted = store
            .insert("colleges", row(json!({ "college_name": "GEC" })))
            .await
            .unwrap();
        assert_eq!(inserted["college_id"], json!(1));
        assert_eq!(inserted["college_name"], json!("GEC"));
        assert!(inserted["created_at"].is_string());
    }

    #[tokio::test]
    async fn select_filters_orders_and_limits() {
        let store = SqliteStore::open_in_memory().unwrap();
        for name in ["Zeta", "Alpha", "Mu"] {
            store
                .insert("courses", row(json!({ "course_name": name })))
                .await
                .unwrap();
        }

        let rows = store
            .select(
                "courses",
                &Query::all()
                    .columns(&["course_id", "course_name"])
                    .order(Order::asc("course_name")),
            )
            .await
            .unwrap();
        let names: Vec<_> = rows.iter().map(|r| r["course_name"].clone()).collect();
        assert_eq!(names, vec![json!("Alpha"), json!("Mu"), json!("Zeta")]);
        assert_eq!(rows[0].len(), 2);

        let rows = store
            .select(
                "courses",
                &Query::all().filter(Filter::eq("course_id", 1)).limit(5),
            )
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["course_name"], json!("Zeta"));
    }

    #[tokio::test]
    async fn unique_violation_uses_the_postgres_code() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .insert("colleges", row(json!({ "college_name": "GEC" })))
            .await
            .unwrap();
        let err = store
            .insert("colleges", row(json!({ "college_name": "GEC" })))
            .await
            .unwrap_err();
        assert!(err.is_unique_violation(), "{err:?}");
    }

    #[tokio::test]
    async fn foreign_keys_are_enforced() {
        let store = SqliteStore::open_in_memory().unwrap();
        let err = store
            .insert(
                "templates",
                row(json!({ "template": "data:image/png;base64,AA==", "company_id": 42 })),
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some(FOREIGN_KEY_VIOLATION));
    }

    #[tokio::test]
    async fn booleans_round_trip() {
        let store = SqliteStore::open_in_memory().unwrap();
        let inserted = store
            .insert(
                "students",
                row(json!({ "name": "Asha", "phone_number": "9000000001", "eligible": true })),
            )
            .await
            .unwrap();
        assert_eq!(inserted["eligible"], json!(true));
        assert_eq!(inserted["certificate_approved"], json!(false));

        let updated = store
            .update(
                "students",
                &Filter::eq("student_id", inserted["student_id"].clone()),
                row(json!({ "eligible": false })),
            )
            .await
            .unwrap();
        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0]["eligible"], json!(false));
    }

    #[tokio::test]
    async fn delete_returns_removed_rows() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .insert("companies", row(json!({ "company_name": "NighaTech Global" })))
            .await
            .unwrap();

        let removed = store
            .delete("companies", &Filter::eq("company_id", 1))
            .await
            .unwrap();
        assert_eq!(removed.len(), 1);

        let removed = store
            .delete("companies", &Filter::eq("company_id", 1))
            .await
            .unwrap();
        assert!(removed.is_empty());
    }

    #[tokio::test]
    async fn unknown_tables_and_columns_are_rejected() {
        let store = SqliteStore::open_in_memory().unwrap();
        let err = store.select("nope", &Query::all()).await.unwrap_err();
        assert_eq!(err.code(), Some(UNDEFINED_TABLE));

        let err = store
            .select("students", &Query::all().filter(Filter::eq("password", "x")))
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some(UNDEFINED_COLUMN));
    }
}
