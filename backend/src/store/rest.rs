use super::{Filter, Query, RemoteStore, Row, StoreError};
use async_trait::async_trait;
use log::{debug, warn};
use regex::Regex;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::Value;
use std::sync::OnceLock;
use std::time::Duration;

/// Error payload of the hosted REST API.
#[derive(Deserialize, Debug, Default)]
struct RemoteErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// A [`RemoteStore`] over the hosted PostgREST endpoint (`{base}/rest/v1/{table}`).
pub struct RestStore {
    client: Client,
    base_url: String,
    key: String,
}

fn identifier() -> &'static Regex {
    static IDENTIFIER: OnceLock<Regex> = OnceLock::new();
    IDENTIFIER.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex"))
}

fn check_identifier(name: &str) -> Result<&str, StoreError> {
    if identifier().is_match(name) {
        Ok(name)
    } else {
        Err(StoreError::remote(
            None,
            format!("invalid identifier \"{name}\""),
        ))
    }
}

/// Renders a filter as a PostgREST query pair (`col=eq.value`, `col=is.null`).
pub(crate) fn filter_param(filter: &Filter) -> Result<(String, String), StoreError> {
    let column = check_identifier(&filter.column)?.to_string();
    let value = match &filter.value {
        Value::Null => "is.null".to_string(),
        Value::String(s) => format!("eq.{s}"),
        other => format!("eq.{other}"),
    };
    Ok((column, value))
}

pub(crate) fn query_params(query: &Query) -> Result<Vec<(String, String)>, StoreError> {
    let mut params = Vec::new();
    let select = if query.columns.is_empty() {
        "*".to_string()
    } else {
        query
            .columns
            .iter()
            .map(|c| check_identifier(c).map(str::to_string))
            .collect::<Result<Vec<_>, _>>()?
            .join(",")
    };
    params.push(("select".to_string(), select));
    for filter in &query.filters {
        params.push(filter_param(filter)?);
    }
    if let Some(order) = query.order {
        let direction = if order.ascending { "asc" } else { "desc" };
        params.push((
            "order".to_string(),
            format!("{}.{}", check_identifier(order.column)?, direction),
        ));
    }
    if let Some(limit) = query.limit {
        params.push(("limit".to_string(), limit.to_string()));
    }
    Ok(params)
}

fn transport(err: reqwest::Error) -> StoreError {
    StoreError::Transport(err.to_string())
}

impl RestStore {
    pub fn new(base_url: &str, key: &str, timeout: Duration) -> Result<Self, StoreError> {
        let client = Client::builder().timeout(timeout).build().map_err(transport)?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            key: key.to_string(),
        })
    }

    fn request(&self, method: Method, table: &str) -> Result<RequestBuilder, StoreError> {
        let url = format!("{}/rest/v1/{}", self.base_url, check_identifier(table)?);
        debug!("store: {} {}", method, url);
        Ok(self
            .client
            .request(method, url)
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
            .header("Accept", "application/json"))
    }

    fn mutation(&self, method: Method, table: &str) -> Result<RequestBuilder, StoreError> {
        Ok(self
            .request(method, table)?
            .header("Prefer", "return=representation"))
    }
}

async fn read_rows(response: Response) -> Result<Vec<Row>, StoreError> {
    let status = response.status();
    if status.is_success() {
        return response
            .json::<Vec<Row>>()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()));
    }

    let text = response.text().await.map_err(transport)?;
    let body: RemoteErrorBody = serde_json::from_str(&text).unwrap_or_default();
    warn!("store answered {}: {}", status, text);
    Err(StoreError::Remote {
        code: body.code,
        message: body
            .message
            .unwrap_or_else(|| format!("HTTP {}", status.as_u16())),
    })
}

#[async_trait]
impl RemoteStore for RestStore {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Row>, StoreError> {
        let response = self
            .request(Method::GET, table)?
            .query(&query_params(query)?)
            .send()
            .await
            .map_err(transport)?;
        read_rows(response).await
    }

    async fn insert(&self, table: &str, row: Row) -> Result<Row, StoreError> {
        let response = self
            .mutation(Method::POST, table)?
            .json(&vec![Value::Object(row)])
            .send()
            .await
            .map_err(transport)?;
        let mut rows = read_rows(response).await?;
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
        let response = self
            .mutation(Method::PATCH, table)?
            .query(&[filter_param(filter)?])
            .json(&Value::Object(changes))
            .send()
            .await
            .map_err(transport)?;
        read_rows(response).await
    }

    async fn delete(&self, table: &str, filter: &Filter) -> Result<Vec<Row>, StoreError> {
        let response = self
            .mutation(Method::DELETE, table)?
            .query(&[filter_param(filter)?])
            .send()
            .await
            .map_err(transport)?;
        read_rows(response).await
    }
}
