//! PostgREST table endpoints.

use async_trait::async_trait;
use reqwest::Method;

use super::SupabaseClient;
use crate::api::{Filter, Query, TableApi};
use crate::error::BackendError;
use crate::http::check_response;

/// Quote a value for use inside an `in.(...)` list when it contains
/// PostgREST reserved characters.
fn quote_list_value(value: &str) -> String {
    if value.contains([',', '(', ')', '"', ' ']) {
        format!("\"{}\"", value.replace('"', "\\\""))
    } else {
        value.to_string()
    }
}

/// Render a [`Query`] as PostgREST query-string pairs.
fn query_params(query: &Query) -> Vec<(String, String)> {
    let mut params = vec![("select".to_string(), "*".to_string())];
    for filter in query.filters() {
        match filter {
            Filter::Eq { column, value } => {
                params.push((column.clone(), format!("eq.{value}")));
            }
            Filter::In { column, values } => {
                let list = values
                    .iter()
                    .map(|v| quote_list_value(v))
                    .collect::<Vec<_>>()
                    .join(",");
                params.push((column.clone(), format!("in.({list})")));
            }
        }
    }
    if let Some(order) = query.ordering() {
        let direction = if order.ascending { "asc" } else { "desc" };
        params.push(("order".to_string(), format!("{}.{direction}", order.column)));
    }
    if let Some(limit) = query.row_limit() {
        params.push(("limit".to_string(), limit.to_string()));
    }
    params
}

fn encode_params(params: &[(String, String)]) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

#[async_trait]
impl TableApi for SupabaseClient {
    async fn select(&self, query: &Query) -> Result<Vec<serde_json::Value>, BackendError> {
        // `in.()` with nothing in it is a syntax error server-side.
        if query
            .filters()
            .iter()
            .any(|f| matches!(f, Filter::In { values, .. } if values.is_empty()))
        {
            return Ok(Vec::new());
        }

        let path = format!(
            "rest/v1/{}?{}",
            query.table(),
            encode_params(&query_params(query))
        );
        let resp = self.request(Method::GET, &path).send().await?;
        let rows: Vec<serde_json::Value> = check_response(resp).await?.json().await?;
        tracing::debug!(table = query.table(), rows = rows.len(), "select");
        Ok(rows)
    }

    async fn insert(
        &self,
        table: &str,
        row: serde_json::Value,
    ) -> Result<serde_json::Value, BackendError> {
        let resp = self
            .request(Method::POST, &format!("rest/v1/{table}"))
            .header("Prefer", "return=representation")
            .json(&row)
            .send()
            .await?;
        let mut stored: Vec<serde_json::Value> = check_response(resp).await?.json().await?;
        if stored.is_empty() {
            return Err(BackendError::Parse(format!(
                "insert into {table} returned no rows"
            )));
        }
        Ok(stored.swap_remove(0))
    }
}
