use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::{header, Client, Method, RequestBuilder, Response};
use serde_json::Value;

use super::{Direction, Query, RecordStore, StoreError};

/// Tables behind a PostgREST endpoint (`{url}/rest/v1/{table}`), e.g. Supabase.
pub struct PostgrestStore {
    client: Client,
    base_url: String,
    key: String,
}

impl PostgrestStore {
    pub fn new(url: &str, key: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: format!("{}/rest/v1", url.trim_end_matches('/')),
            key: key.to_string(),
        })
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}/{table}", self.base_url))
            .header("apikey", &self.key)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.key))
    }

    async fn rows(response: Response) -> Result<Vec<Value>, StoreError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), %body, "store request rejected");
            return Err(StoreError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        match response.json::<Value>().await? {
            Value::Array(rows) => Ok(rows),
            Value::Null => Ok(Vec::new()),
            other => Err(StoreError::Decode(format!("expected an array, got {other}"))),
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Vec<Value>> {
        let response = builder.send().await.map_err(|e| StoreError::from(e).into_anyhow())?;
        Self::rows(response).await.map_err(StoreError::into_anyhow)
    }
}

fn literal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// PostgREST query string for `query`: `col=eq.v`, `order=a.asc,b.desc`, `limit=n`.
pub(crate) fn query_params(query: &Query) -> Vec<(String, String)> {
    let mut out: Vec<(String, String)> = query
        .filters
        .iter()
        .map(|(col, v)| (col.clone(), format!("eq.{}", literal(v))))
        .collect();

    if !query.order.is_empty() {
        let order = query
            .order
            .iter()
            .map(|(col, dir)| match dir {
                Direction::Asc => format!("{col}.asc"),
                Direction::Desc => format!("{col}.desc"),
            })
            .collect::<Vec<_>>()
            .join(",");
        out.push(("order".to_string(), order));
    }

    if let Some(n) = query.limit {
        out.push(("limit".to_string(), n.to_string()));
    }
    out
}

fn first(rows: Vec<Value>) -> Result<Value> {
    rows.into_iter()
        .next()
        .ok_or_else(|| StoreError::Decode("no row returned".into()).into_anyhow())
}

#[async_trait]
impl RecordStore for PostgrestStore {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>> {
        let mut params = vec![("select".to_string(), "*".to_string())];
        params.extend(query_params(query));
        self.send(self.request(Method::GET, table).query(&params)).await
    }

    async fn insert(&self, table: &str, row: Value) -> Result<Value> {
        let req = self
            .request(Method::POST, table)
            .header("Prefer", "return=representation")
            .json(&row);
        first(self.send(req).await?)
    }

    async fn upsert(&self, table: &str, row: Value, on_conflict: &[&str]) -> Result<Value> {
        let req = self
            .request(Method::POST, table)
            .query(&[("on_conflict", on_conflict.join(","))])
            .header("Prefer", "return=representation,resolution=merge-duplicates")
            .json(&row);
        first(self.send(req).await?)
    }

    async fn update(&self, table: &str, query: &Query, patch: Value) -> Result<Vec<Value>> {
        let req = self
            .request(Method::PATCH, table)
            .query(&query_params(query))
            .header("Prefer", "return=representation")
            .json(&patch);
        self.send(req).await
    }

    async fn delete(&self, table: &str, query: &Query) -> Result<Vec<Value>> {
        let req = self
            .request(Method::DELETE, table)
            .query(&query_params(query))
            .header("Prefer", "return=representation");
        self.send(req).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn builds_postgrest_filters() {
        let q = Query::new()
            .eq("artist_id", "-vqsk")
            .eq("year", json!(2020))
            .asc("sort_order")
            .desc("created_at")
            .limit(5);

        assert_eq!(
            query_params(&q),
            vec![
                ("artist_id".to_string(), "eq.-vqsk".to_string()),
                ("year".to_string(), "eq.2020".to_string()),
                ("order".to_string(), "sort_order.asc,created_at.desc".to_string()),
                ("limit".to_string(), "5".to_string()),
            ]
        );
    }

    #[test]
    fn trailing_slash_is_ignored() {
        let store = PostgrestStore::new("https://db.example/", "k", Duration::from_secs(1)).unwrap();
        assert_eq!(store.base_url, "https://db.example/rest/v1");
    }
}
