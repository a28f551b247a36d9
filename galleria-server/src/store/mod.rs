//! Record storage.
//!
//! Services talk to tables through [`RecordStore`]. Rows are JSON objects;
//! queries are equality filters plus ordering, which is all the gallery
//! needs and maps one to one onto PostgREST query strings. Upstream
//! failures surface as `502 BadGateway`.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use galleria_core::errors::GalleryError;
use galleria_core::GalleryConfigSnapshot;
use serde_json::Value;
use thiserror::Error;

pub mod memory;
pub mod postgrest;

pub use memory::MemoryStore;
pub use postgrest::PostgrestStore;

pub const SETTINGS: &str = "settings";
pub const ARTWORKS: &str = "artworks";
pub const ARTISTS: &str = "artists";
pub const AUTH_PASSWORDS: &str = "auth_passwords";
pub const VISITS: &str = "visits";
pub const ENCOURAGEMENTS: &str = "encouragements";
pub const VERIFICATION_CODES: &str = "verification_codes";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store responded {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected store response: {0}")]
    Decode(String),
}

impl From<StoreError> for GalleryError {
    fn from(e: StoreError) -> Self {
        GalleryError::bad_gateway(e.to_string())
    }
}

impl StoreError {
    pub fn into_anyhow(self) -> anyhow::Error {
        GalleryError::from(self).into_anyhow()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Default)]
pub struct Query {
    pub filters: Vec<(String, Value)>,
    pub order: Vec<(String, Direction)>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.filters.push((column.to_string(), value.into()));
        self
    }

    pub fn asc(mut self, column: &str) -> Self {
        self.order.push((column.to_string(), Direction::Asc));
        self
    }

    pub fn desc(mut self, column: &str) -> Self {
        self.order.push((column.to_string(), Direction::Desc));
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    /// Every filter matches `row`.
    pub fn matches(&self, row: &Value) -> bool {
        self.filters
            .iter()
            .all(|(col, want)| row.get(col).is_some_and(|have| have == want))
    }
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>>;

    async fn insert(&self, table: &str, row: Value) -> Result<Value>;

    /// Insert, or merge `row` into the row with equal `on_conflict` columns.
    async fn upsert(&self, table: &str, row: Value, on_conflict: &[&str]) -> Result<Value>;

    /// Merge `patch` into every matching row and return them.
    async fn update(&self, table: &str, query: &Query, patch: Value) -> Result<Vec<Value>>;

    /// Delete matching rows and return them.
    async fn delete(&self, table: &str, query: &Query) -> Result<Vec<Value>>;

    async fn select_one(&self, table: &str, query: &Query) -> Result<Option<Value>> {
        let q = Query {
            limit: Some(1),
            ..query.clone()
        };
        Ok(self.select(table, &q).await?.into_iter().next())
    }
}

/// PostgREST when `store.url` and `store.key` are set, memory otherwise.
pub fn from_config(config: &GalleryConfigSnapshot) -> Result<Arc<dyn RecordStore>> {
    match (config.get("store.url"), config.get("store.key")) {
        (Some(url), Some(key)) => {
            let timeout = config.get_secs("store.timeout").unwrap_or(Duration::from_secs(10));
            tracing::info!(url, "using PostgREST record store");
            Ok(Arc::new(PostgrestStore::new(url, key, timeout)?))
        }
        _ => {
            tracing::warn!("store.url/store.key not set; records are kept in memory");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
