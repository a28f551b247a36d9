use std::sync::Arc;

use anyhow::Result;
use galleria_core::errors::GalleryError;
use galleria_core::TenantContext;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::store::{Query, RecordStore};
use crate::utils::time::now_ts;

/// Columns the server owns; client payloads never set them.
const SERVER_COLUMNS: [&str; 4] = ["id", "artist_id", "created_at", "updated_at"];

/// CRUD over a table partitioned by `artist_id`.
///
/// Every query is filtered by the caller's tenant and every write is
/// stamped with it, so rows of another tenant are invisible (404).
pub struct TenantTable {
    pub store: Arc<dyn RecordStore>,
    pub table: &'static str,
    pub not_found_prefix: &'static str,
}

impl TenantTable {
    pub fn scoped(ctx: &TenantContext) -> Query {
        Query::new().eq("artist_id", ctx.id())
    }

    fn by_id(ctx: &TenantContext, id: &str) -> Query {
        Self::scoped(ctx).eq("id", id)
    }

    fn not_found(&self, id: &str) -> anyhow::Error {
        GalleryError::not_found(format!("{}: {id}", self.not_found_prefix)).into_anyhow()
    }

    fn client_fields(data: Map<String, Value>) -> Map<String, Value> {
        data.into_iter()
            .filter(|(k, _)| !SERVER_COLUMNS.contains(&k.as_str()))
            .collect()
    }

    /// Tenant rows; `order` adds ordering and limits on top of the tenant filter.
    pub async fn find(&self, ctx: &TenantContext, order: Query) -> Result<Vec<Value>> {
        let mut q = Self::scoped(ctx);
        q.order = order.order;
        q.limit = order.limit;
        self.store.select(self.table, &q).await
    }

    pub async fn get(&self, ctx: &TenantContext, id: &str) -> Result<Value> {
        self.store
            .select_one(self.table, &Self::by_id(ctx, id))
            .await?
            .ok_or_else(|| self.not_found(id))
    }

    pub async fn create(&self, ctx: &TenantContext, data: Map<String, Value>) -> Result<Value> {
        let mut row = Self::client_fields(data);
        let ts = now_ts();
        row.insert("id".into(), Value::String(Uuid::new_v4().to_string()));
        row.insert("artist_id".into(), Value::String(ctx.id().to_string()));
        row.insert("created_at".into(), Value::String(ts.clone()));
        row.insert("updated_at".into(), Value::String(ts));
        self.store.insert(self.table, Value::Object(row)).await
    }

    /// Overwrite an existing row. Callers pass every client column
    /// (absent ones as `null`); stores merge, they do not drop columns.
    pub async fn replace(&self, ctx: &TenantContext, id: &str, data: Map<String, Value>) -> Result<Value> {
        let current = self.get(ctx, id).await?;

        let mut row = Self::client_fields(data);
        for col in SERVER_COLUMNS {
            if let Some(v) = current.get(col) {
                row.insert(col.to_string(), v.clone());
            }
        }
        row.insert("updated_at".into(), Value::String(now_ts()));

        self.store
            .update(self.table, &Self::by_id(ctx, id), Value::Object(row))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| self.not_found(id))
    }

    pub async fn patch(&self, ctx: &TenantContext, id: &str, data: Map<String, Value>) -> Result<Value> {
        let mut patch = Self::client_fields(data);
        patch.insert("updated_at".into(), Value::String(now_ts()));

        self.store
            .update(self.table, &Self::by_id(ctx, id), Value::Object(patch))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| self.not_found(id))
    }

    pub async fn remove(&self, ctx: &TenantContext, id: &str) -> Result<Value> {
        self.store
            .delete(self.table, &Self::by_id(ctx, id))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| self.not_found(id))
    }
}

pub fn require_id<'a>(id: Option<&'a str>, msg: &'static str) -> Result<&'a str> {
    id.filter(|s| !s.trim().is_empty())
        .ok_or_else(|| GalleryError::bad_request(msg).into_anyhow())
}

/// The payload as a JSON object, or 400.
pub fn object(data: Value) -> Result<Map<String, Value>> {
    match data {
        Value::Object(map) => Ok(map),
        _ => Err(GalleryError::bad_request("Expected a JSON object").into_anyhow()),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::store::MemoryStore;

    fn table() -> TenantTable {
        TenantTable {
            store: Arc::new(MemoryStore::new()),
            table: "artworks",
            not_found_prefix: "Artwork not found",
        }
    }

    fn map(v: Value) -> Map<String, Value> {
        object(v).unwrap()
    }

    #[tokio::test]
    async fn rows_are_invisible_to_other_tenants() {
        let t = table();
        let a = TenantContext::new("a");
        let b = TenantContext::new("b");

        let row = t.create(&a, map(json!({"title": "Dawn"}))).await.unwrap();
        let id = row["id"].as_str().unwrap();

        assert_eq!(t.find(&b, Query::new()).await.unwrap().len(), 0);
        let err = t.get(&b, id).await.unwrap_err();
        assert_eq!(GalleryError::find_in(&err).unwrap().code(), 404);
        assert!(t.remove(&b, id).await.is_err());
        assert_eq!(t.get(&a, id).await.unwrap()["title"], "Dawn");
    }

    #[tokio::test]
    async fn client_cannot_set_owner_or_id() {
        let t = table();
        let a = TenantContext::new("a");

        let row = t
            .create(&a, map(json!({"title": "x", "artist_id": "b", "id": "fixed"})))
            .await
            .unwrap();
        assert_eq!(row["artist_id"], "a");
        assert_ne!(row["id"], "fixed");

        let id = row["id"].as_str().unwrap();
        let patched = t.patch(&a, id, map(json!({"artist_id": "b", "title": "y"}))).await.unwrap();
        assert_eq!(patched["artist_id"], "a");
        assert_eq!(patched["title"], "y");
    }

    #[tokio::test]
    async fn replace_keeps_server_columns() {
        let t = table();
        let a = TenantContext::new("a");
        let row = t.create(&a, map(json!({"title": "x", "medium": "oil"}))).await.unwrap();
        let id = row["id"].as_str().unwrap();

        let replaced = t.replace(&a, id, map(json!({"title": "z"}))).await.unwrap();
        assert_eq!(replaced["created_at"], row["created_at"]);
        assert_eq!(replaced["title"], "z");
    }
}
