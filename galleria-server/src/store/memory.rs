use std::cmp::Ordering;
use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{Direction, Query, RecordStore, StoreError};

/// Tables kept in process. Used for tests and local runs.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, Vec<Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        // nulls compare greatest, as in Postgres: last on asc, first on desc
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), _) => Ordering::Greater,
        (_, None | Some(Value::Null)) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

fn sort_rows(rows: &mut [Value], order: &[(String, Direction)]) {
    rows.sort_by(|a, b| {
        for (col, dir) in order {
            let ord = compare(a.get(col), b.get(col));
            let ord = match dir {
                Direction::Asc => ord,
                Direction::Desc => ord.reverse(),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    });
}

fn merge(target: &mut Value, patch: &Value) {
    if let (Some(t), Some(p)) = (target.as_object_mut(), patch.as_object()) {
        for (k, v) in p {
            t.insert(k.clone(), v.clone());
        }
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<Value> = tables
            .get(table)
            .map(|rows| rows.iter().filter(|r| query.matches(r)).cloned().collect())
            .unwrap_or_default();

        sort_rows(&mut rows, &query.order);
        if let Some(n) = query.limit {
            rows.truncate(n);
        }
        Ok(rows)
    }

    async fn insert(&self, table: &str, row: Value) -> Result<Value> {
        if !row.is_object() {
            return Err(StoreError::Decode("rows must be JSON objects".into()).into_anyhow());
        }
        let mut tables = self.tables.write().await;
        tables.entry(table.to_string()).or_default().push(row.clone());
        Ok(row)
    }

    async fn upsert(&self, table: &str, row: Value, on_conflict: &[&str]) -> Result<Value> {
        if !row.is_object() {
            return Err(StoreError::Decode("rows must be JSON objects".into()).into_anyhow());
        }
        let mut tables = self.tables.write().await;
        let rows = tables.entry(table.to_string()).or_default();

        let existing = rows
            .iter_mut()
            .find(|r| on_conflict.iter().all(|c| r.get(*c).is_some() && r.get(*c) == row.get(*c)));

        match existing {
            Some(current) => {
                merge(current, &row);
                Ok(current.clone())
            }
            None => {
                rows.push(row.clone());
                Ok(row)
            }
        }
    }

    async fn update(&self, table: &str, query: &Query, patch: Value) -> Result<Vec<Value>> {
        let mut tables = self.tables.write().await;
        let Some(rows) = tables.get_mut(table) else {
            return Ok(Vec::new());
        };

        let mut out = Vec::new();
        for row in rows.iter_mut().filter(|r| query.matches(r)) {
            merge(row, &patch);
            out.push(row.clone());
        }
        Ok(out)
    }

    async fn delete(&self, table: &str, query: &Query) -> Result<Vec<Value>> {
        let mut tables = self.tables.write().await;
        let Some(rows) = tables.get_mut(table) else {
            return Ok(Vec::new());
        };

        let (removed, kept): (Vec<Value>, Vec<Value>) = rows.drain(..).partition(|r| query.matches(r));
        *rows = kept;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn select_filters_and_orders() {
        let store = MemoryStore::new();
        store.insert("t", json!({"a": "x", "n": 2})).await.unwrap();
        store.insert("t", json!({"a": "y", "n": 1})).await.unwrap();
        store.insert("t", json!({"a": "x", "n": 1})).await.unwrap();
        store.insert("t", json!({"a": "x"})).await.unwrap();

        let rows = store.select("t", &Query::new().eq("a", "x").asc("n")).await.unwrap();
        let ns: Vec<Value> = rows.iter().map(|r| r.get("n").cloned().unwrap_or(Value::Null)).collect();
        assert_eq!(ns, vec![json!(1), json!(2), Value::Null]);

        let rows = store.select("t", &Query::new().desc("n").limit(2)).await.unwrap();
        assert!(rows[0].get("n").is_none());
        assert_eq!(rows[1]["n"], 2);
    }

    #[tokio::test]
    async fn descending_order_puts_missing_values_first() {
        let store = MemoryStore::new();
        store.insert("t", json!({"id": "a", "at": "2024-01-02"})).await.unwrap();
        store.insert("t", json!({"id": "b", "at": null})).await.unwrap();
        store.insert("t", json!({"id": "c", "at": "2024-03-01"})).await.unwrap();

        let ids = |rows: Vec<Value>| -> Vec<String> {
            rows.iter().filter_map(|r| r["id"].as_str()).map(str::to_string).collect()
        };
        let desc = store.select("t", &Query::new().desc("at")).await.unwrap();
        assert_eq!(ids(desc), ["b", "c", "a"]);
        let asc = store.select("t", &Query::new().asc("at")).await.unwrap();
        assert_eq!(ids(asc), ["a", "c", "b"]);
    }

    #[tokio::test]
    async fn upsert_merges_on_conflict_columns() {
        let store = MemoryStore::new();
        store
            .upsert("settings", json!({"artist_id": "a", "title": "One", "theme": "dark"}), &["artist_id"])
            .await
            .unwrap();
        let row = store
            .upsert("settings", json!({"artist_id": "a", "title": "Two"}), &["artist_id"])
            .await
            .unwrap();

        assert_eq!(row, json!({"artist_id": "a", "title": "Two", "theme": "dark"}));
        assert_eq!(store.select("settings", &Query::new()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_and_delete_touch_only_matches() {
        let store = MemoryStore::new();
        store.insert("t", json!({"id": "1", "tenant": "a"})).await.unwrap();
        store.insert("t", json!({"id": "2", "tenant": "b"})).await.unwrap();

        let updated = store
            .update("t", &Query::new().eq("tenant", "a"), json!({"seen": true}))
            .await
            .unwrap();
        assert_eq!(updated.len(), 1);

        let removed = store.delete("t", &Query::new().eq("tenant", "b")).await.unwrap();
        assert_eq!(removed[0]["id"], "2");

        let left = store.select("t", &Query::new()).await.unwrap();
        assert_eq!(left, vec![json!({"id": "1", "tenant": "a", "seen": true})]);
    }
}
