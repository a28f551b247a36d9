use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use galleria_core::{bail_gallery, GalleryApp, ServiceCapabilities, ServiceMethodKind, TenantContext, TenantService};
use serde_json::{json, Value};

use crate::hooks::RequireAdmin;
use crate::services::adapters::tenant_table::TenantTable;
use crate::services::GalleryParams;
use crate::state::GalleryState;
use crate::store::{RecordStore, VISITS};
use crate::utils::time::{now_ts, today};

const STATS_ID: &str = "stats";
const STATS_DAYS: usize = 30;

/// Daily visit counters, one row per tenant and day.
pub struct VisitsService {
    pub store: Arc<dyn RecordStore>,
}

fn count_of(row: &Value) -> u64 {
    row.get("count").and_then(Value::as_u64).unwrap_or(0)
}

/// `{today, total, days}` from rows ordered newest day first.
pub fn summarize(rows: &[Value], day: &str) -> Value {
    let today = rows
        .iter()
        .find(|r| r.get("day").and_then(Value::as_str) == Some(day))
        .map(count_of)
        .unwrap_or(0);
    let total: u64 = rows.iter().map(count_of).sum();
    let days: Vec<Value> = rows
        .iter()
        .take(STATS_DAYS)
        .map(|r| json!({"day": r.get("day").cloned().unwrap_or(Value::Null), "count": count_of(r)}))
        .collect();

    json!({"today": today, "total": total, "days": days})
}

#[async_trait]
impl TenantService<Value, GalleryParams> for VisitsService {
    fn capabilities(&self) -> ServiceCapabilities {
        ServiceCapabilities::from_methods(vec![ServiceMethodKind::Create, ServiceMethodKind::Get])
    }

    /// Counts one visit for today. Concurrent visits may lose increments.
    async fn create(&self, ctx: &TenantContext, _data: Value, _params: GalleryParams) -> Result<Value> {
        let day = today();
        let key = TenantTable::scoped(ctx).eq("day", day.as_str());
        let current = self.store.select_one(VISITS, &key).await?;
        let count = current.as_ref().map(count_of).unwrap_or(0) + 1;

        self.store
            .upsert(
                VISITS,
                json!({"artist_id": ctx.id(), "day": day, "count": count, "updated_at": now_ts()}),
                &["artist_id", "day"],
            )
            .await?;

        Ok(json!({"artistId": ctx.id(), "day": day, "count": count}))
    }

    async fn get(&self, ctx: &TenantContext, id: &str, _params: GalleryParams) -> Result<Value> {
        if id != STATS_ID {
            bail_gallery!(not_found, "Unknown visits resource: {}", id);
        }
        let rows = self
            .store
            .select(VISITS, &TenantTable::scoped(ctx).desc("day"))
            .await?;
        Ok(summarize(&rows, &today()))
    }
}

/// Anyone may count a visit; stats are for the artist.
pub fn register_hooks(app: &GalleryApp<Value, GalleryParams>, state: &GalleryState) -> anyhow::Result<()> {
    app.service(crate::services::VISITS)?.hooks(|h| {
        h.before(
            ServiceMethodKind::Get,
            Arc::new(RequireAdmin {
                tokens: Arc::clone(&state.tokens),
            }),
        );
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_totals_all_days() {
        let rows = vec![
            json!({"day": "2024-05-03", "count": 4}),
            json!({"day": "2024-05-02", "count": 1}),
            json!({"day": "2024-05-01", "count": 7}),
        ];
        let s = summarize(&rows, "2024-05-03");
        assert_eq!(s["today"], 4);
        assert_eq!(s["total"], 12);
        assert_eq!(s["days"].as_array().unwrap().len(), 3);

        let quiet = summarize(&rows, "2024-05-04");
        assert_eq!(quiet["today"], 0);
    }
}
