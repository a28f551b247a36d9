use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use galleria_core::{ServiceCapabilities, TenantContext, TenantService};
use serde_json::Value;

use crate::services::adapters::tenant_table::{require_id, TenantTable};
use crate::services::GalleryParams;
use crate::store::{Query, RecordStore, ENCOURAGEMENTS};

use super::encouragements_schema::NewEncouragement;
use super::encouragements_shared;

const PAGE: usize = 100;

pub struct EncouragementsService {
    pub table: TenantTable,
}

impl EncouragementsService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            table: TenantTable {
                store,
                table: ENCOURAGEMENTS,
                not_found_prefix: "Encouragement not found",
            },
        }
    }
}

#[async_trait]
impl TenantService<Value, GalleryParams> for EncouragementsService {
    fn capabilities(&self) -> ServiceCapabilities {
        encouragements_shared::capabilities()
    }

    /// Newest first.
    async fn find(&self, ctx: &TenantContext, _params: GalleryParams) -> Result<Vec<Value>> {
        self.table
            .find(ctx, Query::new().desc("created_at").limit(PAGE))
            .await
    }

    async fn create(&self, ctx: &TenantContext, data: Value, _params: GalleryParams) -> Result<Value> {
        let row = NewEncouragement::parse(&data)?;
        let created = self.table.create(ctx, row).await?;
        tracing::info!(tenant = ctx.id(), "encouragement posted");
        Ok(created)
    }

    async fn remove(&self, ctx: &TenantContext, id: Option<&str>, _params: GalleryParams) -> Result<Value> {
        let id = require_id(id, "Remove requires an id")?;
        self.table.remove(ctx, id).await
    }
}
