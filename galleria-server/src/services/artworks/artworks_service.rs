use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use galleria_core::{ServiceCapabilities, TenantContext, TenantService};
use serde_json::Value;

use crate::services::adapters::tenant_table::{require_id, TenantTable};
use crate::services::GalleryParams;
use crate::store::{Query, RecordStore, ARTWORKS};

use super::artworks_schema::ArtworkData;
use super::artworks_shared;

pub struct ArtworksService {
    pub table: TenantTable,
}

impl ArtworksService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            table: TenantTable {
                store,
                table: ARTWORKS,
                not_found_prefix: "Artwork not found",
            },
        }
    }
}

#[async_trait]
impl TenantService<Value, GalleryParams> for ArtworksService {
    fn capabilities(&self) -> ServiceCapabilities {
        artworks_shared::crud_capabilities()
    }

    async fn find(&self, ctx: &TenantContext, _params: GalleryParams) -> Result<Vec<Value>> {
        self.table
            .find(ctx, Query::new().asc("sort_order").asc("created_at"))
            .await
    }

    async fn get(&self, ctx: &TenantContext, id: &str, _params: GalleryParams) -> Result<Value> {
        self.table.get(ctx, id).await
    }

    async fn create(&self, ctx: &TenantContext, data: Value, _params: GalleryParams) -> Result<Value> {
        let row = ArtworkData::for_write(&data)?;
        let created = self.table.create(ctx, row).await?;
        tracing::info!(tenant = ctx.id(), id = ?created.get("id"), "artwork created");
        Ok(created)
    }

    async fn update(&self, ctx: &TenantContext, id: &str, data: Value, _params: GalleryParams) -> Result<Value> {
        let row = ArtworkData::for_write(&data)?;
        self.table.replace(ctx, id, row).await
    }

    async fn patch(&self, ctx: &TenantContext, id: Option<&str>, data: Value, _params: GalleryParams) -> Result<Value> {
        let id = require_id(id, "Patch requires an id")?;
        let row = ArtworkData::for_patch(&data)?;
        self.table.patch(ctx, id, row).await
    }

    async fn remove(&self, ctx: &TenantContext, id: Option<&str>, _params: GalleryParams) -> Result<Value> {
        let id = require_id(id, "Remove requires an id")?;
        self.table.remove(ctx, id).await
    }
}
