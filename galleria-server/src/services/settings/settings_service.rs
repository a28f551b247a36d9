use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use galleria_core::{ServiceCapabilities, ServiceMethodKind, TenantContext, TenantService};
use serde_json::Value;

use crate::services::GalleryParams;
use crate::store::{Query, RecordStore, SETTINGS};
use crate::utils::time::now_ts;

use super::settings_schema::{Settings, SettingsPatch};

/// One settings row per tenant. `find` never fails for a missing row and
/// `patch` upserts.
pub struct SettingsService {
    pub store: Arc<dyn RecordStore>,
}

impl SettingsService {
    async fn current(&self, ctx: &TenantContext) -> Result<Settings> {
        let row = self
            .store
            .select_one(SETTINGS, &Query::new().eq("artist_id", ctx.id()))
            .await?;

        let Some(row) = row else {
            return Ok(Settings::default());
        };
        match serde_json::from_value(row) {
            Ok(s) => Ok(s),
            Err(e) => {
                tracing::warn!(tenant = ctx.id(), error = %e, "unreadable settings row; using defaults");
                Ok(Settings::default())
            }
        }
    }

    fn to_json(ctx: &TenantContext, settings: &Settings) -> Result<Value> {
        let mut v = serde_json::to_value(settings)?;
        if let Some(map) = v.as_object_mut() {
            map.insert("artist_id".into(), Value::String(ctx.id().to_string()));
        }
        Ok(v)
    }
}

#[async_trait]
impl TenantService<Value, GalleryParams> for SettingsService {
    fn capabilities(&self) -> ServiceCapabilities {
        ServiceCapabilities::from_methods(vec![ServiceMethodKind::Find, ServiceMethodKind::Patch])
    }

    async fn find(&self, ctx: &TenantContext, _params: GalleryParams) -> Result<Vec<Value>> {
        let settings = self.current(ctx).await?;
        Ok(vec![Self::to_json(ctx, &settings)?])
    }

    async fn patch(&self, ctx: &TenantContext, _id: Option<&str>, data: Value, _params: GalleryParams) -> Result<Value> {
        let patch = SettingsPatch::parse(&data)?;
        let mut settings = self.current(ctx).await?;
        patch.apply(&mut settings);
        settings.updated_at = Some(now_ts());

        let row = Self::to_json(ctx, &settings)?;
        let saved = self.store.upsert(SETTINGS, row, &["artist_id"]).await?;
        tracing::info!(tenant = ctx.id(), "settings saved");
        Ok(saved)
    }
}
