use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use galleria_auth::generate_password;
use galleria_core::errors::GalleryError;
use galleria_core::{bail_gallery, ServiceCapabilities, TenantContext, TenantService};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::services::adapters::tenant_table::require_id;
use crate::services::GalleryParams;
use crate::state::GalleryState;
use crate::services::auth::passwords_service::save_password;
use crate::store::{Query, ARTISTS, ARTWORKS, AUTH_PASSWORDS, SETTINGS};
use crate::utils::time::now_ts;
use crate::utils::validation::validate;

use super::artists_schema::NewArtist;
use super::artists_shared;

pub const VIP_PREFIX: &str = "gallery-vip-";
const INITIAL_PASSWORD_LEN: usize = 10;
const LINK_ID_LEN: usize = 12;

/// VIP tenants. Rows are operator data, not partitioned by tenant.
pub struct ArtistsService {
    pub state: Arc<GalleryState>,
}

/// `gallery-vip-NN` after the highest existing number.
pub fn next_vip_id<'a>(existing: impl IntoIterator<Item = &'a str>) -> String {
    let max = existing
        .into_iter()
        .filter_map(|id| id.strip_prefix(VIP_PREFIX))
        .filter_map(|n| n.parse::<u32>().ok())
        .max()
        .unwrap_or(0);
    format!("{VIP_PREFIX}{:02}", max + 1)
}

fn link_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(LINK_ID_LEN);
    id
}

impl ArtistsService {
    fn lookup_query(params: &GalleryParams) -> Query {
        let mut q = Query::new();
        for col in ["link_id", "transaction_id", "artist_id"] {
            if let Some(v) = params.query_param(col).filter(|v| !v.is_empty()) {
                q = q.eq(col, v);
            }
        }
        q.desc("created_at")
    }

    /// An id is taken once any table knows it as a tenant, with or without
    /// an `artists` row.
    async fn tenant_exists(&self, artist_id: &str) -> Result<bool> {
        let by_tenant = Query::new().eq("artist_id", artist_id);
        for table in [ARTISTS, AUTH_PASSWORDS, SETTINGS] {
            if self.state.store.select_one(table, &by_tenant).await?.is_some() {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

#[async_trait]
impl TenantService<Value, GalleryParams> for ArtistsService {
    fn capabilities(&self) -> ServiceCapabilities {
        artists_shared::capabilities()
    }

    async fn find(&self, _ctx: &TenantContext, params: GalleryParams) -> Result<Vec<Value>> {
        self.state.store.select(ARTISTS, &Self::lookup_query(&params)).await
    }

    async fn get(&self, _ctx: &TenantContext, id: &str, _params: GalleryParams) -> Result<Value> {
        self.state
            .store
            .select_one(ARTISTS, &Query::new().eq("id", id))
            .await?
            .ok_or_else(|| GalleryError::not_found(format!("Artist not found: {id}")).into_anyhow())
    }

    /// Provision a VIP tenant with an initial password.
    ///
    /// The result carries `initial_password` so the caller can deliver it;
    /// it is never stored in plain text.
    async fn create(&self, _ctx: &TenantContext, data: Value, _params: GalleryParams) -> Result<Value> {
        let input: NewArtist = validate(&data, "Artist validation failed")?;
        let store = &self.state.store;

        let existing = store.select(ARTISTS, &Query::new()).await?;
        let artist_id = match input.artist_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => next_vip_id(existing.iter().filter_map(|a| a.get("artist_id").and_then(Value::as_str))),
        };
        if self.tenant_exists(&artist_id).await? {
            bail_gallery!(conflict, "Artist already exists: {}", artist_id);
        }

        let row = json!({
            "id": Uuid::new_v4().to_string(),
            "artist_id": artist_id,
            "link_id": link_id(),
            "name": input.name.trim(),
            "email": input.email,
            "phone": input.phone,
            "is_subscribed": input.is_subscribed,
            "price": input.price,
            "transaction_id": input.transaction_id,
            "created_at": now_ts(),
        });
        let mut created = store.insert(ARTISTS, row).await?;

        let password = input
            .password
            .unwrap_or_else(|| generate_password(INITIAL_PASSWORD_LEN));
        save_password(&self.state, &artist_id, password.clone()).await?;

        tracing::info!(artist_id = %artist_id, "VIP artist provisioned");

        if let Some(map) = created.as_object_mut() {
            map.insert("initial_password".into(), Value::String(password));
        }
        Ok(created)
    }

    /// Deletes the VIP's artworks and password row before the artist row,
    /// so a failed step leaves the artist in place to retry from.
    async fn remove(&self, _ctx: &TenantContext, id: Option<&str>, _params: GalleryParams) -> Result<Value> {
        let id = require_id(id, "Remove requires an id")?;
        let store = &self.state.store;
        let by_id = Query::new().eq("id", id);

        let Some(artist) = store.select_one(ARTISTS, &by_id).await? else {
            bail_gallery!(not_found, "Artist not found: {}", id);
        };

        if let Some(artist_id) = artist.get("artist_id").and_then(Value::as_str) {
            let by_tenant = Query::new().eq("artist_id", artist_id);
            let artworks = store.delete(ARTWORKS, &by_tenant).await?;
            let passwords = store.delete(AUTH_PASSWORDS, &by_tenant).await?;
            tracing::info!(
                artist_id,
                artworks = artworks.len(),
                passwords = passwords.len(),
                "VIP artist data removed"
            );
        }

        Ok(store.delete(ARTISTS, &by_id).await?.into_iter().next().unwrap_or(artist))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vip_ids_continue_the_sequence() {
        assert_eq!(next_vip_id([]), "gallery-vip-01");
        assert_eq!(
            next_vip_id(["gallery-vip-01", "vip-gallery-07", "gallery-vip-09", "-vqsk"]),
            "gallery-vip-10"
        );
        assert_eq!(next_vip_id(["gallery-vip-99"]), "gallery-vip-100");
    }
}
