use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use galleria_auth::{hash_password, AuthError};
use galleria_core::errors::GalleryError;
use galleria_core::{ServiceCapabilities, ServiceMethodKind, TenantContext, TenantService};
use serde::Deserialize;
use serde_json::{json, Value};
use validator::Validate;

use crate::services::GalleryParams;
use crate::state::GalleryState;
use crate::store::AUTH_PASSWORDS;
use crate::utils::time::now_ts;
use crate::utils::validation::validate;

use super::auth_service::{check_password, stored_hash};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct ChangePassword {
    #[validate(length(min = 1, message = "currentPassword is required"))]
    current_password: String,
    new_password: String,
}

/// Hash `plain` and upsert it as the tenant's password. Returns `updated_at`.
pub async fn save_password(state: &GalleryState, artist_id: &str, plain: String) -> Result<String> {
    let cost = state.auth.bcrypt_cost;
    let hash = tokio::task::spawn_blocking(move || hash_password(&plain, cost))
        .await?
        .map_err(|e| e.into_anyhow())?;

    let updated_at = now_ts();
    state
        .store
        .upsert(
            AUTH_PASSWORDS,
            json!({"artist_id": artist_id, "password_hash": hash, "updated_at": updated_at}),
            &["artist_id"],
        )
        .await?;
    Ok(updated_at)
}

/// `patch` rotates the admin password of the calling tenant.
pub struct PasswordsService {
    pub state: Arc<GalleryState>,
}

#[async_trait]
impl TenantService<Value, GalleryParams> for PasswordsService {
    fn capabilities(&self) -> ServiceCapabilities {
        ServiceCapabilities::from_methods(vec![ServiceMethodKind::Patch])
    }

    async fn patch(&self, ctx: &TenantContext, _id: Option<&str>, data: Value, _params: GalleryParams) -> Result<Value> {
        let input: ChangePassword = validate(&data, "Password validation failed")?;

        let min = self.state.auth.min_password_len;
        if input.new_password.chars().count() < min {
            return Err(AuthError::PasswordTooShort(min).into_anyhow());
        }

        let matches = match stored_hash(&self.state, ctx).await? {
            Some(hash) => check_password(hash, input.current_password).await?,
            None => false,
        };
        if !matches {
            return Err(GalleryError::bad_request("Current password is incorrect")
                .with_errors(json!({"currentPassword": ["is incorrect"]}))
                .into_anyhow());
        }

        let updated_at = save_password(&self.state, ctx.id(), input.new_password).await?;
        tracing::info!(tenant = ctx.id(), "admin password changed");
        Ok(json!({"artistId": ctx.id(), "updatedAt": updated_at}))
    }
}
