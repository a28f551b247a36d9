use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use galleria_auth::{verify_password, AuthError};
use galleria_core::{ServiceCapabilities, ServiceMethodKind, TenantContext, TenantService};
use serde::Deserialize;
use serde_json::{json, Value};
use validator::Validate;

use crate::services::GalleryParams;
use crate::state::GalleryState;
use crate::store::{Query, AUTH_PASSWORDS};
use crate::utils::validation::validate;

#[derive(Debug, Deserialize, Validate)]
struct Login {
    #[validate(length(min = 1, message = "password is required"))]
    password: String,
}

/// Looks up the stored bcrypt hash of a tenant.
pub async fn stored_hash(state: &GalleryState, ctx: &TenantContext) -> Result<Option<String>> {
    let row = state
        .store
        .select_one(AUTH_PASSWORDS, &Query::new().eq("artist_id", ctx.id()))
        .await?;
    Ok(row.and_then(|r| r.get("password_hash").and_then(Value::as_str).map(str::to_string)))
}

pub async fn check_password(hash: String, plain: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || verify_password(&plain, &hash))
        .await?
        .map_err(|e| e.into_anyhow())
}

/// `create` exchanges the tenant's admin password for a session token.
pub struct AuthService {
    pub state: Arc<GalleryState>,
}

#[async_trait]
impl TenantService<Value, GalleryParams> for AuthService {
    fn capabilities(&self) -> ServiceCapabilities {
        ServiceCapabilities::from_methods(vec![ServiceMethodKind::Create])
    }

    async fn create(&self, ctx: &TenantContext, data: Value, _params: GalleryParams) -> Result<Value> {
        let login: Login = validate(&data, "Login validation failed")?;

        let Some(hash) = stored_hash(&self.state, ctx).await? else {
            tracing::debug!(tenant = ctx.id(), "login for tenant without password");
            return Err(AuthError::InvalidCredentials.into_anyhow());
        };
        if !check_password(hash, login.password).await? {
            tracing::info!(tenant = ctx.id(), "login rejected");
            return Err(AuthError::InvalidCredentials.into_anyhow());
        }

        let token = self.state.tokens.issue(ctx.id()).map_err(|e| e.into_anyhow())?;
        tracing::info!(tenant = ctx.id(), "admin login");
        Ok(json!({"accessToken": token, "artistId": ctx.id()}))
    }
}
