use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use galleria_auth::{AdminSession, TokenIssuer};
use galleria_core::errors::GalleryError;
use galleria_core::{BeforeHook, ErrorHook, GalleryApp, HookContext};
use serde_json::Value;

use crate::services::GalleryParams;

pub const OPERATOR_KEY_HEADER: &str = "x-operator-key";

pub struct LogCall;

#[async_trait]
impl BeforeHook<Value, GalleryParams> for LogCall {
    async fn run(&self, ctx: &mut HookContext<Value, GalleryParams>) -> Result<()> {
        tracing::debug!(
            method = ctx.method.as_str(),
            tenant = ctx.tenant.id(),
            provider = %ctx.params.provider,
            path = %ctx.params.path,
            "service call"
        );
        Ok(())
    }
}

pub struct LogFailure;

#[async_trait]
impl ErrorHook<Value, GalleryParams> for LogFailure {
    async fn run(&self, ctx: &mut HookContext<Value, GalleryParams>) -> Result<()> {
        if let Some(err) = &ctx.error {
            let code = GalleryError::find_in(err).map(|e| e.code()).unwrap_or(500);
            if code >= 500 {
                tracing::warn!(method = ctx.method.as_str(), tenant = ctx.tenant.id(), code, error = %err, "service call failed");
            } else {
                tracing::debug!(method = ctx.method.as_str(), tenant = ctx.tenant.id(), code, error = %err, "service call rejected");
            }
        }
        Ok(())
    }
}

/// External calls need an admin session of the request's own tenant.
pub struct RequireAdmin {
    pub tokens: Arc<TokenIssuer>,
}

#[async_trait]
impl BeforeHook<Value, GalleryParams> for RequireAdmin {
    async fn run(&self, ctx: &mut HookContext<Value, GalleryParams>) -> Result<()> {
        if !ctx.params.is_external() {
            return Ok(());
        }
        AdminSession::require(&self.tokens, ctx.params.header("authorization"), &ctx.tenant)
            .map_err(|e| e.into_anyhow())?;
        Ok(())
    }
}

/// External calls need `x-operator-key` equal to `operator.key`.
pub struct RequireOperator {
    pub key: Option<String>,
}

#[async_trait]
impl BeforeHook<Value, GalleryParams> for RequireOperator {
    async fn run(&self, ctx: &mut HookContext<Value, GalleryParams>) -> Result<()> {
        if !ctx.params.is_external() {
            return Ok(());
        }
        let Some(expected) = self.key.as_deref() else {
            return Err(GalleryError::forbidden("Operator access is not configured").into_anyhow());
        };
        match ctx.params.header(OPERATOR_KEY_HEADER) {
            None => Err(GalleryError::not_authenticated("Missing operator key").into_anyhow()),
            Some(given) if given == expected => Ok(()),
            Some(_) => Err(GalleryError::forbidden("Invalid operator key").into_anyhow()),
        }
    }
}

pub fn global_hooks(app: &GalleryApp<Value, GalleryParams>) {
    app.hooks(|h| {
        h.before_all(Arc::new(LogCall));
        h.error_all(Arc::new(LogFailure));
    });
}
