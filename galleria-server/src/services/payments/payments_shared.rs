use std::sync::Arc;

use galleria_core::GalleryApp;
use serde_json::Value;

use crate::services::GalleryParams;
use crate::state::GalleryState;

use super::payments_hooks::{ProvisionFromPayment, VerifyWebhookSecret};

pub fn register_hooks(app: &GalleryApp<Value, GalleryParams>, state: &GalleryState) -> anyhow::Result<()> {
    app.service(crate::services::PAYMENTS)?.hooks(|h| {
        h.before_create(Arc::new(VerifyWebhookSecret {
            secret: state.webhook_secret.clone(),
        }));
        h.after_create(Arc::new(ProvisionFromPayment));
    });
    Ok(())
}
