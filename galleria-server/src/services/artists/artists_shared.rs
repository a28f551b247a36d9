use std::sync::Arc;

use galleria_core::{GalleryApp, ServiceCapabilities, ServiceMethodKind};
use serde_json::Value;

use crate::hooks::RequireOperator;
use crate::services::GalleryParams;
use crate::state::GalleryState;

use super::artists_hooks::SendWelcomeSms;

pub fn capabilities() -> ServiceCapabilities {
    ServiceCapabilities::from_methods(vec![
        ServiceMethodKind::Find,
        ServiceMethodKind::Get,
        ServiceMethodKind::Create,
        ServiceMethodKind::Remove,
    ])
}

pub fn register_hooks(app: &GalleryApp<Value, GalleryParams>, state: &Arc<GalleryState>) -> anyhow::Result<()> {
    app.service(crate::services::ARTISTS)?.hooks(|h| {
        h.before_all(Arc::new(RequireOperator {
            key: state.operator_key.clone(),
        }));
        h.after_create(Arc::new(SendWelcomeSms {
            state: Arc::clone(state),
        }));
    });
    Ok(())
}
