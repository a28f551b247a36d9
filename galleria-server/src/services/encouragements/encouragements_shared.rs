use std::sync::Arc;

use galleria_core::{GalleryApp, ServiceCapabilities, ServiceMethodKind};
use serde_json::Value;

use crate::hooks::RequireAdmin;
use crate::services::GalleryParams;
use crate::state::GalleryState;

pub fn capabilities() -> ServiceCapabilities {
    ServiceCapabilities::from_methods(vec![
        ServiceMethodKind::Find,
        ServiceMethodKind::Create,
        ServiceMethodKind::Remove,
    ])
}

/// Visitors read and post; only the artist deletes.
pub fn register_hooks(app: &GalleryApp<Value, GalleryParams>, state: &GalleryState) -> anyhow::Result<()> {
    app.service(crate::services::ENCOURAGEMENTS)?.hooks(|h| {
        h.before(
            ServiceMethodKind::Remove,
            Arc::new(RequireAdmin {
                tokens: Arc::clone(&state.tokens),
            }),
        );
    });
    Ok(())
}
