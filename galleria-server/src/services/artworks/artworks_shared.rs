use std::sync::Arc;

use galleria_core::{GalleryApp, ServiceCapabilities, ServiceMethodKind};
use serde_json::Value;

use crate::hooks::RequireAdmin;
use crate::services::GalleryParams;
use crate::state::GalleryState;

pub fn crud_capabilities() -> ServiceCapabilities {
    ServiceCapabilities::from_methods(vec![
        ServiceMethodKind::Find,
        ServiceMethodKind::Get,
        ServiceMethodKind::Create,
        ServiceMethodKind::Update,
        ServiceMethodKind::Patch,
        ServiceMethodKind::Remove,
    ])
}

/// Reads are public; writes need the tenant's admin session.
pub fn register_hooks(app: &GalleryApp<Value, GalleryParams>, state: &GalleryState) -> anyhow::Result<()> {
    app.service(crate::services::ARTWORKS)?.hooks(|h| {
        h.before_writes(Arc::new(RequireAdmin {
            tokens: Arc::clone(&state.tokens),
        }));
    });
    Ok(())
}
