use galleria_axum::{axum, AxumApp};
use galleria_core::{GalleryApp, GalleryConfig, TenantResolver};
use serde_json::Value;

use crate::services::GalleryParams;

/// Core app carrying `config`, wrapped for axum with a resolver built
/// from the `tenants.*` keys.
pub fn gallery_app(config: &GalleryConfig) -> AxumApp<Value, GalleryParams> {
    let app: GalleryApp<Value, GalleryParams> = GalleryApp::new();
    app.configure(config);

    let resolver = TenantResolver::from_config(&app.config_snapshot());
    tracing::debug!(default_tenant = resolver.default_tenant(), "tenant resolver ready");

    axum(app, resolver)
}
