//! Multi-tenant online gallery backend.
//!
//! [`build`] wires configuration, the record store, the SMS sender and all
//! services into an [`AxumApp`]; `main` only adds logging and listens.

pub mod app;
pub mod config;
pub mod hooks;
pub mod routes;
pub mod services;
pub mod sms;
pub mod state;
pub mod store;
pub mod utils;

use std::sync::Arc;

use anyhow::Result;
use galleria_axum::AxumApp;
use galleria_core::GalleryConfig;
use serde_json::Value;

use crate::services::GalleryParams;
use crate::sms::SmsSender;
use crate::state::GalleryState;
use crate::store::RecordStore;

/// App from `.env` and `GALLERIA__*` variables.
pub fn build() -> Result<AxumApp<Value, GalleryParams>> {
    build_with_config(config::load())
}

/// Store and SMS sender chosen by `config`.
pub fn build_with_config(config: GalleryConfig) -> Result<AxumApp<Value, GalleryParams>> {
    let snapshot = config.snapshot();
    let store = store::from_config(&snapshot)?;
    let sms = sms::from_config(&snapshot)?;
    build_with(config, store, sms)
}

pub fn build_with(
    config: GalleryConfig,
    store: Arc<dyn RecordStore>,
    sms: Arc<dyn SmsSender>,
) -> Result<AxumApp<Value, GalleryParams>> {
    let ax = app::gallery_app(&config);
    let state = Arc::new(GalleryState::new(&ax.app.config_snapshot(), store, sms)?);

    let ax = ax
        .use_service("/artworks", Arc::new(services::artworks::ArtworksService::new(Arc::clone(&state.store))))
        .use_service("/artists", Arc::new(services::artists::ArtistsService { state: Arc::clone(&state) }))
        .use_service(
            "/encouragements",
            Arc::new(services::encouragements::EncouragementsService::new(Arc::clone(&state.store))),
        )
        .use_service(
            "/visits",
            Arc::new(services::visits::VisitsService {
                store: Arc::clone(&state.store),
            }),
        );

    services::configure(ax.app.as_ref(), state)?;

    let routes = routes::router(ax.state());
    Ok(ax.merge(routes))
}
