//! Gallery services and their hooks.
//!
//! Every service is `TenantService<Value, GalleryParams>`; REST-shaped ones
//! are mounted by the axum adapter, the rest are reached from `routes`.

use std::sync::Arc;

use galleria_core::{GalleryApp, ServiceMethodKind};
use serde_json::Value;

use crate::hooks::RequireAdmin;
use crate::state::GalleryState;

pub mod adapters;
pub mod artists;
pub mod artworks;
pub mod auth;
pub mod encouragements;
pub mod payments;
pub mod settings;
pub mod verifications;
pub mod visits;

pub type GalleryParams = galleria_axum::RestParams;

pub const SETTINGS: &str = "settings";
pub const ARTWORKS: &str = "artworks";
pub const ARTISTS: &str = "artists";
pub const AUTH: &str = "auth";
pub const PASSWORDS: &str = "passwords";
pub const PAYMENTS: &str = "payments";
pub const SMS: &str = "sms";
pub const ENCOURAGEMENTS: &str = "encouragements";
pub const VISITS: &str = "visits";

/// Register the services that are not mounted as REST resources, plus
/// hooks for all of them. REST resources are registered by
/// `AxumApp::use_service` before this runs.
pub fn configure(app: &GalleryApp<Value, GalleryParams>, state: Arc<GalleryState>) -> anyhow::Result<()> {
    app.register_service(
        SETTINGS,
        Arc::new(settings::SettingsService {
            store: Arc::clone(&state.store),
        }),
    );
    app.register_service(AUTH, Arc::new(auth::AuthService { state: Arc::clone(&state) }));
    app.register_service(PASSWORDS, Arc::new(auth::PasswordsService { state: Arc::clone(&state) }));
    app.register_service(PAYMENTS, Arc::new(payments::PaymentsService));
    app.register_service(SMS, Arc::new(verifications::VerificationsService { state: Arc::clone(&state) }));

    crate::hooks::global_hooks(app);

    let admin = Arc::new(RequireAdmin {
        tokens: Arc::clone(&state.tokens),
    });
    app.service(SETTINGS)?.hooks(|h| {
        h.before(ServiceMethodKind::Patch, admin.clone());
    });
    app.service(PASSWORDS)?.hooks(|h| {
        h.before(ServiceMethodKind::Patch, admin);
    });

    artworks::artworks_shared::register_hooks(app, &state)?;
    artists::artists_shared::register_hooks(app, &state)?;
    payments::payments_shared::register_hooks(app, &state)?;
    encouragements::encouragements_shared::register_hooks(app, &state)?;
    visits::visits_service::register_hooks(app, &state)?;
    Ok(())
}
