pub mod settings_schema;
pub mod settings_service;

pub use settings_service::SettingsService;
