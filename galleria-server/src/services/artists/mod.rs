pub mod artists_hooks;
pub mod artists_schema;
pub mod artists_service;
pub mod artists_shared;

pub use artists_service::ArtistsService;
