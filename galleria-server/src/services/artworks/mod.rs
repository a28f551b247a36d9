pub mod artworks_schema;
pub mod artworks_service;
pub mod artworks_shared;

pub use artworks_service::ArtworksService;
