//! galleria-axum: Axum adapter for Galleria.
//!
//! Builds an axum `Router` from a [`galleria_core::GalleryApp`], resolves
//! the tenant of every request from its host and mounts services as REST
//! resources.

pub mod app;
pub mod params;
pub mod rest;
pub mod state;
pub mod tenant;
mod error;

pub use app::{axum, AxumApp};
pub use error::GalleryAxumError;
pub use params::{FromRestParams, RestParams};
pub use state::GalleryAxumState;
pub use tenant::{Tenant, ARTIST_ID_HEADER, OVERRIDE_QUERY_PARAM};
