//! Admin authentication for Galleria.
//!
//! Each tenant has one admin password. A successful login yields a JWT
//! whose `sub` is the tenant id; [`AdminSession::require`] accepts that
//! token only on requests resolved to the same tenant.

pub mod error;
pub mod options;
pub mod password;
pub mod session;
pub mod token;

pub use error::AuthError;
pub use options::AuthOptions;
pub use password::{generate_password, hash_password, verify_password};
pub use session::{extract_bearer_token, parse_bearer, AdminSession};
pub use token::{Claims, TokenIssuer};
