//! galleria-core: framework-agnostic core for Galleria.
//!
//! Every operation runs against a [`TenantContext`] produced by the
//! [`TenantResolver`]; services never pick a tenant on their own.

pub mod app;
pub mod config;
pub mod errors;
pub mod hooks;
pub mod service;
pub mod tenant;

pub use app::{GalleryApp, ServiceCaller, ServiceHandle};
pub use config::{GalleryConfig, GalleryConfigSnapshot};
pub use errors::{ErrorKind, GalleryError};
pub use hooks::{AfterHook, BeforeHook, ErrorHook, HookContext, HookResult, ServiceHooks};
pub use service::{ServiceCapabilities, ServiceMethodKind, TenantService};
pub use tenant::{Resolution, ResolutionSource, TenantContext, TenantId, TenantResolver, DEFAULT_TENANT};
