use anyhow::Result;
use async_trait::async_trait;

use crate::errors::GalleryError;
use crate::tenant::TenantContext;

/// Standard service methods: find, get, create, update, patch, remove.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ServiceMethodKind {
    Find,
    Get,
    Create,
    Update,
    Patch,
    Remove,
    Custom(&'static str),
}

impl ServiceMethodKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceMethodKind::Find => "find",
            ServiceMethodKind::Get => "get",
            ServiceMethodKind::Create => "create",
            ServiceMethodKind::Update => "update",
            ServiceMethodKind::Patch => "patch",
            ServiceMethodKind::Remove => "remove",
            ServiceMethodKind::Custom(name) => *name,
        }
    }
}

/// Which methods a service exposes over a transport.
///
/// The HTTP adapter only mounts routes for allowed methods.
#[derive(Debug, Clone)]
pub struct ServiceCapabilities {
    pub allowed_methods: Vec<ServiceMethodKind>,
}

impl ServiceCapabilities {
    pub fn standard_crud() -> Self {
        use ServiceMethodKind::*;
        Self {
            allowed_methods: vec![Find, Get, Create, Update, Patch, Remove],
        }
    }

    pub fn from_methods(methods: Vec<ServiceMethodKind>) -> Self {
        Self {
            allowed_methods: methods,
        }
    }

    pub fn allows(&self, method: &ServiceMethodKind) -> bool {
        self.allowed_methods.contains(method)
    }
}

fn not_allowed(method: &str) -> anyhow::Error {
    GalleryError::method_not_allowed(format!("Method not allowed: {method}")).into_anyhow()
}

/// A tenant-scoped service.
///
/// Every method receives the caller's [`TenantContext`]; implementations
/// must filter reads and stamp writes with `ctx.tenant_id` and nothing
/// else. Unimplemented methods answer `MethodNotAllowed`.
#[async_trait]
pub trait TenantService<R, P = ()>: Send + Sync
where
    R: Send + 'static,
    P: Send + 'static,
{
    fn capabilities(&self) -> ServiceCapabilities {
        ServiceCapabilities::standard_crud()
    }

    async fn find(&self, _ctx: &TenantContext, _params: P) -> Result<Vec<R>> {
        Err(not_allowed("find"))
    }

    async fn get(&self, _ctx: &TenantContext, _id: &str, _params: P) -> Result<R> {
        Err(not_allowed("get"))
    }

    async fn create(&self, _ctx: &TenantContext, _data: R, _params: P) -> Result<R> {
        Err(not_allowed("create"))
    }

    /// Full replace.
    async fn update(&self, _ctx: &TenantContext, _id: &str, _data: R, _params: P) -> Result<R> {
        Err(not_allowed("update"))
    }

    /// Partial update. `id` may be `None` for singleton resources
    /// such as the tenant's settings row.
    async fn patch(&self, _ctx: &TenantContext, _id: Option<&str>, _data: R, _params: P) -> Result<R> {
        Err(not_allowed("patch"))
    }

    async fn remove(&self, _ctx: &TenantContext, _id: Option<&str>, _params: P) -> Result<R> {
        Err(not_allowed("remove"))
    }
}
