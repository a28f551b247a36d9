use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Query, Request, State},
    http::{header::HOST, request::Parts, HeaderValue},
    middleware::Next,
    response::Response,
};
use galleria_core::{errors::GalleryError, TenantContext, TenantResolver};

use crate::GalleryAxumError;

/// Header carrying the resolved tenant, set on requests and echoed on responses.
pub const ARTIST_ID_HEADER: &str = "x-artist-id";

/// Query parameter that overrides host based resolution.
pub const OVERRIDE_QUERY_PARAM: &str = "vipId";

fn request_host(req: &Request) -> Option<String> {
    req.headers()
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| req.uri().authority().map(|a| a.to_string()))
}

fn override_id(req: &Request) -> Option<String> {
    let Query(query) = Query::<HashMap<String, String>>::try_from_uri(req.uri()).ok()?;
    query.get(OVERRIDE_QUERY_PARAM).cloned()
}

/// Resolve the tenant once per request.
///
/// Any client supplied `x-artist-id` is overwritten with the resolved id,
/// so handlers only ever see a tenant this server decided on.
pub async fn resolve_tenant(
    State(resolver): State<Arc<TenantResolver>>,
    mut req: Request,
    next: Next,
) -> Response {
    let host = request_host(&req);
    let over = override_id(&req);
    let tenant = resolver.resolve_context(host.as_deref(), over.as_deref());

    let header = HeaderValue::from_str(tenant.id()).ok();
    match &header {
        Some(value) => {
            req.headers_mut().insert(ARTIST_ID_HEADER, value.clone());
        }
        None => {
            req.headers_mut().remove(ARTIST_ID_HEADER);
        }
    }
    req.extensions_mut().insert(tenant);

    let mut res = next.run(req).await;
    if let Some(value) = header {
        res.headers_mut().insert(ARTIST_ID_HEADER, value);
    }
    res
}

/// Extractor for the tenant resolved by [`resolve_tenant`].
#[derive(Debug, Clone)]
pub struct Tenant(pub TenantContext);

impl<S> FromRequestParts<S> for Tenant
where
    S: Send + Sync,
{
    type Rejection = GalleryAxumError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<TenantContext>()
            .cloned()
            .map(Tenant)
            .ok_or_else(|| GalleryError::general_error("Tenant was not resolved for this request").into())
    }
}
