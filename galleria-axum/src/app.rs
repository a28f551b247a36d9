use std::sync::Arc;

use axum::{middleware, Router};
use galleria_core::{GalleryApp, TenantResolver, TenantService};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::net::{TcpListener, ToSocketAddrs};
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::params::FromRestParams;
use crate::rest;
use crate::tenant::resolve_tenant;
use crate::GalleryAxumState;

/// An axum router under construction, bound to a [`GalleryApp`].
pub struct AxumApp<R, P = ()>
where
    R: Send + Sync + 'static,
    P: Send + Sync + Clone + 'static,
{
    pub app: Arc<GalleryApp<R, P>>,
    pub resolver: Arc<TenantResolver>,
    pub router: Router<()>,
}

impl<R, P> Clone for AxumApp<R, P>
where
    R: Send + Sync + 'static,
    P: Send + Sync + Clone + 'static,
{
    fn clone(&self) -> Self {
        Self {
            app: Arc::clone(&self.app),
            resolver: Arc::clone(&self.resolver),
            router: self.router.clone(),
        }
    }
}

impl<R, P> AxumApp<R, P>
where
    R: Send + Sync + 'static,
    P: Send + Sync + Clone + 'static,
{
    pub fn new(app: GalleryApp<R, P>, resolver: TenantResolver) -> Self {
        Self {
            app: Arc::new(app),
            resolver: Arc::new(resolver),
            router: Router::new(),
        }
    }

    /// State for hand written routes that need the app or the resolver.
    pub fn state(&self) -> GalleryAxumState<R, P> {
        GalleryAxumState {
            app: Arc::clone(&self.app),
            resolver: Arc::clone(&self.resolver),
        }
    }

    /// Add routes at their own paths.
    pub fn merge(mut self, router: Router<()>) -> Self {
        self.router = self.router.merge(router);
        self
    }

    /// Register `service` under `path` (without the leading slash) and
    /// mount its REST routes.
    pub fn use_service(mut self, path: &'static str, service: Arc<dyn TenantService<R, P>>) -> Self
    where
        R: Serialize + DeserializeOwned,
        P: FromRestParams,
    {
        let name = path.trim_start_matches('/');
        self.app.register_service(name, service);

        let router = rest::service_router(Arc::new(name.to_string()), Arc::clone(&self.app));
        self.router = self.router.nest(path, router);
        self
    }

    /// Final router: tenant resolution inside request-id and tracing layers.
    pub fn into_router(self) -> Router {
        let tenant = middleware::from_fn_with_state(Arc::clone(&self.resolver), resolve_tenant);

        self.router.layer(tenant).layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
    }

    pub async fn listen<A>(self, addr: A) -> anyhow::Result<()>
    where
        A: ToSocketAddrs,
    {
        let listener = TcpListener::bind(addr).await?;
        tracing::info!(addr = %listener.local_addr()?, "listening");
        axum::serve(listener, self.into_router()).await?;
        Ok(())
    }
}

pub fn axum<R, P>(app: GalleryApp<R, P>, resolver: TenantResolver) -> AxumApp<R, P>
where
    R: Send + Sync + 'static,
    P: Send + Sync + Clone + 'static,
{
    AxumApp::new(app, resolver)
}
