use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, OriginalUri, Path, Query, State},
    http::{HeaderMap, Method},
    routing, Json, Router,
};
use galleria_core::errors::GalleryError;
use galleria_core::{GalleryApp, ServiceHandle, ServiceMethodKind};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;

use crate::{
    params::{FromRestParams, RestParams},
    tenant::Tenant,
    GalleryAxumError,
};

type QueryMap = Query<HashMap<String, String>>;

/// Router state for one mounted service.
pub struct ServiceRoute<R, P>
where
    R: Send + Sync + 'static,
    P: Send + Sync + Clone + 'static,
{
    pub app: Arc<GalleryApp<R, P>>,
    pub name: Arc<String>,
}

impl<R, P> Clone for ServiceRoute<R, P>
where
    R: Send + Sync + 'static,
    P: Send + Sync + Clone + 'static,
{
    fn clone(&self) -> Self {
        Self {
            app: Arc::clone(&self.app),
            name: Arc::clone(&self.name),
        }
    }
}

impl<R, P> ServiceRoute<R, P>
where
    R: Send + Sync + 'static,
    P: Send + Sync + Clone + 'static,
{
    /// The service handle, if it exposes `method` over HTTP.
    fn handle(&self, method: ServiceMethodKind) -> Result<ServiceHandle<R, P>, GalleryAxumError> {
        let svc = self.app.service(&self.name)?;
        if !svc.inner().capabilities().allows(&method) {
            return Err(GalleryError::method_not_allowed(format!(
                "Method {} is not allowed on {}",
                method.as_str(),
                self.name
            ))
            .into());
        }
        Ok(svc)
    }
}

pub fn map_json_rejection(rejection: JsonRejection) -> GalleryAxumError {
    GalleryError::bad_request("Failed to parse the request body as JSON")
        .with_errors(json!({"_schema": [rejection.body_text()]}))
        .into()
}

fn params<P: FromRestParams>(headers: &HeaderMap, query: HashMap<String, String>, method: Method, uri: &OriginalUri) -> P {
    P::from_rest_params(RestParams::from_parts("rest", headers, query, method.as_str(), &uri.0))
}

async fn find<R, P>(
    State(route): State<ServiceRoute<R, P>>,
    Tenant(tenant): Tenant,
    headers: HeaderMap,
    Query(query): QueryMap,
    uri: OriginalUri,
) -> Result<Json<Vec<R>>, GalleryAxumError>
where
    R: Serialize + DeserializeOwned + Send + Sync + 'static,
    P: FromRestParams + Send + Sync + Clone + 'static,
{
    let svc = route.handle(ServiceMethodKind::Find)?;
    let res = svc.find(tenant, params(&headers, query, Method::GET, &uri)).await?;
    Ok(Json(res))
}

async fn get<R, P>(
    State(route): State<ServiceRoute<R, P>>,
    Tenant(tenant): Tenant,
    headers: HeaderMap,
    Query(query): QueryMap,
    uri: OriginalUri,
    Path(id): Path<String>,
) -> Result<Json<R>, GalleryAxumError>
where
    R: Serialize + DeserializeOwned + Send + Sync + 'static,
    P: FromRestParams + Send + Sync + Clone + 'static,
{
    let svc = route.handle(ServiceMethodKind::Get)?;
    let res = svc.get(tenant, &id, params(&headers, query, Method::GET, &uri)).await?;
    Ok(Json(res))
}

async fn create<R, P>(
    State(route): State<ServiceRoute<R, P>>,
    Tenant(tenant): Tenant,
    headers: HeaderMap,
    Query(query): QueryMap,
    uri: OriginalUri,
    data: Result<Json<R>, JsonRejection>,
) -> Result<Json<R>, GalleryAxumError>
where
    R: Serialize + DeserializeOwned + Send + Sync + 'static,
    P: FromRestParams + Send + Sync + Clone + 'static,
{
    let Json(data) = data.map_err(map_json_rejection)?;
    let svc = route.handle(ServiceMethodKind::Create)?;
    let res = svc.create(tenant, data, params(&headers, query, Method::POST, &uri)).await?;
    Ok(Json(res))
}

async fn update<R, P>(
    State(route): State<ServiceRoute<R, P>>,
    Tenant(tenant): Tenant,
    headers: HeaderMap,
    Query(query): QueryMap,
    uri: OriginalUri,
    Path(id): Path<String>,
    data: Result<Json<R>, JsonRejection>,
) -> Result<Json<R>, GalleryAxumError>
where
    R: Serialize + DeserializeOwned + Send + Sync + 'static,
    P: FromRestParams + Send + Sync + Clone + 'static,
{
    let Json(data) = data.map_err(map_json_rejection)?;
    let svc = route.handle(ServiceMethodKind::Update)?;
    let res = svc.update(tenant, &id, data, params(&headers, query, Method::PUT, &uri)).await?;
    Ok(Json(res))
}

async fn patch<R, P>(
    State(route): State<ServiceRoute<R, P>>,
    Tenant(tenant): Tenant,
    headers: HeaderMap,
    Query(query): QueryMap,
    uri: OriginalUri,
    Path(id): Path<String>,
    data: Result<Json<R>, JsonRejection>,
) -> Result<Json<R>, GalleryAxumError>
where
    R: Serialize + DeserializeOwned + Send + Sync + 'static,
    P: FromRestParams + Send + Sync + Clone + 'static,
{
    let Json(data) = data.map_err(map_json_rejection)?;
    let svc = route.handle(ServiceMethodKind::Patch)?;
    let res = svc
        .patch(tenant, Some(&id), data, params(&headers, query, Method::PATCH, &uri))
        .await?;
    Ok(Json(res))
}

async fn remove<R, P>(
    State(route): State<ServiceRoute<R, P>>,
    Tenant(tenant): Tenant,
    headers: HeaderMap,
    Query(query): QueryMap,
    uri: OriginalUri,
    Path(id): Path<String>,
) -> Result<Json<R>, GalleryAxumError>
where
    R: Serialize + DeserializeOwned + Send + Sync + 'static,
    P: FromRestParams + Send + Sync + Clone + 'static,
{
    let svc = route.handle(ServiceMethodKind::Remove)?;
    let res = svc
        .remove(tenant, Some(&id), params(&headers, query, Method::DELETE, &uri))
        .await?;
    Ok(Json(res))
}

/// `GET|POST /` and `GET|PUT|PATCH|DELETE /{id}` for one service.
///
/// Methods the service does not list in its capabilities answer 405.
pub fn service_router<R, P>(service_name: Arc<String>, app: Arc<GalleryApp<R, P>>) -> Router<()>
where
    R: Serialize + DeserializeOwned + Send + Sync + 'static,
    P: FromRestParams + Send + Sync + Clone + 'static,
{
    let state = ServiceRoute {
        app,
        name: service_name,
    };

    Router::new()
        .route("/", routing::get(find::<R, P>).post(create::<R, P>))
        .route(
            "/{id}",
            routing::get(get::<R, P>)
                .put(update::<R, P>)
                .patch(patch::<R, P>)
                .delete(remove::<R, P>),
        )
        .with_state(state)
}
