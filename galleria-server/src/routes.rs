//! Routes that are not plain REST resources.

use std::collections::HashMap;

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequestParts, Path, Query, State};
use axum::http::request::Parts;
use axum::routing::{get, post};
use axum::{Json, Router};
use galleria_axum::rest::map_json_rejection;
use galleria_axum::{GalleryAxumError, GalleryAxumState, Tenant};
use galleria_core::errors::GalleryError;
use galleria_core::TenantContext;
use serde_json::{json, Value};

use crate::services::{self, GalleryParams};

pub type AppState = GalleryAxumState<Value, GalleryParams>;
type JsonBody = Result<Json<Value>, JsonRejection>;
type ApiResult = Result<Json<Value>, GalleryAxumError>;

/// The resolved tenant plus REST params, as the mounted services get them.
pub struct Call {
    pub tenant: TenantContext,
    pub params: GalleryParams,
}

impl<S> FromRequestParts<S> for Call
where
    S: Send + Sync,
{
    type Rejection = GalleryAxumError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Tenant(tenant) = Tenant::from_request_parts(parts, state).await?;
        let query = Query::<HashMap<String, String>>::try_from_uri(&parts.uri)
            .map(|Query(q)| q)
            .unwrap_or_default();
        let params = GalleryParams::from_parts("rest", &parts.headers, query, parts.method.as_str(), &parts.uri);
        Ok(Call { tenant, params })
    }
}

fn body(data: JsonBody) -> Result<Value, GalleryAxumError> {
    data.map(|Json(v)| v).map_err(map_json_rejection)
}

async fn read_settings(State(state): State<AppState>, call: Call) -> ApiResult {
    let rows = state.app.service(services::SETTINGS)?.find(call.tenant, call.params).await?;
    let settings = rows
        .into_iter()
        .next()
        .ok_or_else(|| GalleryError::general_error("Settings produced no row"))?;
    Ok(Json(settings))
}

async fn save_settings(State(state): State<AppState>, call: Call, data: JsonBody) -> ApiResult {
    let data = body(data)?;
    let saved = state
        .app
        .service(services::SETTINGS)?
        .patch(call.tenant, None, data, call.params)
        .await?;
    Ok(Json(saved))
}

async fn login(State(state): State<AppState>, call: Call, data: JsonBody) -> ApiResult {
    let data = body(data)?;
    let session = state.app.service(services::AUTH)?.create(call.tenant, data, call.params).await?;
    Ok(Json(session))
}

async fn change_password(State(state): State<AppState>, call: Call, data: JsonBody) -> ApiResult {
    let data = body(data)?;
    let res = state
        .app
        .service(services::PASSWORDS)?
        .patch(call.tenant, None, data, call.params)
        .await?;
    Ok(Json(res))
}

/// Public gallery link -> tenant id.
async fn resolve_link(State(state): State<AppState>, Tenant(tenant): Tenant, Path(link_id): Path<String>) -> ApiResult {
    let mut params = GalleryParams::internal();
    params.query.insert("link_id".into(), link_id.clone());

    let artist = state
        .app
        .service(services::ARTISTS)?
        .find(tenant, params)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| GalleryError::not_found(format!("Gallery link not found: {link_id}")))?;

    Ok(Json(json!({
        "artistId": artist.get("artist_id").cloned().unwrap_or(Value::Null),
        "linkId": link_id,
    })))
}

async fn payment_webhook(State(state): State<AppState>, call: Call, data: JsonBody) -> ApiResult {
    let data = body(data)?;
    let ack = state.app.service(services::PAYMENTS)?.create(call.tenant, data, call.params).await?;
    Ok(Json(ack))
}

async fn send_code(State(state): State<AppState>, call: Call, data: JsonBody) -> ApiResult {
    let data = body(data)?;
    let res = state.app.service(services::SMS)?.create(call.tenant, data, call.params).await?;
    Ok(Json(res))
}

async fn verify_code(State(state): State<AppState>, call: Call, data: JsonBody) -> ApiResult {
    let data = body(data)?;
    let res = state
        .app
        .service(services::SMS)?
        .patch(call.tenant, None, data, call.params)
        .await?;
    Ok(Json(res))
}

async fn current_tenant(Tenant(tenant): Tenant) -> Json<Value> {
    Json(json!({"artistId": tenant.id(), "source": tenant.source.as_str()}))
}

async fn health() -> &'static str {
    "ok"
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/settings", get(read_settings).put(save_settings))
        .route("/auth/login", post(login))
        .route("/auth/password", post(change_password))
        .route("/artists/link/{link_id}", get(resolve_link))
        .route("/payments/webhook", post(payment_webhook))
        .route("/sms/send", post(send_code))
        .route("/sms/verify", post(verify_code))
        .route("/tenant", get(current_tenant))
        .route("/health", get(health))
        .with_state(state)
}
