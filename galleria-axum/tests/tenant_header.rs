use axum::body::Body;
use axum::http::Request;
use axum::routing::get;
use axum::{Json, Router};
use galleria_axum::{axum, Tenant, ARTIST_ID_HEADER};
use galleria_core::{GalleryApp, TenantResolver};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

async fn whoami(Tenant(tenant): Tenant) -> Json<Value> {
    Json(json!({ "artistId": tenant.id(), "source": tenant.source.as_str() }))
}

async fn echo_header(headers: axum::http::HeaderMap) -> String {
    headers
        .get(ARTIST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

fn router() -> Router {
    let app: GalleryApp<Value, ()> = GalleryApp::new();
    let resolver = TenantResolver::builtin(None).with_host("gallery.example", "artist-7");
    axum(app, resolver)
        .merge(Router::new().route("/whoami", get(whoami)).route("/echo", get(echo_header)))
        .into_router()
}

async fn call(req: Request<Body>) -> (Option<String>, Vec<u8>) {
    let res = router().oneshot(req).await.unwrap();
    let header = res
        .headers()
        .get(ARTIST_ID_HEADER)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = res.into_body().collect().await.unwrap().to_bytes().to_vec();
    (header, bytes)
}

#[tokio::test]
async fn host_selects_tenant_and_response_echoes_it() {
    let req = Request::builder()
        .uri("/whoami")
        .header("host", "gallery.example")
        .body(Body::empty())
        .unwrap();

    let (header, body) = call(req).await;
    let body: Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(header.as_deref(), Some("artist-7"));
    assert_eq!(body["artistId"], "artist-7");
    assert_eq!(body["source"], "exactHost");
}

#[tokio::test]
async fn query_override_wins_over_host() {
    let req = Request::builder()
        .uri("/whoami?vipId=gallery-vip-03")
        .header("host", "gallery.example")
        .body(Body::empty())
        .unwrap();

    let (header, body) = call(req).await;
    let body: Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(header.as_deref(), Some("gallery-vip-03"));
    assert_eq!(body["source"], "override");
}

#[tokio::test]
async fn client_supplied_artist_header_is_overwritten() {
    let req = Request::builder()
        .uri("/echo")
        .header("host", "unknown.example")
        .header(ARTIST_ID_HEADER, "someone-else")
        .body(Body::empty())
        .unwrap();

    let (header, body) = call(req).await;

    assert_eq!(header.as_deref(), Some("-vqsk"));
    assert_eq!(String::from_utf8(body).unwrap(), "-vqsk");
}
