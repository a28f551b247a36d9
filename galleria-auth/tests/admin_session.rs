use galleria_auth::{AdminSession, AuthError, AuthOptions, TokenIssuer};
use galleria_core::errors::{ErrorKind, GalleryError};
use galleria_core::TenantContext;
use http::header::AUTHORIZATION;
use http::HeaderMap;

fn issuer() -> TokenIssuer {
    TokenIssuer::new(AuthOptions::default().with_secret("test-secret")).unwrap()
}

fn bearer(token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, format!("Bearer {token}").parse().unwrap());
    headers
}

#[test]
fn session_for_own_tenant_is_accepted() {
    let iss = issuer();
    let token = iss.issue("vip-gallery-01").unwrap();

    let session = AdminSession::from_headers(&iss, &bearer(&token), &TenantContext::new("vip-gallery-01")).unwrap();
    assert_eq!(session.artist_id, "vip-gallery-01");
}

#[test]
fn missing_token_is_not_authenticated() {
    let err = AdminSession::from_headers(&issuer(), &HeaderMap::new(), &TenantContext::new("a")).unwrap_err();
    assert!(matches!(err, AuthError::MissingToken));
    assert_eq!(GalleryError::from(err).kind, ErrorKind::NotAuthenticated);
}

#[test]
fn other_tenants_session_is_forbidden() {
    let iss = issuer();
    let token = iss.issue("vip-gallery-01").unwrap();

    let err = AdminSession::from_headers(&iss, &bearer(&token), &TenantContext::new("-vqsk")).unwrap_err();
    assert!(matches!(err, AuthError::WrongTenant { .. }));
    assert_eq!(GalleryError::from(err).code(), 403);
}

#[test]
fn garbage_token_is_not_authenticated() {
    let err = AdminSession::require(&issuer(), Some("Bearer nope"), &TenantContext::new("a")).unwrap_err();
    assert_eq!(GalleryError::from(err).code(), 401);
}
