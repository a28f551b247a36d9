use galleria_core::TenantContext;
use http::header::AUTHORIZATION;
use http::HeaderMap;

use crate::{AuthError, Claims, TokenIssuer};

const SCHEMES: [&str; 2] = ["Bearer", "JWT"];

/// Token from an `Authorization` value: `Bearer <token>`, `JWT <token>`
/// or the bare token.
pub fn parse_bearer(value: &str) -> Option<&str> {
    let value = value.trim_start();
    let (head, rest) = match value.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, Some(rest)),
        None => (value, None),
    };

    if SCHEMES.iter().any(|s| s.eq_ignore_ascii_case(head)) {
        return rest.map(str::trim).filter(|t| !t.is_empty());
    }

    match rest.map(str::trim) {
        // `<scheme> <token>` with a scheme we do not accept.
        Some(r) if !r.is_empty() => None,
        _ => Some(head).filter(|t| !t.is_empty()),
    }
}

pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_bearer)
}

/// A verified admin session for the tenant of the current request.
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub artist_id: String,
    pub claims: Claims,
}

impl AdminSession {
    /// 401 without a valid token, 403 when the token belongs to another tenant.
    pub fn require(
        issuer: &TokenIssuer,
        authorization: Option<&str>,
        tenant: &TenantContext,
    ) -> Result<Self, AuthError> {
        let token = authorization.and_then(parse_bearer).ok_or(AuthError::MissingToken)?;
        let claims = issuer.verify(token)?;

        if claims.sub != tenant.id() {
            return Err(AuthError::WrongTenant {
                expected: tenant.id().to_string(),
                actual: claims.sub,
            });
        }

        Ok(Self {
            artist_id: claims.sub.clone(),
            claims,
        })
    }

    pub fn from_headers(issuer: &TokenIssuer, headers: &HeaderMap, tenant: &TenantContext) -> Result<Self, AuthError> {
        let value = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
        Self::require(issuer, value, tenant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_schemes_case_insensitively() {
        assert_eq!(parse_bearer("Bearer abc"), Some("abc"));
        assert_eq!(parse_bearer("bearer  abc "), Some("abc"));
        assert_eq!(parse_bearer("JWT abc"), Some("abc"));
        assert_eq!(parse_bearer("abc"), Some("abc"));
        assert_eq!(parse_bearer("Basic abc"), None);
        assert_eq!(parse_bearer("Bearer "), None);
        assert_eq!(parse_bearer("  "), None);
    }

    #[test]
    fn scheme_without_credential_is_rejected() {
        assert_eq!(parse_bearer("Bearer"), None);
        assert_eq!(parse_bearer("bearer "), None);
        assert_eq!(parse_bearer("JWT\t "), None);
        assert_eq!(parse_bearer(" abc "), Some("abc"));
    }

    #[test]
    fn extracts_from_header_map() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_bearer_token(&headers), None);
        headers.insert(AUTHORIZATION, "Bearer t0k".parse().unwrap());
        assert_eq!(extract_bearer_token(&headers), Some("t0k"));
    }
}
