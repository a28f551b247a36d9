// HS256 session tokens.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AuthError, AuthOptions};

/// Claims of an admin session token. `sub` is the tenant id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub sub: String,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

#[derive(Clone, Debug)]
pub struct TokenIssuer {
    options: AuthOptions,
    secret: String,
}

impl TokenIssuer {
    pub fn new(options: AuthOptions) -> Result<Self, AuthError> {
        options.validate()?;
        let secret = options
            .secret
            .clone()
            .filter(|s| !s.trim().is_empty())
            .ok_or(AuthError::MissingSecret)?;
        Ok(Self { options, secret })
    }

    pub fn options(&self) -> &AuthOptions {
        &self.options
    }

    #[cfg_attr(not(any(feature = "jwt-aws-lc-rs", feature = "jwt-rust-crypto")), allow(dead_code))]
    fn claims_for(&self, artist_id: &str) -> Claims {
        let iat = Utc::now().timestamp();
        let ttl = i64::try_from(self.options.access_token_expires_in.as_secs()).unwrap_or(i64::MAX);
        Claims {
            sub: artist_id.to_string(),
            iss: self.options.issuer.clone(),
            aud: self.options.audience.clone(),
            iat,
            exp: iat.saturating_add(ttl),
            jti: Uuid::new_v4().to_string(),
        }
    }
}

#[cfg(any(feature = "jwt-aws-lc-rs", feature = "jwt-rust-crypto"))]
impl TokenIssuer {
    /// Sign a session token for `artist_id`.
    pub fn issue(&self, artist_id: &str) -> Result<String, AuthError> {
        use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};

        let claims = self.claims_for(artist_id);
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }

    /// Check signature, issuer, audience and expiry.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.options.issuer.as_str()]);
        validation.set_audience(&[self.options.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "sub", "iss", "aud"]);

        decode::<Claims>(token, &DecodingKey::from_secret(self.secret.as_bytes()), &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::InvalidToken("token expired".into()),
                _ => AuthError::InvalidToken(e.to_string()),
            })
    }
}

#[cfg(not(any(feature = "jwt-aws-lc-rs", feature = "jwt-rust-crypto")))]
impl TokenIssuer {
    pub fn issue(&self, _artist_id: &str) -> Result<String, AuthError> {
        Err(AuthError::Config(
            "JWT support is disabled (enable one of: jwt-aws-lc-rs, jwt-rust-crypto)".into(),
        ))
    }

    pub fn verify(&self, _token: &str) -> Result<Claims, AuthError> {
        Err(AuthError::Config(
            "JWT support is disabled (enable one of: jwt-aws-lc-rs, jwt-rust-crypto)".into(),
        ))
    }
}

#[cfg(all(test, any(feature = "jwt-aws-lc-rs", feature = "jwt-rust-crypto")))]
mod tests {
    use std::time::Duration;

    use super::*;

    fn issuer(secret: &str) -> TokenIssuer {
        TokenIssuer::new(AuthOptions::default().with_secret(secret)).unwrap()
    }

    #[test]
    fn issued_token_verifies_with_tenant_subject() {
        let iss = issuer("s3cret");
        let token = iss.issue("gallery-vip-01").unwrap();
        let claims = iss.verify(&token).unwrap();
        assert_eq!(claims.sub, "gallery-vip-01");
        assert_eq!(claims.iss, "galleria");
        assert_eq!(claims.exp - claims.iat, 12 * 3600);
    }

    #[test]
    fn other_secret_is_rejected() {
        let token = issuer("one").issue("a").unwrap();
        assert!(matches!(issuer("two").verify(&token), Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn expired_token_is_rejected() {
        let iss = issuer("s3cret");
        let mut claims = iss.claims_for("a");
        claims.iat -= 7200;
        claims.exp = claims.iat + 60;
        let token = jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            &claims,
            &jsonwebtoken::EncodingKey::from_secret(b"s3cret"),
        )
        .unwrap();

        let err = iss.verify(&token).unwrap_err();
        assert_eq!(err.to_string(), "Invalid access token: token expired");
    }

    #[test]
    fn missing_secret_is_an_error() {
        assert!(matches!(TokenIssuer::new(AuthOptions::default()), Err(AuthError::MissingSecret)));
        let opts = AuthOptions {
            access_token_expires_in: Duration::ZERO,
            ..AuthOptions::default().with_secret("x")
        };
        assert!(matches!(TokenIssuer::new(opts), Err(AuthError::Config(_))));
    }
}
