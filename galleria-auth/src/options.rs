// Authentication options.

use std::time::Duration;

use galleria_core::GalleryConfigSnapshot;
use humantime_serde::re::humantime;
use serde::{Deserialize, Serialize};

use crate::AuthError;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthOptions {
    /// HMAC secret for HS256 tokens.
    pub secret: Option<String>,
    /// `iss` claim.
    pub issuer: String,
    /// `aud` claim.
    pub audience: String,
    /// Admin session lifetime, e.g. `"12h"`.
    #[serde(with = "humantime_serde")]
    pub access_token_expires_in: Duration,
    pub bcrypt_cost: u32,
    pub min_password_len: usize,
}

impl Default for AuthOptions {
    fn default() -> Self {
        Self {
            secret: None,
            issuer: "galleria".to_string(),
            audience: "galleria-admin".to_string(),
            access_token_expires_in: Duration::from_secs(12 * 3600),
            bcrypt_cost: bcrypt::DEFAULT_COST,
            min_password_len: 6,
        }
    }
}

impl AuthOptions {
    /// Read `auth.secret`, `auth.expires` (humantime) and `auth.bcrypt_cost`.
    pub fn from_config(config: &GalleryConfigSnapshot) -> Result<Self, AuthError> {
        let mut out = Self {
            secret: config.get_string("auth.secret"),
            ..Self::default()
        };

        if let Some(raw) = config.get("auth.expires") {
            out.access_token_expires_in = humantime::parse_duration(raw)
                .map_err(|e| AuthError::Config(format!("auth.expires: {e}")))?;
        }

        if let Some(raw) = config.get("auth.bcrypt_cost") {
            out.bcrypt_cost = raw
                .parse()
                .map_err(|_| AuthError::Config(format!("auth.bcrypt_cost: not a number: {raw}")))?;
        }

        out.validate()?;
        Ok(out)
    }

    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    pub fn validate(&self) -> Result<(), AuthError> {
        if self.access_token_expires_in.as_secs() == 0 {
            return Err(AuthError::Config("access token expiration must be greater than 0".into()));
        }
        if !(4..=31).contains(&self.bcrypt_cost) {
            return Err(AuthError::Config(format!(
                "bcrypt cost must be within 4..=31, got {}",
                self.bcrypt_cost
            )));
        }
        if self.secret.as_deref().is_some_and(|s| s.trim().is_empty()) {
            return Err(AuthError::MissingSecret);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use galleria_core::GalleryConfig;

    #[test]
    fn reads_humantime_expiry_and_cost() {
        let mut cfg = GalleryConfig::new();
        cfg.set("auth.secret", "s3cret");
        cfg.set("auth.expires", "2h 30m");
        cfg.set("auth.bcrypt_cost", "5");

        let opts = AuthOptions::from_config(&cfg.snapshot()).unwrap();
        assert_eq!(opts.secret.as_deref(), Some("s3cret"));
        assert_eq!(opts.access_token_expires_in, Duration::from_secs(9000));
        assert_eq!(opts.bcrypt_cost, 5);
    }

    #[test]
    fn rejects_bad_values() {
        let mut cfg = GalleryConfig::new();
        cfg.set("auth.expires", "soon");
        assert!(matches!(
            AuthOptions::from_config(&cfg.snapshot()),
            Err(AuthError::Config(_))
        ));

        let mut cfg = GalleryConfig::new();
        cfg.set("auth.bcrypt_cost", "40");
        assert!(AuthOptions::from_config(&cfg.snapshot()).is_err());
    }

    #[test]
    fn serializes_durations_as_humantime() {
        let opts = AuthOptions::default();
        let v = serde_json::to_value(&opts).unwrap();
        assert_eq!(v["access_token_expires_in"], "12h");
    }
}
