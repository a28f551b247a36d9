use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use galleria_core::errors::GalleryError;
use galleria_core::{ServiceCapabilities, ServiceMethodKind, TenantContext, TenantService};
use rand::Rng;
use serde::Deserialize;
use serde_json::{json, Value};
use validator::Validate;

use crate::services::GalleryParams;
use crate::sms::SmsMessage;
use crate::state::GalleryState;
use crate::store::{Query, VERIFICATION_CODES};
use crate::utils::time::{expires_after, is_past, now_ts};
use crate::utils::validation::{validate, FieldErrors};

/// Wrong guesses a code survives; the next one drops it.
pub const MAX_ATTEMPTS: u64 = 5;
const CODE_LEN: usize = 6;

#[derive(Debug, Deserialize, Validate)]
struct SendCode {
    phone: String,
}

#[derive(Debug, Deserialize, Validate)]
struct CheckCode {
    phone: String,
    #[validate(length(min = 1, message = "code is required"))]
    code: String,
}

/// Digits and a leading `+`; separators are dropped.
pub fn normalize_phone(raw: &str) -> String {
    let raw = raw.trim();
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if raw.starts_with('+') {
        format!("+{digits}")
    } else {
        digits
    }
}

fn checked_phone(raw: &str) -> Result<String> {
    let phone = normalize_phone(raw);
    let digits = phone.trim_start_matches('+').len();
    let mut errors = FieldErrors::default();
    if !(8..=15).contains(&digits) {
        errors.push("phone", "must have 8-15 digits");
    }
    errors.into_result("Invalid phone number")?;
    Ok(phone)
}

fn new_code() -> String {
    let n: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("{n:0width$}", width = CODE_LEN)
}

fn verified(ok: bool) -> Value {
    json!({"verified": ok})
}

/// One-time SMS codes kept in the record store.
///
/// `create` issues a code for a phone and texts it; `patch` checks a code.
/// A code is consumed by its first correct use, dropped once expired, and
/// dropped after [`MAX_ATTEMPTS`] wrong guesses.
pub struct VerificationsService {
    pub state: Arc<GalleryState>,
}

impl VerificationsService {
    fn by_phone(phone: &str) -> Query {
        Query::new().eq("phone", phone)
    }

    async fn discard(&self, phone: &str) -> Result<()> {
        self.state.store.delete(VERIFICATION_CODES, &Self::by_phone(phone)).await?;
        Ok(())
    }
}

#[async_trait]
impl TenantService<Value, GalleryParams> for VerificationsService {
    fn capabilities(&self) -> ServiceCapabilities {
        ServiceCapabilities::from_methods(vec![ServiceMethodKind::Create, ServiceMethodKind::Patch])
    }

    async fn create(&self, ctx: &TenantContext, data: Value, _params: GalleryParams) -> Result<Value> {
        let input: SendCode = validate(&data, "Invalid verification request")?;
        let phone = checked_phone(&input.phone)?;
        let code = new_code();
        let ttl = self.state.code_ttl;

        self.state
            .store
            .upsert(
                VERIFICATION_CODES,
                json!({
                    "phone": phone,
                    "code": code,
                    "attempts": 0,
                    "expires_at": expires_after(ttl),
                    "created_at": now_ts(),
                }),
                &["phone"],
            )
            .await?;

        let message = SmsMessage {
            to: phone.clone(),
            from: self.state.sms_from.clone(),
            text: format!("[Galleria] Verification code: {code}"),
        };
        if let Err(e) = self.state.sms.send(message).await {
            self.discard(&phone).await?;
            return Err(GalleryError::bad_gateway("Could not send verification code")
                .with_source(e)
                .into_anyhow());
        }

        tracing::info!(tenant = ctx.id(), "verification code sent");
        Ok(json!({"sent": true, "expiresIn": ttl.as_secs()}))
    }

    async fn patch(&self, _ctx: &TenantContext, _id: Option<&str>, data: Value, _params: GalleryParams) -> Result<Value> {
        let input: CheckCode = validate(&data, "Invalid verification request")?;
        let phone = checked_phone(&input.phone)?;

        let Some(row) = self
            .state
            .store
            .select_one(VERIFICATION_CODES, &Self::by_phone(&phone))
            .await?
        else {
            return Ok(verified(false));
        };

        let expires_at = row.get("expires_at").and_then(Value::as_str).unwrap_or_default();
        if is_past(expires_at) {
            tracing::debug!("verification code expired");
            self.discard(&phone).await?;
            return Ok(verified(false));
        }

        if row.get("code").and_then(Value::as_str) == Some(input.code.trim()) {
            self.discard(&phone).await?;
            return Ok(verified(true));
        }

        let attempts = row.get("attempts").and_then(Value::as_u64).unwrap_or(0) + 1;
        if attempts > MAX_ATTEMPTS {
            tracing::info!(attempts, "verification code invalidated");
            self.discard(&phone).await?;
        } else {
            self.state
                .store
                .update(VERIFICATION_CODES, &Self::by_phone(&phone), json!({"attempts": attempts}))
                .await?;
        }
        Ok(verified(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phones_keep_digits_and_plus() {
        assert_eq!(normalize_phone(" +82 10-1234-5678 "), "+821012345678");
        assert_eq!(normalize_phone("010.1234.5678"), "01012345678");
    }

    #[test]
    fn short_phones_are_rejected() {
        assert!(checked_phone("1234").is_err());
        assert!(checked_phone("010-1234-5678").is_ok());
    }

    #[test]
    fn codes_are_six_digits() {
        for _ in 0..50 {
            let code = new_code();
            assert_eq!(code.len(), CODE_LEN);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }
}
