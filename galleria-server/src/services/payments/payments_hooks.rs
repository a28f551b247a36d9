use anyhow::Result;
use async_trait::async_trait;
use galleria_core::errors::GalleryError;
use galleria_core::{AfterHook, BeforeHook, HookContext, HookResult};
use serde_json::{json, Map, Value};

use crate::services::GalleryParams;

pub const WEBHOOK_SECRET_HEADER: &str = "x-webhook-secret";
const FALLBACK_NAME: &str = "Galleria artist";

/// Checks `x-webhook-secret` when `payments.secret` is configured.
pub struct VerifyWebhookSecret {
    pub secret: Option<String>,
}

#[async_trait]
impl BeforeHook<Value, GalleryParams> for VerifyWebhookSecret {
    async fn run(&self, ctx: &mut HookContext<Value, GalleryParams>) -> Result<()> {
        let Some(expected) = self.secret.as_deref() else {
            return Ok(());
        };
        if !ctx.params.is_external() {
            return Ok(());
        }
        match ctx.params.header(WEBHOOK_SECRET_HEADER) {
            Some(given) if given == expected => Ok(()),
            _ => Err(GalleryError::not_authenticated("Invalid webhook secret").into_anyhow()),
        }
    }
}

/// Turns a paid event into a VIP artist, once per transaction id.
///
/// The acknowledgement loses the customer echo and gains `provisioned`,
/// `duplicate`, `artistId` and `linkId`. The initial password only
/// travels by SMS.
pub struct ProvisionFromPayment;

fn take(ack: &mut Map<String, Value>, key: &str) -> Value {
    ack.remove(key).unwrap_or(Value::Null)
}

fn unprovisioned(ctx: &mut HookContext<Value, GalleryParams>, mut ack: Map<String, Value>, reason: Option<&str>) {
    ack.insert("provisioned".into(), Value::Bool(false));
    if let Some(reason) = reason {
        ack.insert("reason".into(), Value::String(reason.into()));
    }
    ctx.result = Some(HookResult::One(Value::Object(ack)));
}

#[async_trait]
impl AfterHook<Value, GalleryParams> for ProvisionFromPayment {
    async fn run(&self, ctx: &mut HookContext<Value, GalleryParams>) -> Result<()> {
        let mut ack = match ctx.result.take() {
            Some(HookResult::One(Value::Object(map))) => map,
            other => {
                ctx.result = other;
                return Ok(());
            }
        };

        let customer = take(&mut ack, "customer");
        let amount = take(&mut ack, "amount");
        let paid = ack.get("paid").and_then(Value::as_bool).unwrap_or(false);
        let transaction_id = ack
            .get("transactionId")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        if !paid {
            tracing::info!(transaction_id = %transaction_id, "unpaid event acknowledged");
            unprovisioned(ctx, ack, None);
            return Ok(());
        }

        let artists = ctx.services.service(crate::services::ARTISTS)?;
        let mut lookup = GalleryParams::internal();
        lookup.query.insert("transaction_id".into(), transaction_id.clone());
        let existing = artists.find(ctx.tenant.clone(), lookup).await?;

        let (artist, duplicate) = match existing.into_iter().next() {
            Some(artist) => {
                tracing::info!(transaction_id = %transaction_id, "payment already provisioned");
                (artist, true)
            }
            None => {
                // the initial password can only reach the customer by SMS
                let Some(phone) = customer
                    .get("phone")
                    .and_then(Value::as_str)
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                else {
                    tracing::warn!(transaction_id = %transaction_id, "paid event without customer phone, not provisioned");
                    unprovisioned(ctx, ack, Some("missing phone"));
                    return Ok(());
                };
                let name = customer
                    .get("name")
                    .and_then(Value::as_str)
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .unwrap_or(FALLBACK_NAME);
                let data = json!({
                    "name": name,
                    "email": customer.get("email").cloned().unwrap_or(Value::Null),
                    "phone": phone,
                    "price": amount,
                    "transaction_id": &transaction_id,
                    "is_subscribed": true,
                });
                let created = artists
                    .create(ctx.tenant.clone(), data, GalleryParams::internal())
                    .await?;
                tracing::info!(
                    transaction_id = %transaction_id,
                    artist_id = ?created.get("artist_id"),
                    "VIP artist provisioned from payment"
                );
                (created, false)
            }
        };

        ack.insert("provisioned".into(), Value::Bool(true));
        ack.insert("duplicate".into(), Value::Bool(duplicate));
        ack.insert("artistId".into(), artist.get("artist_id").cloned().unwrap_or(Value::Null));
        ack.insert("linkId".into(), artist.get("link_id").cloned().unwrap_or(Value::Null));
        ctx.result = Some(HookResult::One(Value::Object(ack)));
        Ok(())
    }
}
