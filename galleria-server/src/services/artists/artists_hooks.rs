use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use galleria_core::{AfterHook, HookContext, HookResult};
use serde_json::Value;

use crate::services::GalleryParams;
use crate::sms::SmsMessage;
use crate::state::GalleryState;

fn str_field<'a>(v: &'a Value, key: &str) -> Option<&'a str> {
    v.get(key).and_then(Value::as_str).filter(|s| !s.trim().is_empty())
}

pub fn welcome_text(base_url: &str, link_id: &str, password: &str) -> String {
    format!("[Galleria] Your gallery is ready: {base_url}/g/{link_id}\nAdmin password: {password}")
}

/// Texts the gallery link and initial password to a new VIP.
pub struct SendWelcomeSms {
    pub state: Arc<GalleryState>,
}

#[async_trait]
impl AfterHook<Value, GalleryParams> for SendWelcomeSms {
    async fn run(&self, ctx: &mut HookContext<Value, GalleryParams>) -> Result<()> {
        let Some(HookResult::One(artist)) = ctx.result.as_ref() else {
            return Ok(());
        };
        let (Some(phone), Some(link_id), Some(password)) = (
            str_field(artist, "phone"),
            str_field(artist, "link_id"),
            str_field(artist, "initial_password"),
        ) else {
            return Ok(());
        };

        let message = SmsMessage {
            to: phone.to_string(),
            from: self.state.sms_from.clone(),
            text: welcome_text(&self.state.base_url, link_id, password),
        };
        // provisioning stands when delivery fails
        if let Err(e) = self.state.sms.send(message).await {
            tracing::warn!(error = %e, artist_id = ?artist.get("artist_id"), "welcome SMS failed");
        }
        Ok(())
    }
}
