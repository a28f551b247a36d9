use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use galleria_core::errors::GalleryError;
use reqwest::Client;

use super::{SmsMessage, SmsSender};

/// Posts `{to, from, text}` as JSON to the gateway.
pub struct HttpSmsSender {
    client: Client,
    url: String,
    key: Option<String>,
}

impl HttpSmsSender {
    pub fn new(url: &str, key: Option<&str>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            url: url.to_string(),
            key: key.map(str::to_string),
        })
    }
}

#[async_trait]
impl SmsSender for HttpSmsSender {
    async fn send(&self, message: SmsMessage) -> Result<()> {
        let mut req = self.client.post(&self.url).json(&message);
        if let Some(key) = &self.key {
            req = req.bearer_auth(key);
        }

        let res = req
            .send()
            .await
            .map_err(|e| GalleryError::bad_gateway(format!("SMS gateway unreachable: {e}")).into_anyhow())?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), %body, to = %message.to, "SMS gateway rejected message");
            return Err(GalleryError::bad_gateway(format!("SMS gateway responded {status}")).into_anyhow());
        }

        tracing::info!(to = %message.to, "SMS sent");
        Ok(())
    }
}
