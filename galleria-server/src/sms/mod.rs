//! Outbound SMS.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use galleria_core::GalleryConfigSnapshot;
use serde::Serialize;

pub mod http;
pub mod log;

pub use self::http::HttpSmsSender;
pub use self::log::LogSmsSender;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SmsMessage {
    pub to: String,
    pub from: String,
    pub text: String,
}

#[async_trait]
pub trait SmsSender: Send + Sync {
    async fn send(&self, message: SmsMessage) -> Result<()>;
}

/// The HTTP gateway when `sms.url` is set, a logging sender otherwise.
pub fn from_config(config: &GalleryConfigSnapshot) -> Result<Arc<dyn SmsSender>> {
    match config.get("sms.url") {
        Some(url) => {
            let timeout = config.get_secs("store.timeout").unwrap_or(Duration::from_secs(10));
            Ok(Arc::new(HttpSmsSender::new(url, config.get("sms.key"), timeout)?))
        }
        None => {
            tracing::warn!("sms.url not set; text messages are only logged");
            Ok(Arc::new(LogSmsSender::new()))
        }
    }
}
