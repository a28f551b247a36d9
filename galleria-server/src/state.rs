use std::sync::Arc;
use std::time::Duration;

use galleria_auth::{AuthOptions, TokenIssuer};
use galleria_core::GalleryConfigSnapshot;

use crate::sms::SmsSender;
use crate::store::RecordStore;

/// Shared collaborators of all services and hooks.
pub struct GalleryState {
    pub store: Arc<dyn RecordStore>,
    pub sms: Arc<dyn SmsSender>,
    pub tokens: Arc<TokenIssuer>,
    pub auth: AuthOptions,
    pub operator_key: Option<String>,
    pub webhook_secret: Option<String>,
    pub sms_from: String,
    pub code_ttl: Duration,
    pub base_url: String,
}

impl GalleryState {
    pub fn new(
        config: &GalleryConfigSnapshot,
        store: Arc<dyn RecordStore>,
        sms: Arc<dyn SmsSender>,
    ) -> anyhow::Result<Self> {
        let mut auth = AuthOptions::from_config(config)?;
        if auth.secret.is_none() {
            tracing::warn!("auth.secret not set; using a random secret, sessions end on restart");
            auth.secret = Some(uuid::Uuid::new_v4().simple().to_string());
        }
        let tokens = Arc::new(TokenIssuer::new(auth.clone())?);

        Ok(Self {
            store,
            sms,
            tokens,
            auth,
            operator_key: config.get_string("operator.key"),
            webhook_secret: config.get_string("payments.secret"),
            sms_from: config.get_string("sms.from").unwrap_or_else(|| "Galleria".to_string()),
            code_ttl: config.get_secs("sms.code_ttl").unwrap_or(Duration::from_secs(180)),
            base_url: config
                .get("site.base_url")
                .unwrap_or("http://localhost:3000")
                .trim_end_matches('/')
                .to_string(),
        })
    }
}
