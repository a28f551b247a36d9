use galleria_core::GalleryConfig;

pub const ENV_PREFIX: &str = "GALLERIA__";

/// Defaults, then `.env`, then `GALLERIA__*` variables.
pub fn load() -> GalleryConfig {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(error = %e, "ignoring unreadable .env"),
    }

    let mut cfg = defaults();
    cfg.load_env(ENV_PREFIX);
    cfg
}

pub fn defaults() -> GalleryConfig {
    let mut cfg = GalleryConfig::new();
    cfg.set("http.host", "127.0.0.1");
    cfg.set("http.port", "3036");
    cfg.set("auth.expires", "12h");
    cfg.set("sms.from", "Galleria");
    cfg.set("sms.code_ttl", "180");
    cfg.set("store.timeout", "10");
    cfg.set("site.base_url", "http://localhost:3000");
    cfg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_overrides_defaults() {
        let mut cfg = defaults();
        cfg.load_vars(
            ENV_PREFIX,
            vec![("GALLERIA__HTTP__PORT".to_string(), "8080".to_string())],
        );
        let snap = cfg.snapshot();
        assert_eq!(snap.get_u64("http.port"), Some(8080));
        assert_eq!(snap.get("http.host"), Some("127.0.0.1"));
    }
}
