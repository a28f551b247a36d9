//! # Configuration
//!
//! A string key/value store, set with `app.set()` and read through an
//! immutable [`GalleryConfigSnapshot`] handed to every hook.
//!
//! ```rust
//! use galleria_core::GalleryConfig;
//!
//! let mut cfg = GalleryConfig::new();
//! cfg.set("http.port", "3036");
//! assert_eq!(cfg.snapshot().get_u64("http.port"), Some(3036));
//! ```
//!
//! Environment variables with a prefix are flattened into dotted keys:
//! `GALLERIA__AUTH__SECRET=s3cret` becomes `auth.secret`.

use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Default, Clone)]
pub struct GalleryConfig {
    values: HashMap<String, String>,
}

impl GalleryConfig {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    pub fn set<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|s| s.as_str())
    }

    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Values from `other` win.
    pub fn merge(&mut self, other: &GalleryConfig) {
        for (k, v) in &other.values {
            self.values.insert(k.clone(), v.clone());
        }
    }

    /// Copy every `{prefix}A__B` variable into key `a.b`.
    pub fn load_env(&mut self, prefix: &str) {
        self.load_vars(prefix, std::env::vars());
    }

    pub fn load_vars<I>(&mut self, prefix: &str, vars: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            if let Some(stripped) = key.strip_prefix(prefix) {
                let normalized = stripped.to_lowercase().replace("__", ".");
                if !normalized.is_empty() {
                    self.values.insert(normalized, value);
                }
            }
        }
    }

    pub fn snapshot(&self) -> GalleryConfigSnapshot {
        GalleryConfigSnapshot::new(self.values.clone())
    }
}

#[derive(Debug, Clone, Default)]
pub struct GalleryConfigSnapshot {
    map: HashMap<String, String>,
}

impl GalleryConfigSnapshot {
    pub(crate) fn new(map: HashMap<String, String>) -> Self {
        Self { map }
    }

    /// Non-blank value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.map
            .get(key)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.get(key).map(|s| s.to_string())
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(|v| v.parse::<u64>().ok())
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(|v| match v.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Some(true),
            "false" | "0" | "no" | "off" => Some(false),
            _ => None,
        })
    }

    /// Whole seconds, e.g. `sms.code_ttl = 180`.
    pub fn get_secs(&self, key: &str) -> Option<Duration> {
        self.get_u64(key).map(Duration::from_secs)
    }

    /// `a=1, b=2` -> `[("a", "1"), ("b", "2")]`; malformed items are skipped.
    pub fn get_pairs(&self, key: &str) -> Vec<(String, String)> {
        let Some(raw) = self.get(key) else {
            return Vec::new();
        };

        raw.split(',')
            .filter_map(|item| item.split_once('='))
            .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
            .filter(|(k, v)| !k.is_empty() && !v.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_vars_flatten_into_dotted_keys() {
        let mut cfg = GalleryConfig::new();
        cfg.load_vars(
            "GALLERIA__",
            vec![
                ("GALLERIA__HTTP__PORT".to_string(), "8080".to_string()),
                ("GALLERIA__SMS__CODE_TTL".to_string(), "60".to_string()),
                ("OTHER__HTTP__PORT".to_string(), "1".to_string()),
            ],
        );
        let snap = cfg.snapshot();
        assert_eq!(snap.get_u64("http.port"), Some(8080));
        assert_eq!(snap.get_secs("sms.code_ttl"), Some(Duration::from_secs(60)));
        assert!(!cfg.has("other.http.port"));
    }

    #[test]
    fn blank_values_read_as_missing() {
        let mut cfg = GalleryConfig::new();
        cfg.set("store.url", "   ");
        cfg.set("flags.on", "yes");
        let snap = cfg.snapshot();
        assert_eq!(snap.get("store.url"), None);
        assert_eq!(snap.get_bool("flags.on"), Some(true));
    }

    #[test]
    fn pairs_skip_malformed_items() {
        let mut cfg = GalleryConfig::new();
        cfg.set("tenants.hosts", "a.com=one, broken, =x, b.com = two");
        let pairs = cfg.snapshot().get_pairs("tenants.hosts");
        assert_eq!(
            pairs,
            vec![
                ("a.com".to_string(), "one".to_string()),
                ("b.com".to_string(), "two".to_string())
            ]
        );
    }
}
