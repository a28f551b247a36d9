//! Multi-tenant types and host based tenant resolution.
//!
//! A tenant is one artist's gallery. Its id (`artistId`) partitions every
//! settings, artwork, password, visit and encouragement row. The
//! [`TenantResolver`] turns an inbound host (plus an optional explicit
//! override such as the `vipId` query parameter) into that id.
//!
//! Resolution order, first match wins:
//!
//! 1. explicit override
//! 2. exact host match
//! 3. host match with the port stripped
//! 4. keyword fragment contained in the host
//! 5. the default tenant
//!
//! Resolution never fails: an unknown domain shows the default gallery.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::GalleryConfigSnapshot;

/// Tenant served when nothing else matches.
pub const DEFAULT_TENANT: &str = "-vqsk";

/// A tenant identifier (the artist id).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TenantId(pub String);

impl TenantId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which resolution branch produced a tenant id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResolutionSource {
    Override,
    ExactHost,
    HostWithoutPort,
    Keyword,
    Default,
}

impl ResolutionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionSource::Override => "override",
            ResolutionSource::ExactHost => "exactHost",
            ResolutionSource::HostWithoutPort => "hostWithoutPort",
            ResolutionSource::Keyword => "keyword",
            ResolutionSource::Default => "default",
        }
    }
}

/// Context carried with every Galleria operation.
///
/// Passed into services and hooks so that all reads and writes are
/// explicitly scoped to one tenant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantContext {
    pub tenant_id: TenantId,
    pub source: ResolutionSource,
}

impl TenantContext {
    /// Context for an explicitly supplied tenant id.
    pub fn new<S: Into<String>>(tenant: S) -> Self {
        Self {
            tenant_id: TenantId(tenant.into()),
            source: ResolutionSource::Override,
        }
    }

    pub fn id(&self) -> &str {
        self.tenant_id.as_str()
    }
}

/// Outcome of [`TenantResolver::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub tenant_id: TenantId,
    pub source: ResolutionSource,
}

impl From<Resolution> for TenantContext {
    fn from(r: Resolution) -> Self {
        Self {
            tenant_id: r.tenant_id,
            source: r.source,
        }
    }
}

/// Static host table plus keyword fallbacks.
#[derive(Debug, Clone)]
pub struct TenantResolver {
    hosts: HashMap<String, String>,
    keywords: Vec<(String, String)>,
    default_tenant: String,
}

impl Default for TenantResolver {
    fn default() -> Self {
        Self::builtin(None)
    }
}

impl TenantResolver {
    /// An empty resolver that sends every host to `default_tenant`.
    ///
    /// A blank default falls back to [`DEFAULT_TENANT`] so the output is
    /// never empty.
    pub fn new(default_tenant: impl Into<String>) -> Self {
        let default_tenant = default_tenant.into();
        let default_tenant = if default_tenant.trim().is_empty() {
            DEFAULT_TENANT.to_string()
        } else {
            default_tenant.trim().to_string()
        };

        Self {
            hosts: HashMap::new(),
            keywords: Vec::new(),
            default_tenant,
        }
    }

    /// The deployed gallery domains.
    ///
    /// `local_tenant` picks the gallery shown on `localhost`; without it
    /// local development shows the default tenant.
    pub fn builtin(local_tenant: Option<&str>) -> Self {
        let local = local_tenant
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_TENANT)
            .to_string();

        Self::new(DEFAULT_TENANT)
            .with_host("grim-sil.vercel.app", DEFAULT_TENANT)
            .with_host("hahyunju-gallery.vercel.app", "vip-gallery-01")
            .with_host("localhost:3000", local.clone())
            .with_host("localhost", local)
            .with_keyword("hahyunju", "vip-gallery-01")
            .with_keyword("moonhyekyung", "vip-gallery-02")
            .with_keyword("grim-sil", DEFAULT_TENANT)
    }

    /// Built-in table extended from configuration.
    ///
    /// Keys: `tenants.default`, `tenants.local`, `tenants.hosts` and
    /// `tenants.keywords` (both `key=tenant,key=tenant`).
    pub fn from_config(config: &GalleryConfigSnapshot) -> Self {
        let mut resolver = Self::builtin(config.get("tenants.local"));

        if let Some(default) = config.get("tenants.default") {
            resolver = resolver.with_default(default);
        }
        for (host, tenant) in config.get_pairs("tenants.hosts") {
            resolver = resolver.with_host(host, tenant);
        }
        for (fragment, tenant) in config.get_pairs("tenants.keywords") {
            resolver = resolver.with_keyword(fragment, tenant);
        }

        resolver
    }

    pub fn with_host(mut self, host: impl AsRef<str>, tenant: impl Into<String>) -> Self {
        let host = normalize_host(host.as_ref());
        let tenant = tenant.into().trim().to_string();
        if !host.is_empty() && !tenant.is_empty() {
            self.hosts.insert(host, tenant);
        }
        self
    }

    /// Keywords are checked in insertion order; re-adding a fragment
    /// replaces its tenant in place.
    pub fn with_keyword(mut self, fragment: impl AsRef<str>, tenant: impl Into<String>) -> Self {
        let fragment = fragment.as_ref().trim().to_lowercase();
        let tenant = tenant.into().trim().to_string();
        if fragment.is_empty() || tenant.is_empty() {
            return self;
        }

        match self.keywords.iter_mut().find(|(f, _)| *f == fragment) {
            Some(entry) => entry.1 = tenant,
            None => self.keywords.push((fragment, tenant)),
        }
        self
    }

    pub fn with_default(mut self, tenant: impl Into<String>) -> Self {
        let tenant = tenant.into();
        if !tenant.trim().is_empty() {
            self.default_tenant = tenant.trim().to_string();
        }
        self
    }

    pub fn default_tenant(&self) -> &str {
        &self.default_tenant
    }

    /// Map a host and optional override to a tenant id.
    pub fn resolve(&self, host: Option<&str>, override_id: Option<&str>) -> Resolution {
        if let Some(id) = override_id.map(str::trim).filter(|s| !s.is_empty()) {
            return self.resolved(id, ResolutionSource::Override, host);
        }

        let host = host.map(normalize_host).unwrap_or_default();

        if !host.is_empty() {
            if let Some(id) = self.hosts.get(&host) {
                return self.resolved(id, ResolutionSource::ExactHost, Some(host.as_str()));
            }

            let bare = strip_port(&host);
            if bare != host {
                if let Some(id) = self.hosts.get(bare) {
                    return self.resolved(id, ResolutionSource::HostWithoutPort, Some(host.as_str()));
                }
            }

            if let Some((_, id)) = self.keywords.iter().find(|(f, _)| host.contains(f.as_str())) {
                return self.resolved(id, ResolutionSource::Keyword, Some(host.as_str()));
            }
        }

        self.resolved(&self.default_tenant, ResolutionSource::Default, Some(host.as_str()))
    }

    pub fn resolve_context(&self, host: Option<&str>, override_id: Option<&str>) -> TenantContext {
        self.resolve(host, override_id).into()
    }

    fn resolved(&self, id: &str, source: ResolutionSource, host: Option<&str>) -> Resolution {
        tracing::debug!(
            host = host.unwrap_or(""),
            tenant = id,
            source = source.as_str(),
            "resolved tenant"
        );
        Resolution {
            tenant_id: TenantId(id.to_string()),
            source,
        }
    }
}

fn normalize_host(host: &str) -> String {
    host.trim().trim_end_matches('.').to_lowercase()
}

/// `example.com:443` -> `example.com`, `[::1]:3000` -> `[::1]`.
fn strip_port(host: &str) -> &str {
    if host.starts_with('[') {
        return match host.find(']') {
            Some(end) => &host[..=end],
            None => host,
        };
    }

    match host.rsplit_once(':') {
        Some((bare, port)) if !port.is_empty() && port.chars().all(|c| c.is_ascii_digit()) => bare,
        _ => host,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GalleryConfig;

    fn resolver() -> TenantResolver {
        TenantResolver::builtin(None)
    }

    #[test]
    fn exact_host_returns_mapped_tenant() {
        let r = resolver().resolve(Some("hahyunju-gallery.vercel.app"), None);
        assert_eq!(r.tenant_id.as_str(), "vip-gallery-01");
        assert_eq!(r.source, ResolutionSource::ExactHost);

        let r = resolver().resolve(Some("grim-sil.vercel.app"), None);
        assert_eq!(r.tenant_id.as_str(), "-vqsk");
    }

    #[test]
    fn host_is_normalized_before_lookup() {
        let r = resolver().resolve(Some("  HaHyunJu-Gallery.Vercel.App. "), None);
        assert_eq!(r.tenant_id.as_str(), "vip-gallery-01");
        assert_eq!(r.source, ResolutionSource::ExactHost);
    }

    #[test]
    fn port_is_stripped_when_only_bare_host_is_mapped() {
        let r = resolver().resolve(Some("hahyunju-gallery.vercel.app:8443"), None);
        assert_eq!(r.tenant_id.as_str(), "vip-gallery-01");
        assert_eq!(r.source, ResolutionSource::HostWithoutPort);
    }

    #[test]
    fn localhost_with_and_without_port_agree() {
        let local = TenantResolver::builtin(Some("gallery-vip-07"));
        assert_eq!(local.resolve(Some("localhost:3000"), None).tenant_id.as_str(), "gallery-vip-07");
        assert_eq!(local.resolve(Some("localhost"), None).tenant_id.as_str(), "gallery-vip-07");
        assert_eq!(local.resolve(Some("localhost:5173"), None).tenant_id.as_str(), "gallery-vip-07");

        let r = resolver().resolve(Some("localhost:3000"), None);
        assert_eq!(r.tenant_id.as_str(), DEFAULT_TENANT);
    }

    #[test]
    fn keyword_fragment_matches_unlisted_host() {
        let r = resolver().resolve(Some("moonhyekyung-gallery.vercel.app"), None);
        assert_eq!(r.tenant_id.as_str(), "vip-gallery-02");
        assert_eq!(r.source, ResolutionSource::Keyword);

        let r = resolver().resolve(Some("preview-hahyunju-git-main.vercel.app"), None);
        assert_eq!(r.tenant_id.as_str(), "vip-gallery-01");
    }

    #[test]
    fn unknown_host_falls_back_to_default() {
        let r = resolver().resolve(Some("unknown-random-domain.com"), None);
        assert_eq!(r.tenant_id.as_str(), DEFAULT_TENANT);
        assert_eq!(r.source, ResolutionSource::Default);

        let r = resolver().resolve(None, None);
        assert_eq!(r.tenant_id.as_str(), DEFAULT_TENANT);

        let r = resolver().resolve(Some("   "), Some("  "));
        assert_eq!(r.source, ResolutionSource::Default);
    }

    #[test]
    fn override_wins_over_every_host() {
        for host in [
            Some("localhost:3000"),
            Some("hahyunju-gallery.vercel.app"),
            Some("moonhyekyung-gallery.vercel.app"),
            Some("unknown-random-domain.com"),
            None,
        ] {
            let r = resolver().resolve(host, Some("gallery-vip-03"));
            assert_eq!(r.tenant_id.as_str(), "gallery-vip-03");
            assert_eq!(r.source, ResolutionSource::Override);
        }
    }

    #[test]
    fn ipv6_port_is_stripped() {
        let r = TenantResolver::new("fallback")
            .with_host("[::1]", "v6-tenant")
            .resolve(Some("[::1]:3000"), None);
        assert_eq!(r.tenant_id.as_str(), "v6-tenant");
        assert_eq!(strip_port("example.com"), "example.com");
        assert_eq!(strip_port("example.com:"), "example.com:");
    }

    #[test]
    fn blank_entries_are_ignored() {
        let r = TenantResolver::new("  ")
            .with_host("", "x")
            .with_host("a.com", " ")
            .with_keyword(" ", "y");
        assert_eq!(r.default_tenant(), DEFAULT_TENANT);
        assert_eq!(r.resolve(Some("a.com"), None).source, ResolutionSource::Default);
    }

    #[test]
    fn config_extends_builtin_table() {
        let mut cfg = GalleryConfig::new();
        cfg.set("tenants.default", "house-gallery");
        cfg.set("tenants.hosts", "art.example.com=gallery-vip-05, other.example.com = gallery-vip-06");
        cfg.set("tenants.keywords", "parkjisoo=gallery-vip-09");

        let r = TenantResolver::from_config(&cfg.snapshot());
        assert_eq!(r.resolve(Some("art.example.com"), None).tenant_id.as_str(), "gallery-vip-05");
        assert_eq!(r.resolve(Some("other.example.com:80"), None).tenant_id.as_str(), "gallery-vip-06");
        assert_eq!(r.resolve(Some("parkjisoo.vercel.app"), None).tenant_id.as_str(), "gallery-vip-09");
        assert_eq!(r.resolve(Some("nowhere.test"), None).tenant_id.as_str(), "house-gallery");
        assert_eq!(r.resolve(Some("hahyunju-gallery.vercel.app"), None).tenant_id.as_str(), "vip-gallery-01");
    }
}
