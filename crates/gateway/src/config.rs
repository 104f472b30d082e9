use serde::{Deserialize, Serialize};
use url::Url;

use portalguard_core::{ConfigError, CredentialPolicy, Lookup};
use portalguard_identity::IdentityConfig;

use crate::{CacheConfig, EvictionPolicy, RouteConfig};

fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_token_param() -> String {
    "token".to_string()
}

fn default_verify_timeout_ms() -> u64 {
    5_000
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    pub identity: IdentityConfig,
    #[serde(default)]
    pub routes: RouteConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub credentials: CredentialPolicy,
    /// Query parameter that may carry a credential (cross-service SSO).
    #[serde(default = "default_token_param")]
    pub token_param: String,
    /// Absolute origin used to rebuild the requested URL. When unset the
    /// origin comes from `X-Forwarded-Proto` / `X-Forwarded-Host` / `Host`.
    #[serde(default)]
    pub public_origin: Option<Url>,
    /// Upper bound on one verification round trip.
    #[serde(default = "default_verify_timeout_ms")]
    pub verify_timeout_ms: u64,
}

impl GatewayConfig {
    pub fn new(identity: IdentityConfig) -> Self {
        Self {
            bind_addr: default_bind_addr(),
            identity,
            routes: RouteConfig::default(),
            cache: CacheConfig::default(),
            credentials: CredentialPolicy::default(),
            token_param: default_token_param(),
            public_origin: None,
            verify_timeout_ms: default_verify_timeout_ms(),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(&portalguard_core::env())
    }

    pub fn from_lookup(lookup: &impl Lookup) -> Result<Self, ConfigError> {
        let mut config = Self::new(IdentityConfig::from_lookup(lookup)?);

        if let Some(addr) = lookup.get("PORTALGUARD_BIND_ADDR") {
            config.bind_addr = addr;
        }
        config.public_origin = lookup.url("PORTALGUARD_PUBLIC_ORIGIN")?;
        if let Some(prefixes) = lookup.list("PORTALGUARD_PUBLIC_PREFIXES") {
            config.routes.public_prefixes = prefixes;
        }
        if let Some(exclude) = lookup.flag("PORTALGUARD_EXCLUDE_STATIC_ASSETS")? {
            config.routes.exclude_static_assets = exclude;
        }
        if let Some(param) = lookup.get("PORTALGUARD_TOKEN_PARAM") {
            config.token_param = param;
        }
        if let Some(ttl) = lookup.parsed("PORTALGUARD_VERIFY_TTL_SECS")? {
            config.cache.ttl_secs = ttl;
        }
        if let Some(timeout) = lookup.parsed("PORTALGUARD_VERIFY_TIMEOUT_MS")? {
            config.verify_timeout_ms = timeout;
        }
        if let Some(capacity) = lookup.parsed("PORTALGUARD_CACHE_CAPACITY")? {
            config.cache.eviction = EvictionPolicy::Lru { capacity };
        }
        config.cache.sweep_interval_secs = lookup.parsed("PORTALGUARD_CACHE_SWEEP_SECS")?;
        if let Some(secure) = lookup.flag("PORTALGUARD_SECURE_COOKIES")? {
            config.credentials.secure = secure;
        }
        if let Some(name) = lookup.get("PORTALGUARD_PRIMARY_COOKIE") {
            config.credentials.primary_name = name;
        }
        if let Some(name) = lookup.get("PORTALGUARD_REFRESH_COOKIE") {
            config.credentials.refresh_name = name;
        }

        Ok(config)
    }
}
