use serde::{Deserialize, Serialize};
use url::Url;

use portalguard_core::{ConfigError, Lookup};

use crate::IdentityError;

pub const DEFAULT_IDENTITY_URL: &str = "http://localhost:4000";

fn default_timeout_ms() -> u64 {
    5_000
}

fn default_return_param() -> String {
    "returnUrl".to_string()
}

/// Where the identity service lives and how to talk to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityConfig {
    pub base_url: Url,
    /// Per-request HTTP timeout.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Query parameter the login/logout pages read to send the user back.
    #[serde(default = "default_return_param")]
    pub return_param: String,
}

impl IdentityConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout_ms: default_timeout_ms(),
            return_param: default_return_param(),
        }
    }

    /// Read `PORTALGUARD_IDENTITY_URL` / `PORTALGUARD_IDENTITY_TIMEOUT_MS`.
    pub fn from_lookup(lookup: &impl Lookup) -> Result<Self, ConfigError> {
        let base_url = match lookup.url("PORTALGUARD_IDENTITY_URL")? {
            Some(url) => url,
            None => {
                tracing::warn!(
                    "PORTALGUARD_IDENTITY_URL not set; using {DEFAULT_IDENTITY_URL}"
                );
                Url::parse(DEFAULT_IDENTITY_URL).map_err(|source| ConfigError::InvalidUrl {
                    key: "PORTALGUARD_IDENTITY_URL".to_string(),
                    source,
                })?
            }
        };

        let mut config = Self::new(base_url);
        if let Some(timeout_ms) = lookup.parsed("PORTALGUARD_IDENTITY_TIMEOUT_MS")? {
            config.timeout_ms = timeout_ms;
        }
        Ok(config)
    }

    /// Resolve an API path against the base URL.
    pub fn endpoint(&self, path: &str) -> Result<Url, IdentityError> {
        self.base_url
            .join(path)
            .map_err(|e| IdentityError::Url(e.to_string()))
    }

    /// Login page that returns the user to `return_to` afterwards.
    pub fn login_url(&self, return_to: &str) -> Result<Url, IdentityError> {
        let mut url = self.endpoint("/login")?;
        url.query_pairs_mut().append_pair(&self.return_param, return_to);
        Ok(url)
    }

    /// Logout page, optionally returning the user to `return_to`.
    pub fn logout_url(&self, return_to: Option<&str>) -> Result<Url, IdentityError> {
        let mut url = self.endpoint("/logout")?;
        if let Some(return_to) = return_to {
            url.query_pairs_mut().append_pair(&self.return_param, return_to);
        }
        Ok(url)
    }
}
