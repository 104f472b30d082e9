//! The opaque bearer credential and the policy for the slots that persist it.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::BlankCredentialError;

/// Opaque bearer credential issued by the identity service.
///
/// The value is never printed by `Debug`; use [`Credential::fingerprint`] in logs.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Credential(String);

impl Credential {
    /// Wrap a raw credential. Blank input is not a credential.
    pub fn parse(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        if trimmed.len() == raw.len() {
            Some(Self(raw))
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short, non-reversible label for log lines.
    pub fn fingerprint(&self) -> String {
        let head: String = self.0.chars().take(6).collect();
        format!("{head}..({})", self.0.len())
    }
}

impl TryFrom<String> for Credential {
    type Error = BlankCredentialError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(raw).ok_or(BlankCredentialError)
    }
}

impl From<Credential> for String {
    fn from(credential: Credential) -> Self {
        credential.0
    }
}

impl core::fmt::Debug for Credential {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Credential({})", self.fingerprint())
    }
}

/// The two client-side slots a credential can live in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialSlot {
    /// Short-lived bearer credential sent on every request.
    Primary,
    /// Longer-lived credential exchanged for a new pair.
    Refresh,
}

impl CredentialSlot {
    pub const ALL: [CredentialSlot; 2] = [CredentialSlot::Primary, CredentialSlot::Refresh];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SameSite {
    #[default]
    Lax,
    Strict,
    None,
}

impl SameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Lax => "Lax",
            SameSite::Strict => "Strict",
            SameSite::None => "None",
        }
    }
}

fn default_primary_name() -> String {
    "auth_token".to_string()
}

fn default_refresh_name() -> String {
    "refresh_token".to_string()
}

fn default_path() -> String {
    "/".to_string()
}

fn default_primary_lifetime_secs() -> i64 {
    24 * 60 * 60
}

fn default_refresh_lifetime_secs() -> i64 {
    7 * 24 * 60 * 60
}

/// Names, lifetimes and attributes of the persisted credential slots.
///
/// Slots are readable by client-side script (never `HttpOnly`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialPolicy {
    #[serde(default = "default_primary_name")]
    pub primary_name: String,
    #[serde(default = "default_refresh_name")]
    pub refresh_name: String,
    #[serde(default = "default_path")]
    pub path: String,
    #[serde(default = "default_primary_lifetime_secs")]
    pub primary_lifetime_secs: i64,
    #[serde(default = "default_refresh_lifetime_secs")]
    pub refresh_lifetime_secs: i64,
    /// Lifetime given to a credential promoted out of a URL.
    #[serde(default = "default_refresh_lifetime_secs")]
    pub promoted_lifetime_secs: i64,
    #[serde(default)]
    pub secure: bool,
    #[serde(default)]
    pub same_site: SameSite,
}

impl Default for CredentialPolicy {
    fn default() -> Self {
        Self {
            primary_name: default_primary_name(),
            refresh_name: default_refresh_name(),
            path: default_path(),
            primary_lifetime_secs: default_primary_lifetime_secs(),
            refresh_lifetime_secs: default_refresh_lifetime_secs(),
            promoted_lifetime_secs: default_refresh_lifetime_secs(),
            secure: false,
            same_site: SameSite::Lax,
        }
    }
}

impl CredentialPolicy {
    pub fn slot_name(&self, slot: CredentialSlot) -> &str {
        match slot {
            CredentialSlot::Primary => &self.primary_name,
            CredentialSlot::Refresh => &self.refresh_name,
        }
    }

    pub fn lifetime(&self, slot: CredentialSlot) -> Duration {
        match slot {
            CredentialSlot::Primary => Duration::seconds(self.primary_lifetime_secs),
            CredentialSlot::Refresh => Duration::seconds(self.refresh_lifetime_secs),
        }
    }

    pub fn promoted_lifetime(&self) -> Duration {
        Duration::seconds(self.promoted_lifetime_secs)
    }
}
