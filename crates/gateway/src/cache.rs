//! Short-lived credential verification cache.
//!
//! Keyed by the raw credential string. An entry is trusted while
//! `now <= expires_at_millis`; after that it is stale and the caller must
//! re-verify and overwrite it. Concurrent misses on the same key may both
//! verify; the last write wins.

use std::num::NonZeroUsize;

use async_trait::async_trait;
use lru::LruCache;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub valid: bool,
    pub expires_at_millis: i64,
}

impl CacheEntry {
    pub fn new(valid: bool, expires_at_millis: i64) -> Self {
        Self {
            valid,
            expires_at_millis,
        }
    }

    pub fn is_fresh_at(&self, now_millis: i64) -> bool {
        now_millis <= self.expires_at_millis
    }
}

/// Storage behind the gateway's verification step.
///
/// Implementations may live out of process (shared between gateway
/// instances); the gateway only relies on `get` and `put`.
#[async_trait]
pub trait VerificationCache: Send + Sync {
    async fn get(&self, credential: &str) -> Option<CacheEntry>;

    async fn put(&self, credential: &str, entry: CacheEntry);

    async fn remove(&self, credential: &str);

    async fn len(&self) -> usize;
}

/// How the in-memory cache bounds its size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EvictionPolicy {
    /// Entries accumulate for the lifetime of the process.
    #[default]
    Unbounded,
    /// Least-recently-used eviction beyond `capacity` (0 means unbounded).
    Lru { capacity: usize },
}

fn default_ttl_secs() -> u64 {
    30
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Freshness window written with every verification outcome.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    #[serde(default)]
    pub eviction: EvictionPolicy,
    /// Interval of the background sweep of stale entries; none when unset.
    #[serde(default)]
    pub sweep_interval_secs: Option<u64>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            eviction: EvictionPolicy::Unbounded,
            sweep_interval_secs: None,
        }
    }
}

/// Process-local [`VerificationCache`].
#[derive(Debug)]
pub struct InMemoryVerificationCache {
    entries: Mutex<LruCache<String, CacheEntry>>,
}

impl InMemoryVerificationCache {
    pub fn new(policy: EvictionPolicy) -> Self {
        let entries = match policy {
            EvictionPolicy::Unbounded => LruCache::unbounded(),
            EvictionPolicy::Lru { capacity } => {
                NonZeroUsize::new(capacity).map_or_else(LruCache::unbounded, LruCache::new)
            }
        };
        Self {
            entries: Mutex::new(entries),
        }
    }

    pub fn unbounded() -> Self {
        Self::new(EvictionPolicy::Unbounded)
    }

    /// Drop every entry that is stale at `now_millis`. Returns how many went.
    pub fn sweep_expired(&self, now_millis: i64) -> usize {
        let mut entries = self.entries.lock();
        let stale: Vec<String> = entries
            .iter()
            .filter(|(_, entry)| !entry.is_fresh_at(now_millis))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &stale {
            entries.pop(key);
        }
        stale.len()
    }
}

impl Default for InMemoryVerificationCache {
    fn default() -> Self {
        Self::unbounded()
    }
}

#[async_trait]
impl VerificationCache for InMemoryVerificationCache {
    async fn get(&self, credential: &str) -> Option<CacheEntry> {
        self.entries.lock().get(credential).copied()
    }

    async fn put(&self, credential: &str, entry: CacheEntry) {
        self.entries.lock().put(credential.to_string(), entry);
    }

    async fn remove(&self, credential: &str) {
        self.entries.lock().pop(credential);
    }

    async fn len(&self) -> usize {
        self.entries.lock().len()
    }
}
