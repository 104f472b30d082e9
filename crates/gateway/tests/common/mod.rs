#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use parking_lot::Mutex;
use url::Url;

use portalguard_core::{Credential, ManualClock};
use portalguard_gateway::{Gateway, GatewayConfig, InMemoryVerificationCache};
use portalguard_identity::{AuthTokens, IdentityApi, IdentityConfig, IdentityError, UserProfile};

pub const IDENTITY: &str = "https://id.example.com/";
pub const PORTAL: &str = "https://portal.example.com/";

/// Identity service double: counts verify calls, accepts a configurable set.
#[derive(Default)]
pub struct FakeIdentity {
    valid: Mutex<HashSet<String>>,
    calls: AtomicUsize,
    down: AtomicBool,
    delay: Mutex<Option<Duration>>,
}

impl FakeIdentity {
    pub fn accepting(credentials: &[&str]) -> Arc<Self> {
        let fake = Self::default();
        fake.valid.lock().extend(credentials.iter().map(|c| c.to_string()));
        Arc::new(fake)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = Some(delay);
    }

    pub fn revoke(&self, credential: &str) {
        self.valid.lock().remove(credential);
    }
}

#[async_trait]
impl IdentityApi for FakeIdentity {
    async fn verify(&self, credential: &Credential) -> Result<(), IdentityError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.down.load(Ordering::SeqCst) {
            return Err(IdentityError::Unavailable("connection refused".into()));
        }
        if self.valid.lock().contains(credential.as_str()) {
            Ok(())
        } else {
            Err(IdentityError::Rejected { status: 401 })
        }
    }

    async fn profile(&self, _credential: &Credential) -> Result<UserProfile, IdentityError> {
        Err(IdentityError::Rejected { status: 404 })
    }

    async fn login(&self, _email: &str, _password: &str) -> Result<AuthTokens, IdentityError> {
        Err(IdentityError::Rejected { status: 404 })
    }

    async fn refresh(&self, _refresh: &Credential) -> Result<AuthTokens, IdentityError> {
        Err(IdentityError::Rejected { status: 404 })
    }
}

pub fn clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()))
}

pub fn config() -> GatewayConfig {
    let mut config = GatewayConfig::new(IdentityConfig::new(Url::parse(IDENTITY).unwrap()));
    config.public_origin = Some(Url::parse(PORTAL).unwrap());
    config
}

pub struct Harness {
    pub gateway: Arc<Gateway>,
    pub identity: Arc<FakeIdentity>,
    pub clock: Arc<ManualClock>,
    pub cache: Arc<InMemoryVerificationCache>,
}

pub fn harness(identity: Arc<FakeIdentity>) -> Harness {
    harness_with(config(), identity)
}

pub fn harness_with(config: GatewayConfig, identity: Arc<FakeIdentity>) -> Harness {
    let clock = clock();
    let cache = Arc::new(InMemoryVerificationCache::unbounded());
    let gateway = Arc::new(Gateway::new(config, cache.clone(), identity.clone(), clock.clone()));
    Harness {
        gateway,
        identity,
        clock,
        cache,
    }
}
