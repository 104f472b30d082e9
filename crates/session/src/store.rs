//! Persisted credential slots.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;

use portalguard_core::{Clock, Credential, CredentialSlot};

/// Where the session holder keeps its credentials (browser cookies, a
/// keychain, process memory...).
pub trait CredentialStore: Send + Sync {
    /// The live credential in `slot`, if any.
    fn get(&self, slot: CredentialSlot) -> Option<Credential>;

    /// Replace `slot` with `credential`, valid for `lifetime`.
    fn set(&self, slot: CredentialSlot, credential: Credential, lifetime: Duration);

    fn remove(&self, slot: CredentialSlot);
}

/// Process-local store. Expired slots read as empty.
pub struct InMemoryCredentialStore {
    clock: Arc<dyn Clock>,
    slots: Mutex<HashMap<CredentialSlot, (Credential, DateTime<Utc>)>>,
}

impl InMemoryCredentialStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            slots: Mutex::new(HashMap::new()),
        }
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn get(&self, slot: CredentialSlot) -> Option<Credential> {
        let now = self.clock.now();
        let mut slots = self.slots.lock();
        match slots.get(&slot) {
            Some((credential, expires_at)) if now < *expires_at => Some(credential.clone()),
            Some(_) => {
                slots.remove(&slot);
                None
            }
            None => None,
        }
    }

    fn set(&self, slot: CredentialSlot, credential: Credential, lifetime: Duration) {
        let expires_at = self.clock.now() + lifetime;
        self.slots.lock().insert(slot, (credential, expires_at));
    }

    fn remove(&self, slot: CredentialSlot) {
        self.slots.lock().remove(&slot);
    }
}
