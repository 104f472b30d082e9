use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use url::Url;

use portalguard_auth::{ResolvedPrivileges, aggregate};
use portalguard_core::{Credential, CredentialPolicy, CredentialSlot};
use portalguard_identity::{AuthTokens, IdentityApi, IdentityConfig};

use crate::{CredentialStore, Session, SessionError, SessionState};

/// Holds the current session and the credential lifecycle around it.
pub struct SessionHolder {
    identity: Arc<dyn IdentityApi>,
    identity_config: IdentityConfig,
    store: Arc<dyn CredentialStore>,
    policy: CredentialPolicy,
    state: RwLock<SessionState>,
}

impl SessionHolder {
    pub fn new(
        identity: Arc<dyn IdentityApi>,
        identity_config: IdentityConfig,
        store: Arc<dyn CredentialStore>,
        policy: CredentialPolicy,
    ) -> Self {
        Self {
            identity,
            identity_config,
            store,
            policy,
            state: RwLock::new(SessionState::Loading),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state.read().clone()
    }

    pub fn session(&self) -> Option<Session> {
        self.state.read().session().cloned()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.read().session().is_some()
    }

    /// Resolve the initial state from the stored primary credential.
    ///
    /// A failed profile fetch leaves the credential in place; the gateway
    /// re-verifies it on the next navigation.
    pub async fn initialize(&self) -> SessionState {
        self.set_state(SessionState::Loading);

        let Some(credential) = self.store.get(CredentialSlot::Primary) else {
            tracing::debug!("no stored credential; unauthenticated");
            self.set_state(SessionState::Unauthenticated);
            return SessionState::Unauthenticated;
        };

        let state = match self.identity.profile(&credential).await {
            Ok(profile) => SessionState::Authenticated(Session::new(profile)),
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    credential = %credential.fingerprint(),
                    "profile fetch failed; keeping stored credential"
                );
                SessionState::Unauthenticated
            }
        };
        self.set_state(state.clone());
        state
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Session, SessionError> {
        let tokens = self.identity.login(email, password).await?;
        let session = self.store_tokens(tokens);
        tracing::info!(user_id = %session.user_id(), "logged in");
        Ok(session)
    }

    /// Clear both slots and return the identity service logout page to
    /// navigate to.
    pub fn logout(&self, return_to: Option<&str>) -> Result<Url, SessionError> {
        for slot in CredentialSlot::ALL {
            self.store.remove(slot);
        }
        let previous = std::mem::replace(&mut *self.state.write(), SessionState::Unauthenticated);
        if let Some(session) = previous.session() {
            tracing::info!(user_id = %session.user_id(), "logged out");
        }
        self.identity_config.logout_url(return_to).map_err(Into::into)
    }

    /// Exchange the refresh credential for a new pair.
    ///
    /// On failure the stored credentials are left untouched.
    pub async fn refresh_token(&self) -> Result<Session, SessionError> {
        let refresh = self
            .store
            .get(CredentialSlot::Refresh)
            .ok_or(SessionError::NoRefreshCredential)?;

        let tokens = self.identity.refresh(&refresh).await.inspect_err(|err| {
            tracing::warn!(error = %err, "credential refresh failed");
        })?;
        let session = self.store_tokens(tokens);
        tracing::info!(user_id = %session.user_id(), "credentials refreshed");
        Ok(session)
    }

    /// Re-fetch the profile without touching credentials.
    pub async fn refresh_profile(&self) -> Result<Session, SessionError> {
        let credential = self
            .store
            .get(CredentialSlot::Primary)
            .ok_or(SessionError::NoCredential)?;

        let profile = self.identity.profile(&credential).await.map_err(|err| {
            tracing::warn!(error = %err, "profile refresh failed");
            SessionError::ProfileFetchFailed(err)
        })?;

        let session = Session::new(profile);
        self.set_state(SessionState::Authenticated(session.clone()));
        Ok(session)
    }

    /// Privileges granted by the roles carried in the current profile.
    pub fn privileges(&self, now: DateTime<Utc>) -> ResolvedPrivileges {
        match self.state.read().session() {
            Some(session) => aggregate(
                &session.profile().roles,
                &session.profile().role_assignments,
                now,
            ),
            None => ResolvedPrivileges::default(),
        }
    }

    /// The stored primary credential, for callers that talk to APIs directly.
    pub fn credential(&self) -> Option<Credential> {
        self.store.get(CredentialSlot::Primary)
    }

    fn store_tokens(&self, tokens: AuthTokens) -> Session {
        self.store.set(
            CredentialSlot::Primary,
            tokens.token,
            self.policy.lifetime(CredentialSlot::Primary),
        );
        self.store.set(
            CredentialSlot::Refresh,
            tokens.refresh_token,
            self.policy.lifetime(CredentialSlot::Refresh),
        );
        let session = Session::new(tokens.user);
        self.set_state(SessionState::Authenticated(session.clone()));
        session
    }

    fn set_state(&self, state: SessionState) {
        *self.state.write() = state;
    }
}
