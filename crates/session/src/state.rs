use serde::Serialize;

use portalguard_core::UserId;
use portalguard_identity::UserProfile;

/// The authenticated user's identity snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Session {
    profile: UserProfile,
}

impl Session {
    pub fn new(profile: UserProfile) -> Self {
        Self { profile }
    }

    pub fn user_id(&self) -> UserId {
        self.profile.id
    }

    pub fn email(&self) -> &str {
        &self.profile.email
    }

    pub fn display_name(&self) -> String {
        self.profile.full_name()
    }

    pub fn role(&self) -> &str {
        &self.profile.role
    }

    pub fn avatar_url(&self) -> Option<&str> {
        self.profile.avatar_url.as_deref()
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Initialization has not finished.
    #[default]
    Loading,
    Unauthenticated,
    Authenticated(Session),
}

impl SessionState {
    pub fn session(&self) -> Option<&Session> {
        match self {
            SessionState::Authenticated(session) => Some(session),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, SessionState::Loading)
    }
}
