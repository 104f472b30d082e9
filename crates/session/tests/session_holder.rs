use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use parking_lot::Mutex;
use url::Url;

use portalguard_auth::{Permission, PrivilegeLevel, Role, RoleAssignment};
use portalguard_core::{AssignmentId, Credential, CredentialPolicy, CredentialSlot, ManualClock, RoleId, UserId};
use portalguard_identity::{AuthTokens, IdentityApi, IdentityConfig, IdentityError, UserProfile};
use portalguard_session::{CredentialStore, InMemoryCredentialStore, SessionError, SessionHolder, SessionState};

fn profile() -> UserProfile {
    UserProfile {
        id: UserId::new(),
        email: "ada@example.com".into(),
        first_name: "Ada".into(),
        last_name: "Lovelace".into(),
        role: "admin".into(),
        avatar_url: None,
        roles: Vec::new(),
        role_assignments: Vec::new(),
    }
}

fn credential(s: &str) -> Credential {
    Credential::parse(s).unwrap()
}

#[derive(Default)]
struct FakeIdentity {
    profile: Mutex<Option<UserProfile>>,
    profile_calls: AtomicUsize,
    accept_login: bool,
    accept_refresh: bool,
}

#[async_trait]
impl IdentityApi for FakeIdentity {
    async fn verify(&self, _credential: &Credential) -> Result<(), IdentityError> {
        Ok(())
    }

    async fn profile(&self, _credential: &Credential) -> Result<UserProfile, IdentityError> {
        self.profile_calls.fetch_add(1, Ordering::SeqCst);
        self.profile
            .lock()
            .clone()
            .ok_or_else(|| IdentityError::Unavailable("connection refused".into()))
    }

    async fn login(&self, _email: &str, _password: &str) -> Result<AuthTokens, IdentityError> {
        if !self.accept_login {
            return Err(IdentityError::Rejected { status: 401 });
        }
        Ok(AuthTokens {
            token: credential("primary-1"),
            refresh_token: credential("refresh-1"),
            user: profile(),
        })
    }

    async fn refresh(&self, refresh: &Credential) -> Result<AuthTokens, IdentityError> {
        if !self.accept_refresh || refresh.as_str() != "refresh-1" {
            return Err(IdentityError::Rejected { status: 401 });
        }
        Ok(AuthTokens {
            token: credential("primary-2"),
            refresh_token: credential("refresh-2"),
            user: profile(),
        })
    }
}

struct Fixture {
    holder: SessionHolder,
    store: Arc<InMemoryCredentialStore>,
    clock: Arc<ManualClock>,
    identity: Arc<FakeIdentity>,
}

fn fixture(identity: FakeIdentity) -> Fixture {
    let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()));
    let store = Arc::new(InMemoryCredentialStore::new(clock.clone()));
    let identity = Arc::new(identity);
    let holder = SessionHolder::new(
        identity.clone(),
        IdentityConfig::new(Url::parse("https://id.example.com/").unwrap()),
        store.clone(),
        CredentialPolicy::default(),
    );
    Fixture {
        holder,
        store,
        clock,
        identity,
    }
}

#[tokio::test]
async fn starts_loading_and_resolves_unauthenticated_without_credential() {
    let f = fixture(FakeIdentity::default());
    assert!(f.holder.state().is_loading());

    assert_eq!(f.holder.initialize().await, SessionState::Unauthenticated);
    assert_eq!(f.identity.profile_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn initialize_loads_profile_for_stored_credential() {
    let identity = FakeIdentity::default();
    *identity.profile.lock() = Some(profile());
    let f = fixture(identity);
    f.store.set(CredentialSlot::Primary, credential("stored"), Duration::days(1));

    let state = f.holder.initialize().await;
    let session = state.session().expect("authenticated");
    assert_eq!(session.email(), "ada@example.com");
    assert_eq!(session.display_name(), "Ada Lovelace");
    assert!(f.holder.is_authenticated());
}

#[tokio::test]
async fn failed_profile_fetch_keeps_the_credential() {
    let f = fixture(FakeIdentity::default());
    f.store.set(CredentialSlot::Primary, credential("stored"), Duration::days(1));

    assert_eq!(f.holder.initialize().await, SessionState::Unauthenticated);
    assert_eq!(f.store.get(CredentialSlot::Primary).unwrap().as_str(), "stored");
}

#[tokio::test]
async fn login_stores_both_slots_with_their_lifetimes() {
    let f = fixture(FakeIdentity {
        accept_login: true,
        ..Default::default()
    });

    let session = f.holder.login("ada@example.com", "pw").await.unwrap();
    assert_eq!(session.role(), "admin");
    assert_eq!(f.holder.credential().unwrap().as_str(), "primary-1");

    f.clock.advance(Duration::days(1));
    assert!(f.store.get(CredentialSlot::Primary).is_none());
    assert_eq!(f.store.get(CredentialSlot::Refresh).unwrap().as_str(), "refresh-1");

    f.clock.advance(Duration::days(6));
    assert!(f.store.get(CredentialSlot::Refresh).is_none());
}

#[tokio::test]
async fn rejected_login_changes_nothing() {
    let f = fixture(FakeIdentity::default());
    f.holder.initialize().await;

    let err = f.holder.login("ada@example.com", "wrong").await.unwrap_err();
    assert_eq!(err, SessionError::Identity(IdentityError::Rejected { status: 401 }));
    assert!(!f.holder.is_authenticated());
    assert!(f.holder.credential().is_none());
}

#[tokio::test]
async fn logout_clears_both_slots_and_points_at_logout_page() {
    let f = fixture(FakeIdentity {
        accept_login: true,
        ..Default::default()
    });
    f.holder.login("ada@example.com", "pw").await.unwrap();

    let url = f.holder.logout(Some("https://portal.example.com/")).unwrap();
    assert_eq!(url.path(), "/logout");
    assert_eq!(
        url.query(),
        Some("returnUrl=https%3A%2F%2Fportal.example.com%2F")
    );
    assert!(f.store.get(CredentialSlot::Primary).is_none());
    assert!(f.store.get(CredentialSlot::Refresh).is_none());
    assert_eq!(f.holder.state(), SessionState::Unauthenticated);
}

#[tokio::test]
async fn refresh_token_replaces_the_pair() {
    let f = fixture(FakeIdentity {
        accept_login: true,
        accept_refresh: true,
        ..Default::default()
    });
    f.holder.login("ada@example.com", "pw").await.unwrap();

    f.holder.refresh_token().await.unwrap();
    assert_eq!(f.store.get(CredentialSlot::Primary).unwrap().as_str(), "primary-2");
    assert_eq!(f.store.get(CredentialSlot::Refresh).unwrap().as_str(), "refresh-2");
}

#[tokio::test]
async fn failed_refresh_leaves_credentials_alone() {
    let f = fixture(FakeIdentity {
        accept_login: true,
        ..Default::default()
    });
    f.holder.login("ada@example.com", "pw").await.unwrap();

    assert!(f.holder.refresh_token().await.is_err());
    assert_eq!(f.store.get(CredentialSlot::Primary).unwrap().as_str(), "primary-1");
    assert_eq!(f.store.get(CredentialSlot::Refresh).unwrap().as_str(), "refresh-1");
}

#[tokio::test]
async fn refresh_requires_stored_credentials() {
    let f = fixture(FakeIdentity::default());
    assert_eq!(f.holder.refresh_token().await.unwrap_err(), SessionError::NoRefreshCredential);
    assert_eq!(f.holder.refresh_profile().await.unwrap_err(), SessionError::NoCredential);
}

#[tokio::test]
async fn refresh_profile_does_not_touch_credentials() {
    let identity = FakeIdentity::default();
    *identity.profile.lock() = Some(profile());
    let f = fixture(identity);
    f.store.set(CredentialSlot::Primary, credential("stored"), Duration::days(1));

    let mut updated = profile();
    updated.first_name = "Augusta".into();
    *f.identity.profile.lock() = Some(updated);

    let session = f.holder.refresh_profile().await.unwrap();
    assert_eq!(session.display_name(), "Augusta Lovelace");
    assert_eq!(f.holder.credential().unwrap().as_str(), "stored");

    *f.identity.profile.lock() = None;
    assert!(matches!(
        f.holder.refresh_profile().await,
        Err(SessionError::ProfileFetchFailed(_))
    ));
    assert_eq!(f.holder.credential().unwrap().as_str(), "stored");
}

#[tokio::test]
async fn privileges_come_from_profile_roles() {
    let now = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
    let mut user = profile();
    let role = Role {
        id: RoleId::new(),
        role_name: "org_admin".into(),
        display_name: "Organization Admin".into(),
        privilege_level: PrivilegeLevel::new(20),
        permissions: BTreeSet::from([Permission::new("users.read")]),
        modules: BTreeSet::new(),
        is_active: true,
    };
    user.role_assignments = vec![RoleAssignment {
        id: AssignmentId::new(),
        user_id: user.id,
        platform_role_id: role.id,
        is_active: true,
        expires_at: None,
    }];
    user.roles = vec![role];

    let identity = FakeIdentity::default();
    *identity.profile.lock() = Some(user);
    let f = fixture(identity);

    assert!(f.holder.privileges(now).is_empty());

    f.store.set(CredentialSlot::Primary, credential("stored"), Duration::days(1));
    f.holder.initialize().await;

    let privileges = f.holder.privileges(now);
    assert_eq!(privileges.highest_privilege_level, Some(PrivilegeLevel::new(20)));
    assert_eq!(privileges.primary_role_display_name(), "Organization Admin");
    assert!(portalguard_auth::has_permission(&privileges, "users.read"));
}
