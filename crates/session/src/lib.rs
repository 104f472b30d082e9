//! `portalguard-session` — the portal's view of "who is logged in".
//!
//! The holder reads credentials from a [`CredentialStore`], asks the identity
//! service for the matching profile, and exposes login / logout / refresh.
//! It never purges credentials on a failed profile fetch; the gateway owns
//! that decision.

pub mod error;
pub mod holder;
pub mod state;
pub mod store;

pub use error::SessionError;
pub use holder::SessionHolder;
pub use state::{Session, SessionState};
pub use store::{CredentialStore, InMemoryCredentialStore};
