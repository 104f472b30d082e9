//! `portalguard-core` — shared building blocks for the portal edge.
//!
//! This crate has no IO: identifiers, the opaque credential value object,
//! the credential slot (cookie) policy, a clock abstraction and configuration
//! helpers used by every other crate.

pub mod clock;
pub mod config;
pub mod credential;
pub mod error;
pub mod id;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{Lookup, env, parse_bool, parse_list};
pub use credential::{Credential, CredentialPolicy, CredentialSlot, SameSite};
pub use error::{BlankCredentialError, ConfigError, InvalidIdError};
pub use id::{AssignmentId, RoleId, UserId};
