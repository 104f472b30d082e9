//! `portalguard-identity` — client for the central identity service.
//!
//! Only the contract the portal edge depends on is modelled: credential
//! verification, profile lookup, login, credential refresh and the
//! full-page login/logout redirect targets.

pub mod client;
pub mod config;
pub mod error;
pub mod models;

pub use client::{IdentityApi, IdentityClient};
pub use config::IdentityConfig;
pub use error::IdentityError;
pub use models::{AuthTokens, UserProfile};
