//! `portalguard-gateway` — the edge authentication gateway.
//!
//! Every inbound request is classified as public or protected; protected
//! requests must carry a credential (cookie slot or URL parameter) that the
//! identity service vouches for. Verification outcomes are cached for a short
//! window so the identity service is not hit on every navigation.

pub mod app;
pub mod cache;
pub mod config;
pub mod context;
pub mod cookies;
pub mod error;
pub mod gateway;
pub mod middleware;
pub mod routes;

pub use cache::{CacheConfig, CacheEntry, EvictionPolicy, InMemoryVerificationCache, VerificationCache};
pub use config::GatewayConfig;
pub use context::GatewayContext;
pub use error::{GatewayError, GatewayRejection};
pub use gateway::{CredentialSource, Gateway, GatewayDecision};
pub use routes::{RouteClass, RouteClassifier, RouteConfig};
