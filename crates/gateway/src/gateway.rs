//! Per-request gateway state machine.
//!
//! ```text
//! classify(path)
//!   Public    -> Pass
//!   Protected -> credential = cookie slot OR url parameter
//!     absent            -> Login (CredentialMissing)
//!     verify() == false -> Login (CredentialInvalid, purge both slots)
//!     from url          -> Promote (persist, redirect to the clean url)
//!     from cookie       -> Pass
//! ```

use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderMap, Uri, header::HOST};
use url::{Url, form_urlencoded};

use portalguard_core::{Clock, Credential, CredentialSlot};
use portalguard_identity::IdentityApi;

use crate::cache::{CacheEntry, VerificationCache};
use crate::{GatewayConfig, GatewayContext, GatewayError, GatewayRejection, RouteClass, RouteClassifier, cookies};

const FORWARDED_HOST: &str = "x-forwarded-host";
const FORWARDED_PROTO: &str = "x-forwarded-proto";

/// Where the request's credential was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Cookie,
    Url,
}

/// What to do with one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayDecision {
    /// Let the request through to application content.
    Pass(GatewayContext),
    /// Send the user to the identity service login page.
    Login {
        location: Url,
        rejection: GatewayRejection,
    },
    /// Persist the URL-borne credential and reload the URL without it.
    Promote { credential: Credential, location: Url },
}

impl GatewayDecision {
    pub fn purges_credentials(&self) -> bool {
        matches!(self, GatewayDecision::Login { rejection, .. } if rejection.purges_credentials())
    }
}

/// The edge gateway. Cheap to share behind an `Arc`; holds no per-request state.
pub struct Gateway {
    config: GatewayConfig,
    classifier: RouteClassifier,
    cache: Arc<dyn VerificationCache>,
    identity: Arc<dyn IdentityApi>,
    clock: Arc<dyn Clock>,
}

impl Gateway {
    pub fn new(
        config: GatewayConfig,
        cache: Arc<dyn VerificationCache>,
        identity: Arc<dyn IdentityApi>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let classifier = RouteClassifier::new(&config.routes);
        Self {
            config,
            classifier,
            cache,
            identity,
            clock,
        }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn classify(&self, path: &str) -> RouteClass {
        self.classifier.classify(path)
    }

    /// Decide the fate of one request.
    pub async fn evaluate(&self, uri: &Uri, headers: &HeaderMap) -> Result<GatewayDecision, GatewayError> {
        if self.classify(uri.path()) == RouteClass::Public {
            return Ok(GatewayDecision::Pass(GatewayContext::public()));
        }

        let original = self.original_url(uri, headers)?;

        let found = cookies::read_slot(headers, &self.config.credentials, CredentialSlot::Primary)
            .map(|c| (c, CredentialSource::Cookie))
            .or_else(|| {
                url_credential(&original, &self.config.token_param).map(|c| (c, CredentialSource::Url))
            });

        let Some((credential, source)) = found else {
            tracing::info!(path = uri.path(), "no credential; redirecting to login");
            return self.login(&original, GatewayRejection::CredentialMissing);
        };

        if !self.verify(&credential).await {
            tracing::info!(
                path = uri.path(),
                credential = %credential.fingerprint(),
                "credential rejected; purging and redirecting to login"
            );
            // A rejected URL credential must not travel on inside returnUrl.
            let return_to = match source {
                CredentialSource::Url => strip_query_param(&original, &self.config.token_param),
                CredentialSource::Cookie => original,
            };
            return self.login(&return_to, GatewayRejection::CredentialInvalid);
        }

        match source {
            CredentialSource::Url => {
                tracing::info!(path = uri.path(), "promoting url credential to cookie");
                let location = strip_query_param(&original, &self.config.token_param);
                Ok(GatewayDecision::Promote { credential, location })
            }
            CredentialSource::Cookie => {
                tracing::debug!(path = uri.path(), "credential verified");
                Ok(GatewayDecision::Pass(GatewayContext::verified(credential)))
            }
        }
    }

    /// Cached verification. A fresh cache entry answers without a network call;
    /// otherwise the identity service is asked and its answer (including a
    /// failure) is cached for the configured window.
    pub async fn verify(&self, credential: &Credential) -> bool {
        let now = self.clock.now().timestamp_millis();

        if let Some(entry) = self.cache.get(credential.as_str()).await {
            if entry.is_fresh_at(now) {
                tracing::debug!(credential = %credential.fingerprint(), valid = entry.valid, "verification cache hit");
                return entry.valid;
            }
        }

        let timeout = Duration::from_millis(self.config.verify_timeout_ms);
        let valid = match tokio::time::timeout(timeout, self.identity.verify(credential)).await {
            Ok(Ok(())) => true,
            Ok(Err(err)) if err.is_unavailable() => {
                tracing::warn!(error = %err, "identity service unavailable; failing closed");
                false
            }
            Ok(Err(err)) => {
                tracing::debug!(error = %err, "credential verification failed");
                false
            }
            Err(_) => {
                tracing::warn!(timeout_ms = self.config.verify_timeout_ms, "credential verification timed out; failing closed");
                false
            }
        };

        let ttl_millis = i64::try_from(self.config.cache.ttl_secs.saturating_mul(1_000)).unwrap_or(i64::MAX);
        let expires_at = now.saturating_add(ttl_millis);
        self.cache
            .put(credential.as_str(), CacheEntry::new(valid, expires_at))
            .await;
        valid
    }

    fn login(&self, original: &Url, rejection: GatewayRejection) -> Result<GatewayDecision, GatewayError> {
        let location = self.config.identity.login_url(original.as_str())?;
        Ok(GatewayDecision::Login { location, rejection })
    }

    /// Absolute URL the client asked for.
    fn original_url(&self, uri: &Uri, headers: &HeaderMap) -> Result<Url, GatewayError> {
        let mut url = match &self.config.public_origin {
            Some(origin) => origin.clone(),
            None => origin_from_headers(headers)
                .or_else(|| origin_from_uri(uri))
                .ok_or(GatewayError::UnresolvableOrigin)?,
        };
        // set_path keeps the origin even for paths like "//other.host".
        url.set_path(uri.path());
        url.set_query(uri.query());
        url.set_fragment(None);
        Ok(url)
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: impl axum::http::header::AsHeaderName) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn origin_from_headers(headers: &HeaderMap) -> Option<Url> {
    let host = header_str(headers, FORWARDED_HOST).or_else(|| header_str(headers, HOST))?;
    let scheme = match header_str(headers, FORWARDED_PROTO) {
        Some(proto) if proto.eq_ignore_ascii_case("https") => "https",
        _ => "http",
    };
    origin(scheme, host)
}

/// HTTP/2 `:authority` and HTTP/1.1 absolute-form targets carry the origin
/// in the request URI itself.
fn origin_from_uri(uri: &Uri) -> Option<Url> {
    let authority = uri.authority()?;
    let scheme = match uri.scheme_str() {
        Some(scheme) if scheme.eq_ignore_ascii_case("https") => "https",
        _ => "http",
    };
    origin(scheme, authority.as_str())
}

fn origin(scheme: &str, host: &str) -> Option<Url> {
    let url = Url::parse(&format!("{scheme}://{host}/")).ok()?;
    // A host smuggling a path or credentials is not an origin.
    if url.path() != "/" || !url.username().is_empty() || url.password().is_some() {
        return None;
    }
    Some(url)
}

fn url_credential(url: &Url, param: &str) -> Option<Credential> {
    url.query_pairs()
        .find(|(key, _)| key == param)
        .and_then(|(_, value)| Credential::parse(value.into_owned()))
}

/// `url` without any `param` pair. Every other segment of the query is kept
/// byte for byte and in order.
fn strip_query_param(url: &Url, param: &str) -> Url {
    let kept: Vec<&str> = url
        .query()
        .unwrap_or_default()
        .split('&')
        .filter(|segment| !segment.is_empty() && !segment_has_key(segment, param))
        .collect();

    let mut clean = url.clone();
    if kept.is_empty() {
        clean.set_query(None);
    } else {
        clean.set_query(Some(&kept.join("&")));
    }
    clean
}

fn segment_has_key(segment: &str, param: &str) -> bool {
    form_urlencoded::parse(segment.as_bytes())
        .next()
        .is_some_and(|(key, _)| key == param)
}
