//! Public / protected route classification.

use serde::{Deserialize, Serialize};

const STATIC_PREFIXES: &[&str] = &["/_next/static/", "/_next/image", "/static/", "/assets/"];

const STATIC_FILES: &[&str] = &["/favicon.ico", "/robots.txt", "/sitemap.xml", "/manifest.json"];

const STATIC_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "svg", "webp", "avif", "ico", "woff", "woff2", "ttf", "otf",
    "eot", "js", "mjs", "css", "map",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteClass {
    Public,
    Protected,
}

fn default_public_prefixes() -> Vec<String> {
    vec!["/health".to_string(), "/api/health".to_string()]
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteConfig {
    /// Static bundles (images, fonts, scripts) bypass the gateway.
    #[serde(default = "default_true")]
    pub exclude_static_assets: bool,
    /// Prefixes that never require a credential.
    #[serde(default = "default_public_prefixes")]
    pub public_prefixes: Vec<String>,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            exclude_static_assets: true,
            public_prefixes: default_public_prefixes(),
        }
    }
}

/// Pure path → [`RouteClass`] mapping for a fixed configuration.
#[derive(Debug, Clone)]
pub struct RouteClassifier {
    exclude_static_assets: bool,
    public_prefixes: Vec<String>,
}

impl RouteClassifier {
    pub fn new(config: &RouteConfig) -> Self {
        let public_prefixes = config
            .public_prefixes
            .iter()
            .map(|p| normalize_prefix(p))
            .collect();
        Self {
            exclude_static_assets: config.exclude_static_assets,
            public_prefixes,
        }
    }

    pub fn classify(&self, path: &str) -> RouteClass {
        if self.exclude_static_assets && is_static_asset(path) {
            return RouteClass::Public;
        }
        if self
            .public_prefixes
            .iter()
            .any(|prefix| matches_prefix(path, prefix))
        {
            return RouteClass::Public;
        }
        RouteClass::Protected
    }
}

/// Leading slash, no trailing slash ("/" becomes "").
fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_end_matches('/');
    if trimmed.is_empty() || trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

/// Prefix match on segment boundaries: `/health` covers `/health/live`
/// but not `/healthz`.
fn matches_prefix(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

fn is_static_asset(path: &str) -> bool {
    if STATIC_FILES.contains(&path) {
        return true;
    }
    if STATIC_PREFIXES.iter().any(|p| path.starts_with(p)) {
        return true;
    }
    let last_segment = path.rsplit('/').next().unwrap_or(path);
    match last_segment.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => STATIC_EXTENSIONS
            .iter()
            .any(|known| known.eq_ignore_ascii_case(ext)),
        _ => false,
    }
}
