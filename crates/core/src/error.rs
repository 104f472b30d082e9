//! Error types shared across the workspace.

use thiserror::Error;

/// Configuration could not be loaded.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A value was present but could not be parsed.
    #[error("invalid value for {key}: {message}")]
    Invalid { key: String, message: String },

    /// A value was expected to be an absolute URL.
    #[error("invalid url for {key}: {source}")]
    InvalidUrl {
        key: String,
        #[source]
        source: url::ParseError,
    },
}

impl ConfigError {
    pub fn invalid(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            key: key.into(),
            message: message.into(),
        }
    }
}

/// An identifier failed to parse.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid {kind}: {message}")]
pub struct InvalidIdError {
    pub kind: &'static str,
    pub message: String,
}

/// A credential was empty or only whitespace.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("credential must not be blank")]
pub struct BlankCredentialError;
