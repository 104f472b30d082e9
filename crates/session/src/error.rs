use thiserror::Error;

use portalguard_identity::IdentityError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("no credential stored")]
    NoCredential,

    #[error("no refresh credential stored")]
    NoRefreshCredential,

    #[error("profile fetch failed: {0}")]
    ProfileFetchFailed(#[source] IdentityError),

    #[error(transparent)]
    Identity(#[from] IdentityError),
}
