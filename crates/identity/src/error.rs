use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// Connection failure, timeout, or any transport-level error.
    #[error("identity service unavailable: {0}")]
    Unavailable(String),

    /// The service answered with a non-success status.
    #[error("identity service rejected the request (status {status})")]
    Rejected { status: u16 },

    /// The service answered 2xx with a body we could not decode.
    #[error("invalid identity service response: {0}")]
    InvalidResponse(String),

    #[error("invalid identity service url: {0}")]
    Url(String),
}

impl IdentityError {
    /// The upstream could not be reached (as opposed to saying "no").
    pub fn is_unavailable(&self) -> bool {
        matches!(self, IdentityError::Unavailable(_))
    }
}

impl From<reqwest::Error> for IdentityError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            IdentityError::InvalidResponse(err.to_string())
        } else if let Some(status) = err.status() {
            IdentityError::Rejected {
                status: status.as_u16(),
            }
        } else {
            IdentityError::Unavailable(err.to_string())
        }
    }
}
