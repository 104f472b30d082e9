use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use portalguard_identity::IdentityError;

/// Why a protected request was sent to the login page.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GatewayRejection {
    /// No credential in either carrier.
    #[error("credential missing")]
    CredentialMissing,

    /// Verification said no, or could not be completed.
    #[error("credential invalid")]
    CredentialInvalid,
}

impl GatewayRejection {
    /// An invalid credential must be purged so a fresh login can happen.
    pub fn purges_credentials(&self) -> bool {
        matches!(self, GatewayRejection::CredentialInvalid)
    }
}

/// The gateway could not even build a decision for the request.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("request origin could not be determined")]
    UnresolvableOrigin,

    #[error("login redirect could not be built: {0}")]
    LoginUrl(#[from] IdentityError),
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            GatewayError::UnresolvableOrigin => (StatusCode::BAD_REQUEST, "bad_request"),
            GatewayError::LoginUrl(_) => (StatusCode::INTERNAL_SERVER_ERROR, "gateway_error"),
        };
        json_error(status, code, self.to_string())
    }
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
