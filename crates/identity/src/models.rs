//! Payloads exchanged with the identity service.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use portalguard_auth::{Role, RoleAssignment};
use portalguard_core::{Credential, UserId};

use crate::IdentityError;

/// The authenticated user's identity snapshot.
///
/// `roles` / `role_assignments` are optional in the payload; when present
/// they feed privilege resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default)]
    pub role_assignments: Vec<RoleAssignment>,
}

impl UserProfile {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Credential pair plus user, returned by login and refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthTokens {
    pub token: Credential,
    pub refresh_token: Credential,
    pub user: UserProfile,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
}

/// Responses come either bare or wrapped in `{ "data": ... }`.
/// Returns whichever object carries `marker`.
fn unwrap_envelope(body: Value, marker: &str) -> Option<Value> {
    if body.get(marker).is_some() {
        return Some(body);
    }
    match body {
        Value::Object(mut map) => map
            .remove("data")
            .filter(|data| data.get(marker).is_some()),
        _ => None,
    }
}

pub(crate) fn profile_from_body(body: Value) -> Result<UserProfile, IdentityError> {
    let mut payload = unwrap_envelope(body, "user")
        .ok_or_else(|| IdentityError::InvalidResponse("response has no user".to_string()))?;
    let user = payload
        .get_mut("user")
        .map(Value::take)
        .unwrap_or(Value::Null);
    serde_json::from_value(user).map_err(|e| IdentityError::InvalidResponse(e.to_string()))
}

pub(crate) fn tokens_from_body(body: Value) -> Result<AuthTokens, IdentityError> {
    let payload = unwrap_envelope(body, "token")
        .ok_or_else(|| IdentityError::InvalidResponse("response has no token".to_string()))?;
    // Blank credentials fail `Credential`'s own deserialization.
    serde_json::from_value(payload).map_err(|e| IdentityError::InvalidResponse(e.to_string()))
}
