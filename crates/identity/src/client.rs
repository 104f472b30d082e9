use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use portalguard_core::Credential;

use crate::models::{LoginRequest, RefreshRequest, profile_from_body, tokens_from_body};
use crate::{AuthTokens, IdentityConfig, IdentityError, UserProfile};

const VERIFY_PATH: &str = "/api/auth/verify";
const PROFILE_PATH: &str = "/api/auth/profile";
const LOGIN_PATH: &str = "/api/auth/login";
const REFRESH_PATH: &str = "/api/auth/refresh";

/// The identity service operations the portal edge depends on.
#[async_trait]
pub trait IdentityApi: Send + Sync {
    /// `Ok(())` iff the service answered 2xx for this credential.
    async fn verify(&self, credential: &Credential) -> Result<(), IdentityError>;

    async fn profile(&self, credential: &Credential) -> Result<UserProfile, IdentityError>;

    async fn login(&self, email: &str, password: &str) -> Result<AuthTokens, IdentityError>;

    async fn refresh(&self, refresh_credential: &Credential) -> Result<AuthTokens, IdentityError>;
}

/// HTTP implementation of [`IdentityApi`].
#[derive(Debug, Clone)]
pub struct IdentityClient {
    http: reqwest::Client,
    config: IdentityConfig,
}

impl IdentityClient {
    pub fn new(config: IdentityConfig) -> Result<Self, IdentityError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &IdentityConfig {
        &self.config
    }

    async fn json_body(response: reqwest::Response) -> Result<Value, IdentityError> {
        let status = response.status();
        if !status.is_success() {
            return Err(IdentityError::Rejected {
                status: status.as_u16(),
            });
        }
        response
            .json::<Value>()
            .await
            .map_err(|e| IdentityError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl IdentityApi for IdentityClient {
    async fn verify(&self, credential: &Credential) -> Result<(), IdentityError> {
        let url = self.config.endpoint(VERIFY_PATH)?;
        let response = self
            .http
            .post(url)
            .bearer_auth(credential.as_str())
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            tracing::debug!(status = status.as_u16(), "credential verification rejected");
            Err(IdentityError::Rejected {
                status: status.as_u16(),
            })
        }
    }

    async fn profile(&self, credential: &Credential) -> Result<UserProfile, IdentityError> {
        let url = self.config.endpoint(PROFILE_PATH)?;
        let response = self
            .http
            .get(url)
            .bearer_auth(credential.as_str())
            .send()
            .await?;
        profile_from_body(Self::json_body(response).await?)
    }

    async fn login(&self, email: &str, password: &str) -> Result<AuthTokens, IdentityError> {
        let url = self.config.endpoint(LOGIN_PATH)?;
        let response = self
            .http
            .post(url)
            .json(&LoginRequest { email, password })
            .send()
            .await?;
        tokens_from_body(Self::json_body(response).await?)
    }

    async fn refresh(&self, refresh_credential: &Credential) -> Result<AuthTokens, IdentityError> {
        let url = self.config.endpoint(REFRESH_PATH)?;
        let response = self
            .http
            .post(url)
            .json(&RefreshRequest {
                refresh_token: refresh_credential.as_str(),
            })
            .send()
            .await?;
        tokens_from_body(Self::json_body(response).await?)
    }
}
