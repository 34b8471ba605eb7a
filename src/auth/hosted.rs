//! GoTrue-compatible hosted auth client.
//!
//! `GET {url}/auth/v1/user` resolves a token; `POST {url}/auth/v1/logout` revokes
//! it. Both calls carry the project's `apikey` header and the user's bearer token.

use super::{Identity, IdentityProvider};
use crate::{
    config::AuthConfig,
    errors::{Error, Result},
};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Request timeout when `auth.timeout_secs` is not set.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct UserResponse {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

/// Identity provider backed by a hosted auth service.
pub struct HostedIdentityProvider {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HostedIdentityProvider {
    /// Creates a client for the service at `base_url`.
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        if base_url.is_empty() {
            return Err(Error::Config {
                message: "Hosted auth URL not configured".to_string(),
            });
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Creates a client from the `[auth]` table.
    pub fn from_config(config: &AuthConfig) -> Result<Self> {
        let url = config
            .url
            .as_deref()
            .filter(|url| !url.is_empty())
            .ok_or_else(|| Error::Config {
                message: "auth.url is required for the hosted provider".to_string(),
            })?;
        let api_key = config.api_key.as_deref().ok_or_else(|| Error::Config {
            message: "auth.api_key is required for the hosted provider".to_string(),
        })?;
        let timeout = config
            .timeout_secs
            .map_or(DEFAULT_TIMEOUT, Duration::from_secs);

        Self::new(url, api_key, timeout)
    }

    /// Service base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1/{path}", self.base_url)
    }
}

#[async_trait]
impl IdentityProvider for HostedIdentityProvider {
    async fn current_user(&self, access_token: &str) -> Result<Option<Identity>> {
        if access_token.is_empty() {
            return Ok(None);
        }

        let response = self
            .client
            .get(self.endpoint("user"))
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {
                let user: UserResponse = response.json().await?;
                debug!(user_id = %user.id, "Resolved identity");
                Ok(Some(Identity {
                    id: user.id,
                    email: user.email.unwrap_or_default(),
                }))
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(None),
            status => {
                warn!(%status, "Unexpected status from auth service");
                Err(Error::Identity {
                    message: format!("Auth service returned {status}"),
                })
            }
        }
    }

    async fn sign_out(&self, access_token: &str) -> Result<()> {
        let response = self
            .client
            .post(self.endpoint("logout"))
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = response.status();
        // An already-invalid token is as signed out as it gets
        if status.is_success() || status == StatusCode::UNAUTHORIZED {
            Ok(())
        } else {
            Err(Error::Identity {
                message: format!("Sign-out failed with {status}"),
            })
        }
    }
}
