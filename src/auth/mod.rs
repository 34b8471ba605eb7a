//! Identity boundary - resolves access tokens to authenticated owners.
//!
//! The web layer only sees the [`IdentityProvider`] trait. Two implementations
//! exist: [`HostedIdentityProvider`] for a GoTrue-compatible auth service, and
//! [`StaticIdentityProvider`] for a fixed token table from the config file.

/// Client for a hosted GoTrue-compatible auth service
pub mod hosted;
/// Token table provider for local development and tests
pub mod local;

pub use hosted::HostedIdentityProvider;
pub use local::StaticIdentityProvider;

use crate::{
    config::{AuthConfig, AuthProviderKind},
    errors::Result,
};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// An authenticated user. `id` is the owner id every record is scoped by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    /// Opaque owner id
    pub id: String,
    /// Email address, informational only
    pub email: String,
}

/// Resolves and ends sessions.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Returns the identity behind `access_token`, or `None` when the token is
    /// unknown, expired or revoked.
    async fn current_user(&self, access_token: &str) -> Result<Option<Identity>>;

    /// Ends the session behind `access_token`.
    async fn sign_out(&self, access_token: &str) -> Result<()>;
}

/// Builds the provider selected in `[auth]`.
pub fn build_provider(config: &AuthConfig) -> Result<Arc<dyn IdentityProvider>> {
    match config.provider {
        AuthProviderKind::Hosted => {
            let provider = HostedIdentityProvider::from_config(config)?;
            info!(url = provider.base_url(), "Using hosted identity provider");
            Ok(Arc::new(provider))
        }
        AuthProviderKind::Static => {
            info!(users = config.users.len(), "Using static identity provider");
            Ok(Arc::new(StaticIdentityProvider::from_config(config)))
        }
    }
}
