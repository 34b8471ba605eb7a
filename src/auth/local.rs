//! Static token table - every configured token maps to one identity.

use super::{Identity, IdentityProvider};
use crate::{config::AuthConfig, errors::Result};
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::debug;

/// Identity provider backed by `[[auth.users]]`.
///
/// Sign-out is a no-op: tokens are configuration, not sessions.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentityProvider {
    tokens: HashMap<String, Identity>,
}

impl StaticIdentityProvider {
    /// Creates a provider from `(token, identity)` pairs.
    pub fn new<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, Identity)>,
    {
        Self {
            tokens: entries.into_iter().collect(),
        }
    }

    /// Creates a provider from the `[auth]` table's user list.
    #[must_use]
    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(config.users.iter().map(|user| {
            (
                user.token.clone(),
                Identity {
                    id: user.id.clone(),
                    email: user.email.clone(),
                },
            )
        }))
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn current_user(&self, access_token: &str) -> Result<Option<Identity>> {
        let identity = self.tokens.get(access_token).cloned();
        debug!(resolved = identity.is_some(), "Static token lookup");
        Ok(identity)
    }

    async fn sign_out(&self, _access_token: &str) -> Result<()> {
        Ok(())
    }
}
