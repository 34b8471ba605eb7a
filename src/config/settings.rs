//! Application settings loading from config.toml
//!
//! Settings come from three layers, later layers winning:
//! built-in defaults, the TOML file named by `POCKET_LEDGER_CONFIG`
//! (default `./config.toml`, optional), and individual environment variables
//! (`BIND_ADDRESS`, `DATABASE_URL`, `AUTH_URL`, `AUTH_API_KEY`).

use crate::config::database::DEFAULT_DATABASE_URL;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Environment variable naming the config file.
pub const CONFIG_PATH_VAR: &str = "POCKET_LEDGER_CONFIG";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP server settings
    pub server: ServerConfig,
    /// Store connection settings
    pub database: DatabaseConfig,
    /// Identity provider settings
    pub auth: AuthConfig,
}

/// `[server]` table
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to listen on
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
        }
    }
}

/// `[database]` table
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SeaORM` connection URL
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_DATABASE_URL.to_string(),
        }
    }
}

/// Which identity provider implementation to build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthProviderKind {
    /// GoTrue-compatible hosted auth service
    Hosted,
    /// Fixed token table from `[[auth.users]]`
    #[default]
    Static,
}

/// `[auth]` table
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Provider implementation
    pub provider: AuthProviderKind,
    /// Base URL of the hosted auth service
    pub url: Option<String>,
    /// Public API key sent as the `apikey` header
    pub api_key: Option<String>,
    /// Request timeout for the hosted provider, in seconds
    pub timeout_secs: Option<u64>,
    /// Token table for the static provider
    pub users: Vec<StaticUser>,
}

/// One `[[auth.users]]` entry
#[derive(Debug, Clone, Deserialize)]
pub struct StaticUser {
    /// Access token presented by the client
    pub token: String,
    /// Owner id the token resolves to
    pub id: String,
    /// Email address of the user
    pub email: String,
}

impl AppConfig {
    /// Overlays environment variables on top of file settings.
    ///
    /// `lookup` is `std::env::var` in production and a map in tests.
    #[must_use]
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bind) = lookup("BIND_ADDRESS") {
            self.server.bind = bind;
        }
        if let Some(url) = lookup("DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(url) = lookup("AUTH_URL") {
            self.auth.url = Some(url);
            self.auth.provider = AuthProviderKind::Hosted;
        }
        if let Some(key) = lookup("AUTH_API_KEY") {
            self.auth.api_key = Some(key);
        }
        self
    }

    /// Checks cross-field constraints the TOML schema cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.auth.provider == AuthProviderKind::Hosted {
            if self.auth.url.as_deref().is_none_or(str::is_empty) {
                return Err(Error::Config {
                    message: "auth.url is required for the hosted provider".to_string(),
                });
            }
            if self.auth.api_key.as_deref().is_none_or(str::is_empty) {
                return Err(Error::Config {
                    message: "auth.api_key is required for the hosted provider".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Parses settings from TOML text.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads settings from a TOML file; a missing file yields the defaults.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path = path.as_ref();
    if !path.exists() {
        info!(path = %path.display(), "No config file found, using defaults");
        return Ok(AppConfig::default());
    }

    debug!(path = %path.display(), "Loading configuration");
    let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path.display()),
    })?;
    parse_config(&contents)
}

/// Loads the full application configuration: file, then environment overrides.
pub fn load_app_configuration() -> Result<AppConfig> {
    let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| "config.toml".to_string());
    let config = load_config(&path)?.with_env_overrides(|key| std::env::var(key).ok());
    config.validate()?;
    Ok(config)
}
