//! Configuration for embedding applications.
//!
//! The core itself reads no environment variables and takes no flags; the
//! application that hosts it loads a TOML file and hands the values in.

use serde::Deserialize;
use std::path::Path;

use crate::store::CredentialStore;
use crate::{PassgateError, Result};

/// Credential store configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Path to the JSON credential file.
    #[serde(default = "default_store_path")]
    pub path: String,
    /// Username of the well-known administrator account.
    #[serde(default = "default_admin_username")]
    pub admin_username: String,
}

fn default_store_path() -> String {
    "users.json".to_string()
}

fn default_admin_username() -> String {
    "admin".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
            admin_username: default_admin_username(),
        }
    }
}

/// Login governance configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Consecutive failed attempts tolerated before session lockout.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

fn default_max_attempts() -> u32 {
    crate::auth::MAX_LOGIN_ATTEMPTS
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Optional log file; console-only when unset.
    #[serde(default)]
    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Credential store settings.
    #[serde(default)]
    pub store: StoreConfig,
    /// Login governance settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(PassgateError::Io)?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)
            .map_err(|e| PassgateError::Config(format!("config parse error: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.store.path.trim().is_empty() {
            return Err(PassgateError::Config("store.path cannot be empty".to_string()));
        }
        if self.store.admin_username.trim().is_empty() {
            return Err(PassgateError::Config(
                "store.admin_username cannot be empty".to_string(),
            ));
        }
        if self.auth.max_attempts == 0 {
            return Err(PassgateError::Config(
                "auth.max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Build the credential store described by this configuration.
    pub fn credential_store(&self) -> CredentialStore {
        CredentialStore::new(&self.store.path, &self.store.admin_username)
    }
}
