//! Configuration types.

use std::net::SocketAddr;
use std::path::PathBuf;

use secrecy::SecretString;
use tracing::warn;

use crate::error::ConfigError;

/// Default store file, relative to the working directory.
pub const DEFAULT_DB_PATH: &str = "db.json";

/// Development-only signing key for flash cookies.
pub const DEFAULT_SECRET_KEY: &str = "dev-secret-key";

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5000";

/// Application configuration.
#[derive(Debug)]
pub struct AppConfig {
    /// Path of the JSON document store.
    pub db_path: PathBuf,
    /// Key used to sign the status message cookie.
    pub secret_key: SecretString,
    /// Address the HTTP server listens on.
    pub bind_addr: SocketAddr,
}

impl AppConfig {
    /// Config with development defaults and the given store path.
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            secret_key: SecretString::from(DEFAULT_SECRET_KEY.to_string()),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
        }
    }

    /// Builder: set the signing key.
    pub fn with_secret_key(mut self, key: impl Into<String>) -> Self {
        self.secret_key = SecretString::from(key.into());
        self
    }

    /// Build config from environment variables.
    ///
    /// - `TODO_DB_PATH` (default `db.json`)
    /// - `TODO_SECRET_KEY`, falling back to `SECRET_KEY`
    /// - `TODO_BIND_ADDR` (default `127.0.0.1:5000`)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db_path = lookup("TODO_DB_PATH")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DB_PATH.to_string());

        let secret_key = match lookup("TODO_SECRET_KEY").or_else(|| lookup("SECRET_KEY")) {
            Some(key) if !key.is_empty() => key,
            _ => {
                warn!("No secret key configured, using the development default");
                DEFAULT_SECRET_KEY.to_string()
            }
        };

        let raw_addr = lookup("TODO_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = raw_addr
            .trim()
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue {
                key: "TODO_BIND_ADDR".to_string(),
                message: format!("{raw_addr:?}: {e}"),
            })?;

        Ok(Self {
            db_path: PathBuf::from(db_path),
            secret_key: SecretString::from(secret_key),
            bind_addr,
        })
    }
}
