//! Server configuration.
//!
//! Only the listen port comes from the environment. Everything else has a
//! fixed default that tests and embedders can override on the struct.

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Listen port when `PORT` is unset.
pub const DEFAULT_PORT: u16 = 8080;

/// Directory static assets are served from, relative to the working directory.
pub const DEFAULT_PUBLIC_DIR: &str = "public";

/// How often each connection is pinged.
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct Config {
    /// TCP port bound on all interfaces.
    pub port: u16,

    /// Root of the static asset tree.
    pub public_dir: PathBuf,

    /// Ping period. A connection silent for two periods is dropped.
    pub heartbeat_interval: Duration,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("PORT must be a port number, got '{value}': {source}")]
    InvalidPort {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: DEFAULT_PORT,
            public_dir: PathBuf::from(DEFAULT_PUBLIC_DIR),
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        // An empty PORT counts as unset.
        if let Some(value) = vars.get("PORT").filter(|v| !v.trim().is_empty()) {
            config.port = value
                .trim()
                .parse()
                .map_err(|source| ConfigError::InvalidPort {
                    value: value.clone(),
                    source,
                })?;
        }

        Ok(config)
    }
}
