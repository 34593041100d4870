//! Feed service configuration.

use common::config::{self as env, ConfigError, DbConfig, DEFAULT_PEER_TIMEOUT_SECONDS};
use std::collections::HashMap;
use std::time::Duration;

/// Default bind address.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8082";

/// Feed service configuration. The only secret is the DB password, which
/// `DbConfig` already redacts.
#[derive(Debug)]
pub struct Config {
    pub db: DbConfig,

    pub bind_address: String,

    /// Base URL of the profile service, used to look up author names.
    pub profile_service_url: String,

    pub peer_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&std::env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let peer_timeout_seconds =
            env::parse_or(vars, "PEER_TIMEOUT_SECONDS", DEFAULT_PEER_TIMEOUT_SECONDS)?;
        if peer_timeout_seconds == 0 {
            return Err(ConfigError::invalid("PEER_TIMEOUT_SECONDS", "must be positive"));
        }

        Ok(Self {
            db: DbConfig::from_vars(vars)?,
            bind_address: vars
                .get("BIND_ADDRESS")
                .cloned()
                .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string()),
            profile_service_url: env::service_url(vars, "PROFILE_SERVICE_URL")?,
            peer_timeout: Duration::from_secs(peer_timeout_seconds),
        })
    }
}
