//! Profile service configuration.

use common::config::{self as env, ConfigError, DbConfig, DEFAULT_PEER_TIMEOUT_SECONDS};
use common::secret::SecretString;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

/// Default bind address.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8081";

pub struct Config {
    pub db: DbConfig,

    pub bind_address: String,

    /// Base URL of the auth service, target of the delete cascade.
    pub auth_service_url: String,

    /// Base URL of the feed service, source of profile post lists.
    pub feed_service_url: String,

    /// Sent as `X-Service-Token` on the delete cascade.
    pub service_token: SecretString,

    /// Timeout for each peer call.
    pub peer_timeout: Duration,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("db", &self.db)
            .field("bind_address", &self.bind_address)
            .field("auth_service_url", &self.auth_service_url)
            .field("feed_service_url", &self.feed_service_url)
            .field("service_token", &"[REDACTED]")
            .field("peer_timeout", &self.peer_timeout)
            .finish()
    }
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
            auth_service_url: env::service_url(vars, "AUTH_SERVICE_URL")?,
            feed_service_url: env::service_url(vars, "FEED_SERVICE_URL")?,
            service_token: SecretString::from(env::required(vars, "SERVICE_TOKEN")?),
            peer_timeout: Duration::from_secs(peer_timeout_seconds),
        })
    }
}
