//! Gateway configuration.

use common::config::{self as env, ConfigError};
use common::jwt::MIN_SECRET_BYTES;
use common::secret::{ExposeSecret, SecretString};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

/// Default bind address.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Default timeout for a proxied request.
pub const DEFAULT_PROXY_TIMEOUT_SECONDS: u64 = 30;

/// Timeout for the live user check against the auth service.
pub const USER_CHECK_TIMEOUT: Duration = Duration::from_secs(2);

pub struct Config {
    pub bind_address: String,

    pub auth_service_url: String,
    pub profile_service_url: String,
    pub feed_service_url: String,

    /// Only origin allowed by CORS.
    pub front_url: String,

    /// HS256 secret shared with the auth service.
    pub jwt_secret: SecretString,

    pub proxy_timeout: Duration,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("bind_address", &self.bind_address)
            .field("auth_service_url", &self.auth_service_url)
            .field("profile_service_url", &self.profile_service_url)
            .field("feed_service_url", &self.feed_service_url)
            .field("front_url", &self.front_url)
            .field("jwt_secret", &"[REDACTED]")
            .field("proxy_timeout", &self.proxy_timeout)
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
        let jwt_secret = SecretString::from(env::required(vars, "JWT_SECRET")?);
        if jwt_secret.expose_secret().len() < MIN_SECRET_BYTES {
            return Err(ConfigError::invalid(
                "JWT_SECRET",
                format!("must be at least {MIN_SECRET_BYTES} bytes"),
            ));
        }

        let proxy_timeout_seconds =
            env::parse_or(vars, "PROXY_TIMEOUT_SECONDS", DEFAULT_PROXY_TIMEOUT_SECONDS)?;
        if proxy_timeout_seconds == 0 {
            return Err(ConfigError::invalid("PROXY_TIMEOUT_SECONDS", "must be positive"));
        }

        Ok(Self {
            bind_address: vars
                .get("BIND_ADDRESS")
                .cloned()
                .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string()),
            auth_service_url: env::service_url(vars, "AUTH_SERVICE_URL")?,
            profile_service_url: env::service_url(vars, "PROFILE_SERVICE_URL")?,
            feed_service_url: env::service_url(vars, "FEED_SERVICE_URL")?,
            front_url: env::service_url(vars, "FRONT_URL")?,
            jwt_secret,
            proxy_timeout: Duration::from_secs(proxy_timeout_seconds),
        })
    }
}
