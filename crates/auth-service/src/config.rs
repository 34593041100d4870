//! Auth service configuration.
//!
//! Configuration is loaded from environment variables. Secrets are held as
//! `SecretString` and redacted in Debug output.

use common::config::{self as env, ConfigError, DbConfig, DEFAULT_PEER_TIMEOUT_SECONDS};
use common::jwt::MIN_SECRET_BYTES;
use common::password::{DEFAULT_BCRYPT_COST, MAX_BCRYPT_COST, MIN_BCRYPT_COST};
use common::secret::{ExposeSecret, SecretString};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

/// Default bind address.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8083";

/// Auth service configuration.
pub struct Config {
    pub db: DbConfig,

    /// Server bind address (default: "0.0.0.0:8083").
    pub bind_address: String,

    /// HS256 signing secret shared with the gateway.
    pub jwt_secret: SecretString,

    /// Base URL of the profile service, used to provision profiles on register.
    pub profile_service_url: String,

    /// Shared secret that authorizes `DELETE /auth/user/:id`.
    pub service_token: SecretString,

    /// Bcrypt cost factor (10-14, default 12).
    pub bcrypt_cost: u32,

    /// Timeout for the profile provisioning call.
    pub peer_timeout: Duration,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("db", &self.db)
            .field("bind_address", &self.bind_address)
            .field("jwt_secret", &"[REDACTED]")
            .field("profile_service_url", &self.profile_service_url)
            .field("service_token", &"[REDACTED]")
            .field("bcrypt_cost", &self.bcrypt_cost)
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
        let jwt_secret = SecretString::from(env::required(vars, "JWT_SECRET")?);
        if jwt_secret.expose_secret().len() < MIN_SECRET_BYTES {
            return Err(ConfigError::invalid(
                "JWT_SECRET",
                format!("must be at least {MIN_SECRET_BYTES} bytes"),
            ));
        }

        let bcrypt_cost = env::parse_or(vars, "BCRYPT_COST", DEFAULT_BCRYPT_COST)?;
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&bcrypt_cost) {
            return Err(ConfigError::invalid(
                "BCRYPT_COST",
                format!("{bcrypt_cost} is outside {MIN_BCRYPT_COST}-{MAX_BCRYPT_COST}"),
            ));
        }

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
            jwt_secret,
            profile_service_url: env::service_url(vars, "PROFILE_SERVICE_URL")?,
            service_token: SecretString::from(env::required(vars, "SERVICE_TOKEN")?),
            bcrypt_cost,
            peer_timeout: Duration::from_secs(peer_timeout_seconds),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn base_vars() -> HashMap<String, String> {
        HashMap::from([
            ("DB_HOST".to_string(), "localhost".to_string()),
            ("DB_USER".to_string(), "auth".to_string()),
            ("DB_PASSWORD".to_string(), "auth-password".to_string()),
            ("DB_NAME".to_string(), "auth".to_string()),
            (
                "JWT_SECRET".to_string(),
                "0123456789abcdef0123456789abcdef".to_string(),
            ),
            (
                "PROFILE_SERVICE_URL".to_string(),
                "http://profile:8081".to_string(),
            ),
            ("SERVICE_TOKEN".to_string(), "internal-token".to_string()),
        ])
    }

    #[test]
    fn test_from_vars_defaults() {
        let config = Config::from_vars(&base_vars()).unwrap();

        assert_eq!(config.bind_address, DEFAULT_BIND_ADDRESS);
        assert_eq!(config.bcrypt_cost, DEFAULT_BCRYPT_COST);
        assert_eq!(config.peer_timeout, Duration::from_secs(5));
        assert_eq!(config.profile_service_url, "http://profile:8081");
    }

    #[test]
    fn test_from_vars_missing_jwt_secret() {
        let mut vars = base_vars();
        vars.remove("JWT_SECRET");

        let result = Config::from_vars(&vars);
        assert!(matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "JWT_SECRET"));
    }

    #[test]
    fn test_from_vars_short_jwt_secret() {
        let mut vars = base_vars();
        vars.insert("JWT_SECRET".to_string(), "too-short".to_string());

        let result = Config::from_vars(&vars);
        assert!(matches!(result, Err(ConfigError::InvalidValue { ref name, .. }) if name == "JWT_SECRET"));
    }

    #[test]
    fn test_from_vars_missing_service_token() {
        let mut vars = base_vars();
        vars.remove("SERVICE_TOKEN");

        let result = Config::from_vars(&vars);
        assert!(matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "SERVICE_TOKEN"));
    }

    #[test]
    fn test_from_vars_bcrypt_cost_bounds() {
        let mut vars = base_vars();

        vars.insert("BCRYPT_COST".to_string(), "9".to_string());
        assert!(Config::from_vars(&vars).is_err());

        vars.insert("BCRYPT_COST".to_string(), "15".to_string());
        assert!(Config::from_vars(&vars).is_err());

        vars.insert("BCRYPT_COST".to_string(), "10".to_string());
        assert_eq!(Config::from_vars(&vars).unwrap().bcrypt_cost, 10);
    }

    #[test]
    fn test_from_vars_zero_peer_timeout_rejected() {
        let mut vars = base_vars();
        vars.insert("PEER_TIMEOUT_SECONDS".to_string(), "0".to_string());

        assert!(Config::from_vars(&vars).is_err());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = Config::from_vars(&base_vars()).unwrap();
        let debug = format!("{:?}", config);

        assert!(!debug.contains("0123456789abcdef"));
        assert!(!debug.contains("internal-token"));
        assert!(!debug.contains("auth-password"));
    }
}
