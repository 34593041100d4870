//! Environment configuration helpers.
//!
//! Every service loads its `Config` from a `HashMap<String, String>` so tests
//! can build configuration without touching the process environment. The
//! helpers here cover the lookups all services share, plus [`DbConfig`] for
//! the three services that own a database.

use secrecy::{ExposeSecret, SecretString};
use sqlx::postgres::PgConnectOptions;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Default Postgres port.
pub const DEFAULT_DB_PORT: u16 = 5432;

/// Default number of connections kept open while idle.
pub const DEFAULT_DB_MAX_IDLE_CONNS: u32 = 10;

/// Default upper bound on open connections.
pub const DEFAULT_DB_MAX_OPEN_CONNS: u32 = 100;

/// Default maximum lifetime of a pooled connection (1 hour).
pub const DEFAULT_DB_CONN_MAX_LIFETIME: Duration = Duration::from_secs(3600);

/// Default timeout for synchronous peer-service calls, in seconds.
pub const DEFAULT_PEER_TIMEOUT_SECONDS: u64 = 5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: String, reason: String },
}

impl ConfigError {
    pub fn invalid(name: &str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

/// Look up a required variable. Blank values count as missing.
///
/// # Errors
///
/// Returns `ConfigError::MissingEnvVar` if the variable is absent or blank.
pub fn required(vars: &HashMap<String, String>, name: &str) -> Result<String, ConfigError> {
    vars.get(name)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))
}

/// Look up an optional variable and parse it, falling back to `default`.
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` if the variable is present but does not parse.
pub fn parse_or<T>(vars: &HashMap<String, String>, name: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match vars.get(name).map(|v| v.trim()).filter(|v| !v.is_empty()) {
        Some(raw) => raw
            .parse()
            .map_err(|e: T::Err| ConfigError::invalid(name, format!("'{raw}': {e}"))),
        None => Ok(default),
    }
}

/// Look up an optional duration variable (see [`parse_duration`]).
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` if the value is not a valid duration.
pub fn duration_or(
    vars: &HashMap<String, String>,
    name: &str,
    default: Duration,
) -> Result<Duration, ConfigError> {
    match vars.get(name).map(|v| v.trim()).filter(|v| !v.is_empty()) {
        Some(raw) => parse_duration(raw).map_err(|reason| ConfigError::invalid(name, reason)),
        None => Ok(default),
    }
}

/// Parse a duration written as bare seconds (`"90"`) or with a single unit
/// suffix (`"90s"`, `"30m"`, `"1h"`).
///
/// # Errors
///
/// Returns a description of the problem if the value cannot be parsed.
pub fn parse_duration(raw: &str) -> Result<Duration, String> {
    if raw.is_empty() {
        return Err("empty duration".to_string());
    }

    let (digits, multiplier) = if let Some(hours) = raw.strip_suffix('h') {
        (hours, 3600)
    } else if let Some(minutes) = raw.strip_suffix('m') {
        (minutes, 60)
    } else if let Some(seconds) = raw.strip_suffix('s') {
        (seconds, 1)
    } else {
        (raw, 1)
    };

    let amount: u64 = digits
        .parse()
        .map_err(|_| format!("'{raw}' is not a duration (expected e.g. 90, 90s, 30m, 1h)"))?;

    amount
        .checked_mul(multiplier)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("'{raw}' overflows"))
}

/// Look up a required peer-service base URL.
///
/// The value must be an absolute `http`/`https` URL; trailing slashes are
/// trimmed so callers can append absolute paths.
///
/// # Errors
///
/// Returns `ConfigError::MissingEnvVar` if absent, `ConfigError::InvalidValue`
/// if the scheme is not http(s) or the host is empty.
pub fn service_url(vars: &HashMap<String, String>, name: &str) -> Result<String, ConfigError> {
    let raw = required(vars, name)?;
    let rest = raw
        .strip_prefix("http://")
        .or_else(|| raw.strip_prefix("https://"))
        .ok_or_else(|| ConfigError::invalid(name, format!("'{raw}' must start with http:// or https://")))?;

    if rest.trim_end_matches('/').is_empty() {
        return Err(ConfigError::invalid(name, format!("'{raw}' has no host")));
    }

    Ok(raw.trim_end_matches('/').to_string())
}

/// Database settings shared by the auth, profile and feed services.
///
/// The password is held as a [`SecretString`] and redacted in Debug output.
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: SecretString,
    pub database: String,

    /// Connections the pool keeps open while idle (`DB_MAX_IDLE_CONNS`).
    pub max_idle_conns: u32,

    /// Upper bound on open connections (`DB_MAX_OPEN_CONNS`).
    pub max_open_conns: u32,

    /// Maximum lifetime of any pooled connection (`DB_CONN_MAX_LIFETIME`).
    pub conn_max_lifetime: Duration,
}

impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("database", &self.database)
            .field("max_idle_conns", &self.max_idle_conns)
            .field("max_open_conns", &self.max_open_conns)
            .field("conn_max_lifetime", &self.conn_max_lifetime)
            .finish()
    }
}

impl DbConfig {
    /// Load database settings from the `DB_*` variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing or a numeric
    /// value is malformed. `DB_MAX_OPEN_CONNS` must be at least 1.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let max_open_conns = parse_or(vars, "DB_MAX_OPEN_CONNS", DEFAULT_DB_MAX_OPEN_CONNS)?;
        if max_open_conns == 0 {
            return Err(ConfigError::invalid("DB_MAX_OPEN_CONNS", "must be at least 1"));
        }

        Ok(Self {
            host: required(vars, "DB_HOST")?,
            port: parse_or(vars, "DB_PORT", DEFAULT_DB_PORT)?,
            user: required(vars, "DB_USER")?,
            password: SecretString::from(required(vars, "DB_PASSWORD")?),
            database: required(vars, "DB_NAME")?,
            max_idle_conns: parse_or(vars, "DB_MAX_IDLE_CONNS", DEFAULT_DB_MAX_IDLE_CONNS)?,
            max_open_conns,
            conn_max_lifetime: duration_or(
                vars,
                "DB_CONN_MAX_LIFETIME",
                DEFAULT_DB_CONN_MAX_LIFETIME,
            )?,
        })
    }

    /// Connection options for the configured server.
    #[must_use]
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(self.password.expose_secret())
            .database(&self.database)
    }

    /// Idle connections are mapped onto the pool minimum, capped by the maximum.
    #[must_use]
    pub fn min_connections(&self) -> u32 {
        self.max_idle_conns.min(self.max_open_conns)
    }
}
