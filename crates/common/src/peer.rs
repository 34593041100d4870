//! Outbound HTTP to peer services.
//!
//! Every synchronous peer call goes through a client built here, so each one
//! carries a bounded timeout. Call sites declare a [`CallPolicy`] that decides
//! what a failure means for the enclosing operation and labels the call's
//! metrics and logs.

use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// Upper bound on TCP connect time for peer calls.
const MAX_CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// What a failed peer call means for the enclosing operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallPolicy {
    /// Failure fails the operation (possibly after a compensating action).
    Required,
    /// Failure is logged and the operation continues without the result.
    BestEffort,
}

impl CallPolicy {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            CallPolicy::Required => "required",
            CallPolicy::BestEffort => "best_effort",
        }
    }
}

#[derive(Debug, Error)]
pub enum PeerError {
    #[error("Peer unreachable: {0}")]
    Transport(String),

    #[error("Peer returned unexpected status {0}")]
    Status(u16),

    #[error("Peer response could not be decoded: {0}")]
    Decode(String),

    #[error("Peer client could not be built: {0}")]
    Build(String),
}

impl PeerError {
    /// Bounded label for metrics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            PeerError::Transport(_) => "transport",
            PeerError::Status(_) => "status",
            PeerError::Decode(_) => "decode",
            PeerError::Build(_) => "build",
        }
    }
}

impl From<reqwest::Error> for PeerError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            PeerError::Decode(err.to_string())
        } else {
            PeerError::Transport(err.to_string())
        }
    }
}

/// Metrics outcome label for a finished peer call.
#[must_use]
pub fn outcome_label<T>(result: &Result<T, PeerError>) -> &'static str {
    match result {
        Ok(_) => "success",
        Err(e) => e.kind(),
    }
}

/// Build an HTTP client whose requests are bounded by `timeout` end to end.
///
/// # Errors
///
/// Returns `PeerError::Build` if the TLS backend cannot be initialized.
pub fn build_client(timeout: Duration) -> Result<Client, PeerError> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout.min(MAX_CONNECT_TIMEOUT))
        .build()
        .map_err(|e| PeerError::Build(e.to_string()))
}
