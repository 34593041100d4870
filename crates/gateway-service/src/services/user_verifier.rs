//! Live user check against the auth service.
//!
//! A valid token is not enough: the subject must still exist. Every protected
//! request asks the auth service, bounded by a short timeout.

use async_trait::async_trait;
use common::observability::metrics::record_peer_call;
use common::peer::{build_client, outcome_label, CallPolicy, PeerError};
use reqwest::{Client, StatusCode};
use std::time::{Duration, Instant};
use tracing::{instrument, warn};

const POLICY: CallPolicy = CallPolicy::Required;

/// Result of asking whether a user still exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserStatus {
    Exists,
    Missing,
}

#[async_trait]
pub trait UserVerifier: Send + Sync {
    /// `Err` means the answer is unknown, not that the user is gone.
    async fn check(&self, user_id: &str) -> Result<UserStatus, PeerError>;
}

/// HTTP client for `GET {auth}/auth/user/{id}`.
pub struct HttpUserVerifier {
    client: Client,
    base_url: String,
}

impl HttpUserVerifier {
    /// # Errors
    ///
    /// Returns `PeerError::Build` if the HTTP client cannot be built.
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, PeerError> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url,
        })
    }

    async fn fetch(&self, user_id: &str) -> Result<UserStatus, PeerError> {
        let response = self
            .client
            .get(format!("{}/auth/user/{}", self.base_url, user_id))
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(UserStatus::Exists),
            StatusCode::NOT_FOUND => Ok(UserStatus::Missing),
            other => Err(PeerError::Status(other.as_u16())),
        }
    }
}

#[async_trait]
impl UserVerifier for HttpUserVerifier {
    #[instrument(skip_all, name = "gateway.peer.check_user")]
    async fn check(&self, user_id: &str) -> Result<UserStatus, PeerError> {
        let start = Instant::now();
        let result = self.fetch(user_id).await;

        record_peer_call(
            "auth",
            "check_user",
            POLICY,
            outcome_label(&result),
            start.elapsed(),
        );
        if let Err(e) = &result {
            warn!(target: "gateway.peer.auth", error = %e, "User check failed");
        }

        result
    }
}

pub mod mock {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Knows a fixed set of users, or fails every check.
    pub struct MockUserVerifier {
        known: HashSet<String>,
        fail_with: Option<PeerErrorKind>,
        call_count: AtomicUsize,
    }

    #[derive(Clone, Copy)]
    pub enum PeerErrorKind {
        Transport,
        Status(u16),
    }

    impl MockUserVerifier {
        pub fn knowing(users: &[&str]) -> Self {
            Self {
                known: users.iter().map(|u| (*u).to_string()).collect(),
                fail_with: None,
                call_count: AtomicUsize::new(0),
            }
        }

        pub fn unreachable() -> Self {
            Self {
                known: HashSet::new(),
                fail_with: Some(PeerErrorKind::Transport),
                call_count: AtomicUsize::new(0),
            }
        }

        pub fn failing(status: u16) -> Self {
            Self {
                known: HashSet::new(),
                fail_with: Some(PeerErrorKind::Status(status)),
                call_count: AtomicUsize::new(0),
            }
        }

        pub fn call_count(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl UserVerifier for MockUserVerifier {
        async fn check(&self, user_id: &str) -> Result<UserStatus, PeerError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            match self.fail_with {
                Some(PeerErrorKind::Transport) => {
                    Err(PeerError::Transport("connection refused".to_string()))
                }
                Some(PeerErrorKind::Status(status)) => Err(PeerError::Status(status)),
                None if self.known.contains(user_id) => Ok(UserStatus::Exists),
                None => Ok(UserStatus::Missing),
            }
        }
    }
}
