//! Profile service client used during registration.
//!
//! Provisioning is a required call: if it fails, registration rolls back the
//! user row it just created.

use async_trait::async_trait;
use common::identity::USER_ID_HEADER;
use common::observability::metrics::record_peer_call;
use common::peer::{build_client, outcome_label, CallPolicy, PeerError};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{instrument, warn};

const POLICY: CallPolicy = CallPolicy::Required;

/// Creates the initial profile for a freshly registered user.
#[async_trait]
pub trait ProfileProvisioner: Send + Sync {
    /// Succeeds only when the profile service answers 201 Created.
    async fn provision(&self, user_id: &str, name: &str) -> Result<(), PeerError>;
}

#[derive(Serialize)]
struct CreateProfileBody<'a> {
    name: &'a str,
}

/// HTTP client for `POST {profile}/profile`.
pub struct HttpProfileProvisioner {
    client: Client,
    base_url: String,
}

impl HttpProfileProvisioner {
    /// # Errors
    ///
    /// Returns `PeerError::Build` if the HTTP client cannot be built.
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, PeerError> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url,
        })
    }

    async fn send(&self, user_id: &str, name: &str) -> Result<(), PeerError> {
        let response = self
            .client
            .post(format!("{}/profile", self.base_url))
            .header(USER_ID_HEADER, user_id)
            .json(&CreateProfileBody { name })
            .send()
            .await?;

        match response.status() {
            StatusCode::CREATED => Ok(()),
            status => Err(PeerError::Status(status.as_u16())),
        }
    }
}

#[async_trait]
impl ProfileProvisioner for HttpProfileProvisioner {
    #[instrument(skip_all, name = "auth.peer.provision_profile", fields(user_id = %user_id))]
    async fn provision(&self, user_id: &str, name: &str) -> Result<(), PeerError> {
        let start = Instant::now();
        let result = self.send(user_id, name).await;

        record_peer_call(
            "profile",
            "provision_profile",
            POLICY,
            outcome_label(&result),
            start.elapsed(),
        );
        if let Err(e) = &result {
            warn!(target: "auth.peer.profile", error = %e, "Profile provisioning failed");
        }

        result
    }
}

/// Mock provisioner for tests.
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    pub struct MockProfileProvisioner {
        fail_with: Option<u16>,
        delay: Option<Duration>,
        call_count: AtomicUsize,
    }

    impl MockProfileProvisioner {
        /// Every call succeeds.
        pub fn accepting() -> Self {
            Self {
                fail_with: None,
                delay: None,
                call_count: AtomicUsize::new(0),
            }
        }

        /// Every call fails as if the profile service answered `status`.
        pub fn failing(status: u16) -> Self {
            Self {
                fail_with: Some(status),
                delay: None,
                call_count: AtomicUsize::new(0),
            }
        }

        /// Answer only after `delay`, like a slow profile service.
        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        pub fn call_count(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ProfileProvisioner for MockProfileProvisioner {
        async fn provision(&self, _user_id: &str, _name: &str) -> Result<(), PeerError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            match self.fail_with {
                Some(status) => Err(PeerError::Status(status)),
                None => Ok(()),
            }
        }
    }
}
