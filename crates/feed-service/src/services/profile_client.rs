//! Profile service client used to snapshot author names on writes.
//!
//! Required: a publication or comment is not written without a name.

use async_trait::async_trait;
use common::identity::USER_ID_HEADER;
use common::observability::metrics::record_peer_call;
use common::peer::{build_client, outcome_label, CallPolicy, PeerError};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::{instrument, warn};

const POLICY: CallPolicy = CallPolicy::Required;

#[async_trait]
pub trait AuthorDirectory: Send + Sync {
    /// Current display name of `user_id`.
    async fn display_name(&self, user_id: &str) -> Result<String, PeerError>;
}

#[derive(Deserialize)]
struct ProfileName {
    name: String,
}

/// HTTP client for `GET {profile}/profile`.
pub struct HttpAuthorDirectory {
    client: Client,
    base_url: String,
}

impl HttpAuthorDirectory {
    /// # Errors
    ///
    /// Returns `PeerError::Build` if the HTTP client cannot be built.
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, PeerError> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url,
        })
    }

    async fn fetch(&self, user_id: &str) -> Result<String, PeerError> {
        let response = self
            .client
            .get(format!("{}/profile", self.base_url))
            .header(USER_ID_HEADER, user_id)
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(PeerError::Status(response.status().as_u16()));
        }

        Ok(response.json::<ProfileName>().await?.name)
    }
}

#[async_trait]
impl AuthorDirectory for HttpAuthorDirectory {
    #[instrument(skip_all, name = "feed.peer.display_name", fields(user_id = %user_id))]
    async fn display_name(&self, user_id: &str) -> Result<String, PeerError> {
        let start = Instant::now();
        let result = self.fetch(user_id).await;

        record_peer_call(
            "profile",
            "display_name",
            POLICY,
            outcome_label(&result),
            start.elapsed(),
        );
        if let Err(e) = &result {
            warn!(target: "feed.peer.profile", error = %e, "Author name lookup failed");
        }

        result
    }
}

pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    pub struct MockAuthorDirectory {
        name: String,
        fail_with: Option<u16>,
        call_count: AtomicUsize,
    }

    impl MockAuthorDirectory {
        /// Every lookup answers `name`.
        pub fn named(name: &str) -> Self {
            Self {
                name: name.to_string(),
                fail_with: None,
                call_count: AtomicUsize::new(0),
            }
        }

        pub fn failing(status: u16) -> Self {
            Self {
                name: String::new(),
                fail_with: Some(status),
                call_count: AtomicUsize::new(0),
            }
        }

        pub fn call_count(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AuthorDirectory for MockAuthorDirectory {
        async fn display_name(&self, _user_id: &str) -> Result<String, PeerError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            match self.fail_with {
                Some(status) => Err(PeerError::Status(status)),
                None => Ok(self.name.clone()),
            }
        }
    }
}
