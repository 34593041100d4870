//! Feed service client used to list a user's publications on profile reads.
//!
//! Best effort: the caller renders the profile without posts when this fails.

use crate::models::PostSummary;
use async_trait::async_trait;
use common::identity::USER_ID_HEADER;
use common::observability::metrics::record_peer_call;
use common::peer::{build_client, outcome_label, CallPolicy, PeerError};
use reqwest::{Client, StatusCode};
use std::time::{Duration, Instant};
use tracing::instrument;

const POLICY: CallPolicy = CallPolicy::BestEffort;

#[async_trait]
pub trait PublicationSource: Send + Sync {
    /// Publications authored by `user_id`, newest first.
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<PostSummary>, PeerError>;
}

/// HTTP client for `GET {feed}/feed/user/publications`.
pub struct HttpPublicationSource {
    client: Client,
    base_url: String,
}

impl HttpPublicationSource {
    /// # Errors
    ///
    /// Returns `PeerError::Build` if the HTTP client cannot be built.
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, PeerError> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url,
        })
    }

    async fn fetch(&self, user_id: &str) -> Result<Vec<PostSummary>, PeerError> {
        let response = self
            .client
            .get(format!("{}/feed/user/publications", self.base_url))
            .header(USER_ID_HEADER, user_id)
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(PeerError::Status(response.status().as_u16()));
        }

        Ok(response.json::<Vec<PostSummary>>().await?)
    }
}

#[async_trait]
impl PublicationSource for HttpPublicationSource {
    #[instrument(skip_all, name = "profile.peer.list_publications", fields(user_id = %user_id))]
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<PostSummary>, PeerError> {
        let start = Instant::now();
        let result = self.fetch(user_id).await;

        record_peer_call(
            "feed",
            "list_user_publications",
            POLICY,
            outcome_label(&result),
            start.elapsed(),
        );

        result
    }
}

/// Fake publication source for tests.
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    pub struct MockPublicationSource {
        posts: Vec<PostSummary>,
        fail_with: Option<u16>,
        call_count: AtomicUsize,
    }

    impl MockPublicationSource {
        /// Every call returns `posts`.
        pub fn returning(posts: Vec<PostSummary>) -> Self {
            Self {
                posts,
                fail_with: None,
                call_count: AtomicUsize::new(0),
            }
        }

        pub fn failing(status: u16) -> Self {
            Self {
                posts: Vec::new(),
                fail_with: Some(status),
                call_count: AtomicUsize::new(0),
            }
        }

        pub fn call_count(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PublicationSource for MockPublicationSource {
        async fn list_for_user(&self, _user_id: &str) -> Result<Vec<PostSummary>, PeerError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            match self.fail_with {
                Some(status) => Err(PeerError::Status(status)),
                None => Ok(self.posts.clone()),
            }
        }
    }
}
