//! Auth service client for the account-removal cascade on profile delete.

use async_trait::async_trait;
use common::identity::SERVICE_TOKEN_HEADER;
use common::observability::metrics::record_peer_call;
use common::peer::{build_client, outcome_label, CallPolicy, PeerError};
use common::secret::{ExposeSecret, SecretString};
use reqwest::{Client, StatusCode};
use std::time::{Duration, Instant};
use tracing::instrument;

const POLICY: CallPolicy = CallPolicy::BestEffort;

#[async_trait]
pub trait AccountRemover: Send + Sync {
    /// Ask the auth service to delete the user. 204 and 200 both count as done.
    async fn remove_account(&self, user_id: &str) -> Result<(), PeerError>;
}

/// HTTP client for `DELETE {auth}/auth/user/:id`.
pub struct HttpAccountRemover {
    client: Client,
    base_url: String,
    service_token: SecretString,
}

impl HttpAccountRemover {
    /// # Errors
    ///
    /// Returns `PeerError::Build` if the HTTP client cannot be built.
    pub fn new(
        base_url: String,
        service_token: SecretString,
        timeout: Duration,
    ) -> Result<Self, PeerError> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url,
            service_token,
        })
    }

    async fn send(&self, user_id: &str) -> Result<(), PeerError> {
        let response = self
            .client
            .delete(format!("{}/auth/user/{}", self.base_url, user_id))
            .header(SERVICE_TOKEN_HEADER, self.service_token.expose_secret())
            .send()
            .await?;

        match response.status() {
            StatusCode::NO_CONTENT | StatusCode::OK => Ok(()),
            status => Err(PeerError::Status(status.as_u16())),
        }
    }
}

#[async_trait]
impl AccountRemover for HttpAccountRemover {
    #[instrument(skip_all, name = "profile.peer.remove_account", fields(user_id = %user_id))]
    async fn remove_account(&self, user_id: &str) -> Result<(), PeerError> {
        let start = Instant::now();
        let result = self.send(user_id).await;

        record_peer_call(
            "auth",
            "remove_account",
            POLICY,
            outcome_label(&result),
            start.elapsed(),
        );

        result
    }
}

pub mod mock {
    use super::*;
    use std::sync::Mutex;

    /// Records every user id it was asked to remove.
    pub struct MockAccountRemover {
        fail_with: Option<u16>,
        removed: Mutex<Vec<String>>,
    }

    impl MockAccountRemover {
        pub fn accepting() -> Self {
            Self {
                fail_with: None,
                removed: Mutex::new(Vec::new()),
            }
        }

        pub fn failing(status: u16) -> Self {
            Self {
                fail_with: Some(status),
                removed: Mutex::new(Vec::new()),
            }
        }

        pub fn removed(&self) -> Vec<String> {
            self.removed
                .lock()
                .map(|ids| ids.clone())
                .unwrap_or_default()
        }
    }

    #[async_trait]
    impl AccountRemover for MockAccountRemover {
        async fn remove_account(&self, user_id: &str) -> Result<(), PeerError> {
            if let Ok(mut ids) = self.removed.lock() {
                ids.push(user_id.to_string());
            }
            match self.fail_with {
                Some(status) => Err(PeerError::Status(status)),
                None => Ok(()),
            }
        }
    }
}
