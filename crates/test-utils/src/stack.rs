//! The four services wired together over real HTTP.
//!
//! Every store is in memory and shared with the test, so tests can inspect
//! rows directly or mark a store unhealthy to simulate an outage.

use crate::server_harness::{bind, TestServer};
use crate::{metrics_handle, test_signer, TEST_JWT_SECRET, TEST_SERVICE_TOKEN};
use auth_service::middleware::ServiceTokenGuard;
use auth_service::repositories::memory::InMemoryUserRepository;
use auth_service::services::{AuthService, HttpProfileProvisioner};
use axum::http::HeaderValue;
use common::jwt::TokenSigner;
use common::password::MIN_BCRYPT_COST;
use common::secret::SecretString;
use feed_service::repositories::memory::InMemoryFeedStore;
use feed_service::services::{FeedService, HttpAuthorDirectory};
use gateway_service::config::USER_CHECK_TIMEOUT;
use gateway_service::services::{HttpUserVerifier, ProxyClient, Upstream};
use profile_service::repositories::memory::InMemoryProfileRepository;
use profile_service::services::{HttpAccountRemover, HttpPublicationSource, ProfileService};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

/// Origin the gateway allows in tests.
pub const TEST_FRONT_URL: &str = "http://localhost:3000";

const PEER_TIMEOUT: Duration = Duration::from_secs(5);
const PROXY_TIMEOUT: Duration = Duration::from_secs(10);

/// A registered user as seen by a client.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: String,
    pub token: String,
}

pub struct TestStack {
    pub auth: TestServer,
    pub profile: TestServer,
    pub feed: TestServer,
    pub gateway: TestServer,

    pub users: Arc<InMemoryUserRepository>,
    pub profiles: Arc<InMemoryProfileRepository>,
    pub feed_store: Arc<InMemoryFeedStore>,

    client: reqwest::Client,
}

impl TestStack {
    /// Bind all four listeners, then build each service against its peers'
    /// addresses and start serving.
    pub async fn spawn() -> Result<Self, anyhow::Error> {
        let (auth_listener, profile_listener, feed_listener, gateway_listener) =
            (bind().await?, bind().await?, bind().await?, bind().await?);
        let auth_url = format!("http://{}", auth_listener.local_addr()?);
        let profile_url = format!("http://{}", profile_listener.local_addr()?);
        let feed_url = format!("http://{}", feed_listener.local_addr()?);

        let tokens = Arc::new(TokenSigner::new(&SecretString::from(TEST_JWT_SECRET)));
        let service_token = SecretString::from(TEST_SERVICE_TOKEN);

        let users = Arc::new(InMemoryUserRepository::new());
        let auth_state = Arc::new(auth_service::routes::AppState {
            auth: AuthService::new(
                users.clone(),
                Arc::new(HttpProfileProvisioner::new(profile_url.clone(), PEER_TIMEOUT)?),
                tokens.clone(),
                MIN_BCRYPT_COST,
            ),
            service_guard: ServiceTokenGuard::new(&service_token)
                .map_err(|e| anyhow::anyhow!("Failed to build service guard: {}", e))?,
        });

        let profiles = Arc::new(InMemoryProfileRepository::new());
        let profile_state = Arc::new(profile_service::routes::AppState {
            profiles: ProfileService::new(
                profiles.clone(),
                Arc::new(HttpPublicationSource::new(feed_url.clone(), PEER_TIMEOUT)?),
                Arc::new(HttpAccountRemover::new(
                    auth_url.clone(),
                    service_token,
                    PEER_TIMEOUT,
                )?),
            ),
        });

        let feed_store = Arc::new(InMemoryFeedStore::new());
        let feed_state = Arc::new(feed_service::routes::AppState {
            feed: FeedService::new(
                feed_store.clone(),
                feed_store.clone(),
                Arc::new(HttpAuthorDirectory::new(profile_url.clone(), PEER_TIMEOUT)?),
            ),
        });

        let gateway_state = Arc::new(gateway_service::routes::AppState {
            tokens,
            verifier: Arc::new(HttpUserVerifier::new(auth_url.clone(), USER_CHECK_TIMEOUT)?),
            proxy: ProxyClient::new(PROXY_TIMEOUT)?,
            auth: Upstream::new("auth", auth_url),
            profile: Upstream::new("profile", profile_url),
            feed: Upstream::new("feed", feed_url),
            allowed_origin: HeaderValue::from_static(TEST_FRONT_URL),
        });

        Ok(Self {
            auth: TestServer::serve(
                auth_listener,
                auth_service::routes::build_routes(auth_state, metrics_handle()),
            ),
            profile: TestServer::serve(
                profile_listener,
                profile_service::routes::build_routes(profile_state, metrics_handle()),
            ),
            feed: TestServer::serve(
                feed_listener,
                feed_service::routes::build_routes(feed_state, metrics_handle()),
            ),
            gateway: TestServer::serve(
                gateway_listener,
                gateway_service::routes::build_routes(gateway_state, metrics_handle()),
            ),
            users,
            profiles,
            feed_store,
            client: reqwest::Client::new(),
        })
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// URL of `path` on the gateway.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.gateway.url(), path)
    }

    /// Register through the gateway and return the new session.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<Session, anyhow::Error> {
        let response = self
            .client
            .post(self.url("/auth/register"))
            .json(&json!({ "username": username, "email": email, "password": password }))
            .send()
            .await?;
        anyhow::ensure!(
            response.status() == 201,
            "register returned {}",
            response.status()
        );

        let body: serde_json::Value = response.json().await?;
        let token = body["token"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("register response has no token"))?
            .to_string();
        let user_id = test_signer().verify(&token)?.sub;

        Ok(Session { user_id, token })
    }

    /// Send an authenticated JSON request through the gateway.
    pub async fn send(
        &self,
        method: reqwest::Method,
        path: &str,
        session: &Session,
        body: Option<serde_json::Value>,
    ) -> Result<reqwest::Response, anyhow::Error> {
        let mut request = self
            .client
            .request(method, self.url(path))
            .bearer_auth(&session.token);
        if let Some(body) = body {
            request = request.json(&body);
        }
        Ok(request.send().await?)
    }
}
