//! # Test Utilities
//!
//! Shared test support for the Townsquare services:
//! - [`TestServer`]: any router served on a random local port
//! - [`TestStack`]: all four services wired together over real HTTP with
//!   in-memory stores
//! - Fixed secrets and a non-global metrics handle for test routers
//!
//! ## Usage
//!
//! ```rust,ignore
//! use test_utils::TestStack;
//!
//! #[tokio::test]
//! async fn test_example() -> Result<(), anyhow::Error> {
//!     let stack = TestStack::spawn().await?;
//!     let session = stack.register("alice", "alice@example.com", "password1").await?;
//!
//!     let response = stack
//!         .client()
//!         .get(format!("{}/profile", stack.gateway.url()))
//!         .bearer_auth(&session.token)
//!         .send()
//!         .await?;
//!
//!     assert_eq!(response.status(), 200);
//!     Ok(())
//! }
//! ```

pub mod server_harness;
pub mod stack;

pub use server_harness::*;
pub use stack::*;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

/// JWT secret shared by the auth service and gateway in tests.
pub const TEST_JWT_SECRET: &str = "test-jwt-secret-0123456789abcdef0123456789";

/// `X-Service-Token` shared by the auth and profile services in tests.
pub const TEST_SERVICE_TOKEN: &str = "test-service-token";

/// Metrics handle for test routers. The recorder is never installed
/// globally, so any number of routers can share it.
pub fn metrics_handle() -> PrometheusHandle {
    static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
    HANDLE
        .get_or_init(|| PrometheusBuilder::new().build_recorder().handle())
        .clone()
}

/// The signer matching [`TEST_JWT_SECRET`].
pub fn test_signer() -> common::jwt::TokenSigner {
    common::jwt::TokenSigner::new(&common::secret::SecretString::from(TEST_JWT_SECRET))
}
