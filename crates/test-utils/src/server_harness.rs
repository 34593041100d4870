//! Test server harness for E2E testing.
//!
//! Provides `TestServer` for serving a real service router in tests.

use axum::Router;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// A router served on `127.0.0.1` until dropped.
pub struct TestServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Bind a random port and serve `app` on it.
    pub async fn spawn(app: Router) -> Result<Self, anyhow::Error> {
        Ok(Self::serve(bind().await?, app))
    }

    /// Serve `app` on an already bound listener.
    ///
    /// Binding first lets services that call each other learn every address
    /// before any of them is built.
    pub fn serve(listener: TcpListener, app: Router) -> Self {
        let addr = listener
            .local_addr()
            .expect("bound listener has a local address");

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Test server error: {e}");
            }
        });

        Self { addr, handle }
    }

    /// Get the base URL of the test server.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Bind `127.0.0.1:0`.
pub async fn bind() -> Result<TcpListener, anyhow::Error> {
    TcpListener::bind("127.0.0.1:0")
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))
}
