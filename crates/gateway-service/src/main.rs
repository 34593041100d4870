//! Gateway
//!
//! Entry point for the Townsquare gateway.

use axum::http::HeaderValue;
use common::jwt::TokenSigner;
use common::observability::{init_tracing, metrics::init_metrics_recorder};
use common::shutdown::shutdown_signal;
use gateway_service::config::{Config, USER_CHECK_TIMEOUT};
use gateway_service::routes::{self, AppState};
use gateway_service::services::{HttpUserVerifier, ProxyClient, Upstream};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing("gateway_service=debug,common=info,tower_http=debug");

    info!("Starting gateway");

    let config = Config::from_env().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!(
        bind_address = %config.bind_address,
        auth_service_url = %config.auth_service_url,
        profile_service_url = %config.profile_service_url,
        feed_service_url = %config.feed_service_url,
        front_url = %config.front_url,
        "Configuration loaded successfully"
    );

    let metrics_handle = init_metrics_recorder("gateway-service").map_err(|e| {
        error!("Failed to install metrics recorder: {}", e);
        e
    })?;

    let allowed_origin = HeaderValue::from_str(&config.front_url).map_err(|e| {
        error!("Invalid FRONT_URL: {}", e);
        e
    })?;

    let state = Arc::new(AppState {
        tokens: Arc::new(TokenSigner::new(&config.jwt_secret)),
        verifier: Arc::new(HttpUserVerifier::new(
            config.auth_service_url.clone(),
            USER_CHECK_TIMEOUT,
        )?),
        proxy: ProxyClient::new(config.proxy_timeout)?,
        auth: Upstream::new("auth", config.auth_service_url),
        profile: Upstream::new("profile", config.profile_service_url),
        feed: Upstream::new("feed", config.feed_service_url),
        allowed_origin,
    });

    let app = routes::build_routes(state, metrics_handle);

    let addr: SocketAddr = config.bind_address.parse().map_err(|e| {
        error!("Invalid bind address: {}", e);
        e
    })?;

    info!("Gateway listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Gateway shutdown complete");

    Ok(())
}
