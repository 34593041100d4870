//! Auth service
//!
//! Entry point for the Townsquare account service.

use auth_service::config::Config;
use auth_service::middleware::ServiceTokenGuard;
use auth_service::repositories::{PgUserRepository, MIGRATOR};
use auth_service::routes::{self, AppState};
use auth_service::services::{AuthService, HttpProfileProvisioner};
use common::jwt::TokenSigner;
use common::observability::{init_tracing, metrics::init_metrics_recorder};
use common::shutdown::shutdown_signal;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing("auth_service=debug,common=info,tower_http=debug");

    info!("Starting auth service");

    let config = Config::from_env().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!(
        bind_address = %config.bind_address,
        profile_service_url = %config.profile_service_url,
        bcrypt_cost = config.bcrypt_cost,
        "Configuration loaded successfully"
    );

    info!("Connecting to database...");
    let pool = common::db::connect_pool(&config.db).await.map_err(|e| {
        error!("Failed to connect to database: {}", e);
        e
    })?;

    MIGRATOR.run(&pool).await.map_err(|e| {
        error!("Failed to run migrations: {}", e);
        e
    })?;

    info!("Database ready");

    let metrics_handle = init_metrics_recorder("auth-service").map_err(|e| {
        error!("Failed to install metrics recorder: {}", e);
        e
    })?;

    let profiles = HttpProfileProvisioner::new(config.profile_service_url.clone(), config.peer_timeout)?;
    let auth = AuthService::new(
        Arc::new(PgUserRepository::new(pool)),
        Arc::new(profiles),
        Arc::new(TokenSigner::new(&config.jwt_secret)),
        config.bcrypt_cost,
    );

    let state = Arc::new(AppState {
        auth,
        service_guard: ServiceTokenGuard::new(&config.service_token)?,
    });

    let app = routes::build_routes(state, metrics_handle);

    let addr: SocketAddr = config.bind_address.parse().map_err(|e| {
        error!("Invalid bind address: {}", e);
        e
    })?;

    info!("Auth service listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Auth service shutdown complete");

    Ok(())
}
