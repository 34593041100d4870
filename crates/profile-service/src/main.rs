//! Profile service
//!
//! Entry point for the Townsquare profile service.

use common::observability::{init_tracing, metrics::init_metrics_recorder};
use common::shutdown::shutdown_signal;
use profile_service::config::Config;
use profile_service::repositories::{PgProfileRepository, MIGRATOR};
use profile_service::routes::{self, AppState};
use profile_service::services::{HttpAccountRemover, HttpPublicationSource, ProfileService};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing("profile_service=debug,common=info,tower_http=debug");

    info!("Starting profile service");

    let config = Config::from_env().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!(
        bind_address = %config.bind_address,
        auth_service_url = %config.auth_service_url,
        feed_service_url = %config.feed_service_url,
        "Configuration loaded successfully"
    );

    let pool = common::db::connect_pool(&config.db).await.map_err(|e| {
        error!("Failed to connect to database: {}", e);
        e
    })?;

    MIGRATOR.run(&pool).await.map_err(|e| {
        error!("Failed to run migrations: {}", e);
        e
    })?;

    info!("Database ready");

    let metrics_handle = init_metrics_recorder("profile-service").map_err(|e| {
        error!("Failed to install metrics recorder: {}", e);
        e
    })?;

    let publications =
        HttpPublicationSource::new(config.feed_service_url.clone(), config.peer_timeout)?;
    let accounts = HttpAccountRemover::new(
        config.auth_service_url.clone(),
        config.service_token,
        config.peer_timeout,
    )?;

    let state = Arc::new(AppState {
        profiles: ProfileService::new(
            Arc::new(PgProfileRepository::new(pool)),
            Arc::new(publications),
            Arc::new(accounts),
        ),
    });

    let app = routes::build_routes(state, metrics_handle);

    let addr: SocketAddr = config.bind_address.parse().map_err(|e| {
        error!("Invalid bind address: {}", e);
        e
    })?;

    info!("Profile service listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Profile service shutdown complete");

    Ok(())
}
