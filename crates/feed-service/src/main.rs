//! Feed service
//!
//! Entry point for the Townsquare feed service.

use common::observability::{init_tracing, metrics::init_metrics_recorder};
use common::shutdown::shutdown_signal;
use feed_service::config::Config;
use feed_service::repositories::{PgCommentRepository, PgPublicationRepository, MIGRATOR};
use feed_service::routes::{self, AppState};
use feed_service::services::{FeedService, HttpAuthorDirectory};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing("feed_service=debug,common=info,tower_http=debug");

    info!("Starting feed service");

    let config = Config::from_env().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!(
        bind_address = %config.bind_address,
        profile_service_url = %config.profile_service_url,
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

    let metrics_handle = init_metrics_recorder("feed-service").map_err(|e| {
        error!("Failed to install metrics recorder: {}", e);
        e
    })?;

    let authors = HttpAuthorDirectory::new(config.profile_service_url.clone(), config.peer_timeout)?;

    let state = Arc::new(AppState {
        feed: FeedService::new(
            Arc::new(PgPublicationRepository::new(pool.clone())),
            Arc::new(PgCommentRepository::new(pool)),
            Arc::new(authors),
        ),
    });

    let app = routes::build_routes(state, metrics_handle);

    let addr: SocketAddr = config.bind_address.parse().map_err(|e| {
        error!("Invalid bind address: {}", e);
        e
    })?;

    info!("Feed service listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Feed service shutdown complete");

    Ok(())
}
