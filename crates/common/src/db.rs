//! Postgres connection pool construction.

use crate::config::DbConfig;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::info;

/// How long a request may wait for a pooled connection.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Open the process-wide connection pool described by `config`.
///
/// # Errors
///
/// Returns the driver error if the initial connection cannot be established.
pub async fn connect_pool(config: &DbConfig) -> Result<PgPool, sqlx::Error> {
    info!(
        host = %config.host,
        database = %config.database,
        max_connections = config.max_open_conns,
        min_connections = config.min_connections(),
        "Connecting to database..."
    );

    PgPoolOptions::new()
        .max_connections(config.max_open_conns)
        .min_connections(config.min_connections())
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .max_lifetime(config.conn_max_lifetime)
        .connect_with(config.connect_options())
        .await
}
