//! HTTP routes for the feed service.

use crate::handlers;
use crate::services::FeedService;
use axum::{middleware, routing::get, Router};
use common::observability::http_metrics_middleware;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub feed: FeedService,
}

/// Build the application routes.
///
/// Reads are open to any caller; creates need `X-User-ID`; updates and
/// deletes additionally need the caller to own the record.
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let api_routes = Router::new()
        .route("/feed/health", get(handlers::health_check))
        .route(
            "/feed/publications",
            get(handlers::list_publications).post(handlers::create_publication),
        )
        .route(
            "/feed/publications/:id",
            get(handlers::get_publication)
                .put(handlers::update_publication)
                .delete(handlers::delete_publication),
        )
        .route(
            "/feed/user/publications",
            get(handlers::list_user_publications),
        )
        .route(
            "/feed/comments",
            get(handlers::list_comments).post(handlers::create_comment),
        )
        .route(
            "/feed/comments/:id",
            get(handlers::get_comment)
                .put(handlers::update_comment)
                .delete(handlers::delete_comment),
        )
        .with_state(state);

    let metrics_routes = Router::new()
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(metrics_handle);

    api_routes
        .merge(metrics_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(middleware::from_fn(http_metrics_middleware))
}
