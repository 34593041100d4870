//! HTTP routes for the profile service.

use crate::handlers;
use crate::services::ProfileService;
use axum::{middleware, routing::get, Router};
use common::observability::http_metrics_middleware;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub profiles: ProfileService,
}

/// Build the application routes.
///
/// `/profile/health` is registered before `/profile/:id`; axum prefers the
/// static segment.
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let api_routes = Router::new()
        .route("/profile/health", get(handlers::health_check))
        .route(
            "/profile",
            get(handlers::get_own_profile)
                .post(handlers::create_profile)
                .put(handlers::update_own_profile)
                .delete(handlers::delete_own_profile),
        )
        .route(
            "/profile/:id",
            get(handlers::get_profile)
                .put(handlers::update_profile)
                .delete(handlers::delete_profile),
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
