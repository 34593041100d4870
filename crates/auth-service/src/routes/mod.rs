//! HTTP routes for the auth service.

use crate::handlers;
use crate::middleware::{require_service_token, ServiceTokenGuard};
use crate::services::AuthService;
use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use common::observability::http_metrics_middleware;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,

    /// Verifies `X-Service-Token` on internal endpoints.
    pub service_guard: ServiceTokenGuard,
}

/// Build the application routes.
///
/// - `GET /auth/health` - store health
/// - `POST /auth/register`, `POST /auth/login` - public
/// - `GET /auth/user/:id` - user lookup
/// - `DELETE /auth/user/:id` - internal, requires `X-Service-Token`
/// - `GET /metrics` - Prometheus scrape
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let user_routes = get(handlers::get_user).merge(delete(handlers::delete_user).route_layer(
        middleware::from_fn_with_state(state.clone(), require_service_token),
    ));

    let api_routes = Router::new()
        .route("/auth/health", get(handlers::health_check))
        .route("/auth/register", post(handlers::register))
        .route("/auth/login", post(handlers::login))
        .route("/auth/user/:id", user_routes)
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_is_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }
}
