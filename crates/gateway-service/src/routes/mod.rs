//! HTTP routes for the gateway.

use crate::handlers;
use crate::middleware::require_user;
use crate::services::{ProxyClient, Upstream, UserVerifier};
use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{any, get},
    Router,
};
use common::jwt::TokenSigner;
use common::observability::http_metrics_middleware;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub tokens: Arc<TokenSigner>,
    pub verifier: Arc<dyn UserVerifier>,
    pub proxy: ProxyClient,
    pub auth: Upstream,
    pub profile: Upstream,
    pub feed: Upstream,
    /// The frontend origin allowed by CORS.
    pub allowed_origin: HeaderValue,
}

/// Build the application routes.
///
/// Register, login and the auth health check pass through without a token.
/// Everything else under `/auth/user`, `/profile` and `/feed` needs a bearer
/// token naming a live user.
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(state.allowed_origin.clone())
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let public_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/auth/health", get(handlers::proxy_public))
        .route("/auth/register", any(handlers::proxy_public))
        .route("/auth/login", any(handlers::proxy_public));

    let protected_routes = Router::new()
        .route("/auth/user/*rest", any(handlers::proxy_to_auth))
        .route("/profile", any(handlers::proxy_to_profile))
        .route("/profile/*rest", any(handlers::proxy_to_profile))
        .route("/feed", any(handlers::proxy_to_feed))
        .route("/feed/*rest", any(handlers::proxy_to_feed))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_user));

    let api_routes = public_routes
        .merge(protected_routes)
        .fallback(handlers::not_found)
        .with_state(state);

    let metrics_routes = Router::new()
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(metrics_handle);

    api_routes
        .merge(metrics_routes)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(http_metrics_middleware))
        .layer(cors)
}
