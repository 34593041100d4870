//! Proxy handlers: one per backend.

use crate::errors::GatewayError;
use crate::middleware::AuthenticatedUser;
use crate::routes::AppState;
use axum::{
    extract::{Request, State},
    response::Response,
    Extension,
};
use std::sync::Arc;

/// Public auth endpoints: register, login and health. No identity is forwarded.
pub async fn proxy_public(
    State(state): State<Arc<AppState>>,
    req: Request,
) -> Result<Response, GatewayError> {
    state.proxy.forward(&state.auth, req, None).await
}

pub async fn proxy_to_auth(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    req: Request,
) -> Result<Response, GatewayError> {
    state.proxy.forward(&state.auth, req, Some(&user.user_id)).await
}

pub async fn proxy_to_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    req: Request,
) -> Result<Response, GatewayError> {
    state
        .proxy
        .forward(&state.profile, req, Some(&user.user_id))
        .await
}

pub async fn proxy_to_feed(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    req: Request,
) -> Result<Response, GatewayError> {
    state.proxy.forward(&state.feed, req, Some(&user.user_id)).await
}

/// GET /health
pub async fn health_check() -> &'static str {
    "OK"
}

pub async fn not_found() -> GatewayError {
    GatewayError::NotFound
}
