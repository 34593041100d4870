use crate::errors::AuthError;
use crate::models::{HealthResponse, LoginRequest, RegisterRequest, TokenResponse, UserResponse};
use crate::routes::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

fn parse_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AuthError> {
    payload
        .map(|Json(body)| body)
        .map_err(|_| AuthError::Validation("invalid JSON".to_string()))
}

/// Handle registration
///
/// POST /auth/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TokenResponse>), AuthError> {
    let request = parse_body(payload)?;
    let token = state.auth.register(request).await?;

    Ok((StatusCode::CREATED, Json(TokenResponse { token })))
}

/// Handle login
///
/// POST /auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, AuthError> {
    let request = parse_body(payload)?;
    let token = state.auth.login(request).await?;

    Ok(Json(TokenResponse { token }))
}

/// GET /auth/user/:id
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, AuthError> {
    let user = state.auth.find_user(&id).await?;
    Ok(Json(user.into()))
}

/// Internal account removal, reached only through `require_service_token`.
///
/// DELETE /auth/user/:id
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, AuthError> {
    state.auth.delete_user(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /auth/health
///
/// 200 when the user store answers, 503 otherwise.
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.auth.health().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok".to_string(),
            }),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}
