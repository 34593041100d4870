//! Profile handlers.
//!
//! The `/profile` routes act on the caller named by `X-User-ID`. The
//! `/profile/:id` routes act on the path id; mutating them requires the path
//! id to equal the caller.

use crate::errors::ProfileError;
use crate::models::{HealthResponse, ProfileRequest, ProfileResponse};
use crate::routes::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use common::identity::CallerId;
use std::sync::Arc;

fn parse_body(payload: Result<Json<ProfileRequest>, JsonRejection>) -> Result<ProfileRequest, ProfileError> {
    payload
        .map(|Json(body)| body)
        .map_err(|_| ProfileError::Validation("invalid JSON".to_string()))
}

fn ensure_owner(caller: &CallerId, user_id: &str) -> Result<(), ProfileError> {
    if caller.as_str() == user_id {
        Ok(())
    } else {
        Err(ProfileError::Forbidden)
    }
}

/// POST /profile
pub async fn create_profile(
    State(state): State<Arc<AppState>>,
    caller: CallerId,
    payload: Result<Json<ProfileRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ProfileResponse>), ProfileError> {
    let request = parse_body(payload)?;
    let profile = state.profiles.create(caller.as_str(), request).await?;

    Ok((StatusCode::CREATED, Json(profile)))
}

/// GET /profile
pub async fn get_own_profile(
    State(state): State<Arc<AppState>>,
    caller: CallerId,
) -> Result<Json<ProfileResponse>, ProfileError> {
    Ok(Json(state.profiles.get(caller.as_str()).await?))
}

/// GET /profile/:id
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    _caller: CallerId,
    Path(user_id): Path<String>,
) -> Result<Json<ProfileResponse>, ProfileError> {
    Ok(Json(state.profiles.get(&user_id).await?))
}

/// PUT /profile
pub async fn update_own_profile(
    State(state): State<Arc<AppState>>,
    caller: CallerId,
    payload: Result<Json<ProfileRequest>, JsonRejection>,
) -> Result<Json<ProfileResponse>, ProfileError> {
    let request = parse_body(payload)?;
    Ok(Json(state.profiles.update(caller.as_str(), request).await?))
}

/// PUT /profile/:id
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    caller: CallerId,
    Path(user_id): Path<String>,
    payload: Result<Json<ProfileRequest>, JsonRejection>,
) -> Result<Json<ProfileResponse>, ProfileError> {
    ensure_owner(&caller, &user_id)?;
    let request = parse_body(payload)?;
    Ok(Json(state.profiles.update(&user_id, request).await?))
}

/// DELETE /profile
pub async fn delete_own_profile(
    State(state): State<Arc<AppState>>,
    caller: CallerId,
) -> Result<StatusCode, ProfileError> {
    state.profiles.delete(caller.as_str()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /profile/:id
pub async fn delete_profile(
    State(state): State<Arc<AppState>>,
    caller: CallerId,
    Path(user_id): Path<String>,
) -> Result<StatusCode, ProfileError> {
    ensure_owner(&caller, &user_id)?;
    state.profiles.delete(&user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /profile/health
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.profiles.health().await {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_owner() {
        let caller = CallerId("u1".to_string());

        assert!(ensure_owner(&caller, "u1").is_ok());
        assert!(matches!(ensure_owner(&caller, "u2"), Err(ProfileError::Forbidden)));
    }
}
