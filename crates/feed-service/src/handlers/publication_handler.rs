//! Publication handlers.
//!
//! Writes act as the caller named by `X-User-ID`; updates and deletes check
//! ownership before reaching the service.

use super::{ensure_owner, parse_body};
use crate::errors::FeedError;
use crate::models::{HealthResponse, Publication, PublicationRequest, PublicationResponse};
use crate::routes::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use common::identity::CallerId;
use std::sync::Arc;

fn responses(items: Vec<Publication>) -> Json<Vec<PublicationResponse>> {
    Json(items.into_iter().map(PublicationResponse::from).collect())
}

/// POST /feed/publications
pub async fn create_publication(
    State(state): State<Arc<AppState>>,
    caller: CallerId,
    payload: Result<Json<PublicationRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PublicationResponse>), FeedError> {
    let request = parse_body(payload)?;
    let publication = state.feed.create_publication(caller.as_str(), request).await?;

    Ok((StatusCode::CREATED, Json(publication.into())))
}

/// GET /feed/publications
pub async fn list_publications(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PublicationResponse>>, FeedError> {
    Ok(responses(state.feed.list_publications().await?))
}

/// GET /feed/user/publications
///
/// The caller's own publications, newest first.
pub async fn list_user_publications(
    State(state): State<Arc<AppState>>,
    caller: CallerId,
) -> Result<Json<Vec<PublicationResponse>>, FeedError> {
    Ok(responses(
        state.feed.list_user_publications(caller.as_str()).await?,
    ))
}

/// GET /feed/publications/:id
pub async fn get_publication(
    State(state): State<Arc<AppState>>,
    Path(post_id): Path<String>,
) -> Result<Json<PublicationResponse>, FeedError> {
    Ok(Json(state.feed.publication(&post_id).await?.into()))
}

/// PUT /feed/publications/:id (owner only)
pub async fn update_publication(
    State(state): State<Arc<AppState>>,
    caller: CallerId,
    Path(post_id): Path<String>,
    payload: Result<Json<PublicationRequest>, JsonRejection>,
) -> Result<Json<PublicationResponse>, FeedError> {
    let existing = state.feed.publication(&post_id).await?;
    ensure_owner(&caller, &existing.user_id)?;

    let request = parse_body(payload)?;
    let updated = state.feed.update_publication(existing.post_id, request).await?;

    Ok(Json(updated.into()))
}

/// DELETE /feed/publications/:id (owner only)
pub async fn delete_publication(
    State(state): State<Arc<AppState>>,
    caller: CallerId,
    Path(post_id): Path<String>,
) -> Result<StatusCode, FeedError> {
    let existing = state.feed.publication(&post_id).await?;
    ensure_owner(&caller, &existing.user_id)?;

    state.feed.delete_publication(existing.post_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /feed/health
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.feed.health().await {
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
