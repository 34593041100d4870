//! Comment handlers.

use super::{ensure_owner, parse_body};
use crate::errors::FeedError;
use crate::models::{CommentRequest, CommentResponse, CommentsQuery, UpdateCommentRequest};
use crate::routes::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use common::identity::CallerId;
use std::sync::Arc;

/// POST /feed/comments
pub async fn create_comment(
    State(state): State<Arc<AppState>>,
    caller: CallerId,
    payload: Result<Json<CommentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CommentResponse>), FeedError> {
    let request = parse_body(payload)?;
    let comment = state.feed.create_comment(caller.as_str(), request).await?;

    Ok((StatusCode::CREATED, Json(comment.into())))
}

/// GET /feed/comments?post_id=
pub async fn list_comments(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CommentsQuery>,
) -> Result<Json<Vec<CommentResponse>>, FeedError> {
    let post_id = query
        .post_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| FeedError::Validation("missing post_id query parameter".to_string()))?;

    let comments = state.feed.list_comments(&post_id).await?;
    Ok(Json(comments.into_iter().map(CommentResponse::from).collect()))
}

/// GET /feed/comments/:id
pub async fn get_comment(
    State(state): State<Arc<AppState>>,
    Path(comment_id): Path<String>,
) -> Result<Json<CommentResponse>, FeedError> {
    Ok(Json(state.feed.comment(&comment_id).await?.into()))
}

/// PUT /feed/comments/:id (owner only)
pub async fn update_comment(
    State(state): State<Arc<AppState>>,
    caller: CallerId,
    Path(comment_id): Path<String>,
    payload: Result<Json<UpdateCommentRequest>, JsonRejection>,
) -> Result<Json<CommentResponse>, FeedError> {
    let existing = state.feed.comment(&comment_id).await?;
    ensure_owner(&caller, &existing.user_id)?;

    let request = parse_body(payload)?;
    let updated = state
        .feed
        .update_comment(existing.comment_id, &request.content)
        .await?;

    Ok(Json(updated.into()))
}

/// DELETE /feed/comments/:id (owner only)
pub async fn delete_comment(
    State(state): State<Arc<AppState>>,
    caller: CallerId,
    Path(comment_id): Path<String>,
) -> Result<StatusCode, FeedError> {
    let existing = state.feed.comment(&comment_id).await?;
    ensure_owner(&caller, &existing.user_id)?;

    state.feed.delete_comment(existing.comment_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
