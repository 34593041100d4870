//! Feed service error types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::store::StoreError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Publication not found")]
    PublicationNotFound,

    #[error("Comment not found")]
    CommentNotFound,

    /// Caller does not own the record.
    #[error("Forbidden")]
    Forbidden,

    /// The author name lookup failed; nothing was written.
    #[error("Profile service unavailable")]
    ProfileUnavailable,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Database unavailable: {0}")]
    Unavailable(String),
}

impl FeedError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            FeedError::Validation(_) => StatusCode::BAD_REQUEST,
            FeedError::PublicationNotFound | FeedError::CommentNotFound => StatusCode::NOT_FOUND,
            FeedError::Forbidden => StatusCode::FORBIDDEN,
            FeedError::ProfileUnavailable => StatusCode::BAD_GATEWAY,
            FeedError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            FeedError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Translate a store error raised while working on publications.
    pub fn for_publication(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => FeedError::PublicationNotFound,
            other => Self::from_store(other),
        }
    }

    /// Translate a store error raised while working on comments.
    pub fn for_comment(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => FeedError::CommentNotFound,
            other => Self::from_store(other),
        }
    }

    fn from_store(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => FeedError::PublicationNotFound,
            // Ids are generated server-side; a duplicate means something is badly wrong.
            StoreError::Conflict(constraint) => {
                FeedError::Database(format!("unexpected unique violation on {constraint}"))
            }
            StoreError::Backend(e) => FeedError::Database(e),
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for FeedError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            FeedError::Validation(reason) => reason.clone(),
            FeedError::PublicationNotFound => "publication not found".to_string(),
            FeedError::CommentNotFound => "comment not found".to_string(),
            FeedError::Forbidden => "forbidden".to_string(),
            FeedError::ProfileUnavailable => "profile service unavailable".to_string(),
            FeedError::Unavailable(reason) => {
                tracing::warn!(target: "feed.availability", reason = %reason, "Database unavailable");
                "database unavailable".to_string()
            }
            FeedError::Database(err) => {
                tracing::error!(target: "feed.database", error = %err, "Database operation failed");
                "internal server error".to_string()
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::body::Body;
    use http_body_util::BodyExt;

    async fn read_body_json(body: Body) -> serde_json::Value {
        let bytes = body.collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_not_found_depends_on_entity() {
        assert!(matches!(
            FeedError::for_publication(StoreError::NotFound),
            FeedError::PublicationNotFound
        ));
        assert!(matches!(
            FeedError::for_comment(StoreError::NotFound),
            FeedError::CommentNotFound
        ));
        assert!(matches!(
            FeedError::for_comment(StoreError::Backend("x".to_string())),
            FeedError::Database(_)
        ));
    }

    #[tokio::test]
    async fn test_profile_unavailable_is_bad_gateway() {
        let response = FeedError::ProfileUnavailable.into_response();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = read_body_json(response.into_body()).await;
        assert_eq!(body["error"], "profile service unavailable");
    }

    #[tokio::test]
    async fn test_database_error_is_generic() {
        let response = FeedError::Database("deadlock detected".to_string()).into_response();

        let body = read_body_json(response.into_body()).await;
        assert_eq!(body["error"], "internal server error");
    }
}
