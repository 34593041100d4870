//! Profile service error types.
//!
//! Every error renders as `{"error": "<message>"}`. Store details are logged,
//! never returned.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::store::StoreError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Profile already exists")]
    AlreadyExists,

    #[error("Profile not found")]
    NotFound,

    /// Caller is not the owner of the profile.
    #[error("Forbidden")]
    Forbidden,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Database unavailable: {0}")]
    Unavailable(String),
}

impl ProfileError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProfileError::Validation(_) => StatusCode::BAD_REQUEST,
            ProfileError::AlreadyExists => StatusCode::CONFLICT,
            ProfileError::NotFound => StatusCode::NOT_FOUND,
            ProfileError::Forbidden => StatusCode::FORBIDDEN,
            ProfileError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ProfileError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for ProfileError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            ProfileError::Validation(reason) => reason.clone(),
            ProfileError::AlreadyExists => "profile already exists".to_string(),
            ProfileError::NotFound => "profile not found".to_string(),
            ProfileError::Forbidden => "forbidden".to_string(),
            ProfileError::Unavailable(reason) => {
                tracing::warn!(target: "profile.availability", reason = %reason, "Database unavailable");
                "database unavailable".to_string()
            }
            ProfileError::Database(err) => {
                tracing::error!(target: "profile.database", error = %err, "Database operation failed");
                "internal server error".to_string()
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<StoreError> for ProfileError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ProfileError::NotFound,
            StoreError::Conflict(_) => ProfileError::AlreadyExists,
            StoreError::Backend(e) => ProfileError::Database(e),
        }
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
    fn test_store_error_translation() {
        assert!(matches!(
            ProfileError::from(StoreError::NotFound),
            ProfileError::NotFound
        ));
        assert!(matches!(
            ProfileError::from(StoreError::Conflict("profiles_pkey".to_string())),
            ProfileError::AlreadyExists
        ));
        assert!(matches!(
            ProfileError::from(StoreError::Backend("boom".to_string())),
            ProfileError::Database(_)
        ));
    }

    #[tokio::test]
    async fn test_forbidden_response() {
        let response = ProfileError::Forbidden.into_response();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = read_body_json(response.into_body()).await;
        assert_eq!(body, serde_json::json!({ "error": "forbidden" }));
    }

    #[tokio::test]
    async fn test_database_error_is_generic() {
        let response = ProfileError::Database("connection reset".to_string()).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = read_body_json(response.into_body()).await;
        assert_eq!(body["error"], "internal server error");
    }
}
