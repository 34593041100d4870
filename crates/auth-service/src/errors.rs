//! Auth service error types.
//!
//! All errors map to HTTP status codes via the `IntoResponse` impl and render
//! as `{"error": "<message>"}`. Database and internal details are logged
//! server-side; clients receive a generic message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::store::StoreError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Email or username already in use")]
    EmailOrUsernameTaken,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    #[error("Service unauthorized")]
    ServiceUnauthorized,

    /// Profile provisioning failed during registration; the user row was rolled back.
    #[error("Profile provisioning failed")]
    ProfileProvisioningFailed,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Database unavailable: {0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Validation(_) => StatusCode::BAD_REQUEST,
            AuthError::EmailOrUsernameTaken => StatusCode::CONFLICT,
            AuthError::InvalidCredentials | AuthError::ServiceUnauthorized => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::UserNotFound => StatusCode::NOT_FOUND,
            AuthError::ProfileProvisioningFailed => StatusCode::BAD_GATEWAY,
            AuthError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AuthError::Database(_) | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            AuthError::Validation(reason) => reason.clone(),
            AuthError::EmailOrUsernameTaken => "email or username already in use".to_string(),
            AuthError::InvalidCredentials => "invalid credentials".to_string(),
            AuthError::UserNotFound => "user not found".to_string(),
            AuthError::ServiceUnauthorized => "service unauthorized".to_string(),
            AuthError::ProfileProvisioningFailed => "profile service unavailable".to_string(),
            AuthError::Unavailable(reason) => {
                tracing::warn!(target: "auth.availability", reason = %reason, "Database unavailable");
                "database unavailable".to_string()
            }
            AuthError::Database(err) => {
                tracing::error!(target: "auth.database", error = %err, "Database operation failed");
                "internal server error".to_string()
            }
            AuthError::Internal(err) => {
                tracing::error!(target: "auth.internal", error = %err, "Internal error");
                "internal server error".to_string()
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

/// Store errors translated at the service boundary.
impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => AuthError::UserNotFound,
            StoreError::Conflict(_) => AuthError::EmailOrUsernameTaken,
            StoreError::Backend(e) => AuthError::Database(e),
        }
    }
}
