//! Gateway error types.
//!
//! Authentication failures are 401 with `WWW-Authenticate: Bearer`. Proxy
//! failures never reveal which backend or why.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Missing or malformed Authorization header")]
    MissingToken,

    /// Bad signature or unparseable.
    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    ExpiredToken,

    #[error("Token contains no subject")]
    NoSubject,

    /// The auth service no longer knows the subject.
    #[error("User not found")]
    UserNotFound,

    /// The auth service could not be reached.
    #[error("Cannot verify user")]
    VerificationUnavailable,

    /// The auth service answered with something other than 200 or 404.
    #[error("User verification failed")]
    VerificationFailed,

    #[error("Request body too large")]
    PayloadTooLarge,

    #[error("Upstream unavailable: {0}")]
    Upstream(String),

    #[error("Not found")]
    NotFound,
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::MissingToken
            | GatewayError::InvalidToken
            | GatewayError::ExpiredToken
            | GatewayError::NoSubject
            | GatewayError::UserNotFound
            | GatewayError::VerificationUnavailable
            | GatewayError::VerificationFailed => StatusCode::UNAUTHORIZED,
            GatewayError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            GatewayError::Upstream(_) => StatusCode::BAD_GATEWAY,
            GatewayError::NotFound => StatusCode::NOT_FOUND,
        }
    }

    /// Metrics label for an authentication decision.
    pub fn auth_outcome(&self) -> &'static str {
        match self {
            GatewayError::MissingToken => "missing_token",
            GatewayError::InvalidToken => "invalid_token",
            GatewayError::ExpiredToken => "expired",
            GatewayError::NoSubject => "no_subject",
            GatewayError::UserNotFound => "user_not_found",
            GatewayError::VerificationUnavailable | GatewayError::VerificationFailed => {
                "verification_failed"
            }
            GatewayError::PayloadTooLarge | GatewayError::Upstream(_) | GatewayError::NotFound => {
                "other"
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            GatewayError::MissingToken => "missing or malformed Authorization header",
            GatewayError::InvalidToken | GatewayError::ExpiredToken => "invalid token",
            GatewayError::NoSubject => "token contains no subject",
            GatewayError::UserNotFound => "user not found",
            GatewayError::VerificationUnavailable => "cannot verify user",
            GatewayError::VerificationFailed => "user verification failed",
            GatewayError::PayloadTooLarge => "request body too large",
            GatewayError::Upstream(err) => {
                tracing::warn!(target: "gateway.proxy", error = %err, "Upstream request failed");
                "upstream unavailable"
            }
            GatewayError::NotFound => "not found",
        };

        let mut response = (status, Json(ErrorResponse { error: message })).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}
