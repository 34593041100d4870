//! Identity headers shared by the gateway and the backend services.
//!
//! The gateway verifies the caller's session token and forwards the subject
//! in `X-User-ID`. Backends trust that header and extract it with
//! [`CallerId`]. Privileged service-to-service calls carry `X-Service-Token`.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Header carrying the authenticated caller's user id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Header carrying the shared service-to-service secret.
pub const SERVICE_TOKEN_HEADER: &str = "x-service-token";

/// The caller's user id, taken from `X-User-ID`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerId(pub String);

impl CallerId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Rejection when `X-User-ID` is absent or blank.
#[derive(Debug)]
pub struct MissingCallerId;

impl IntoResponse for MissingCallerId {
    fn into_response(self) -> Response {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "missing X-User-ID header" })),
        )
            .into_response()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CallerId
where
    S: Send + Sync,
{
    type Rejection = MissingCallerId;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| CallerId(v.to_string()))
            .ok_or(MissingCallerId)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, routing::get, Router};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    async fn echo(caller: CallerId) -> String {
        caller.0
    }

    fn app() -> Router {
        Router::new().route("/", get(echo))
    }

    #[tokio::test]
    async fn test_caller_id_extracted_from_header() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header("X-User-ID", "user-42")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(body.as_ref(), b"user-42");
    }

    #[tokio::test]
    async fn test_missing_header_is_bad_request() {
        let response = app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "missing X-User-ID header");
    }

    #[tokio::test]
    async fn test_blank_header_is_bad_request() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header("X-User-ID", "  ")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
