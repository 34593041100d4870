//! Bearer authentication for protected routes.
//!
//! A request passes only if its token verifies AND the auth service still
//! knows the subject. The verified subject is stored in request extensions
//! as [`AuthenticatedUser`] for the proxy handlers.

use crate::errors::GatewayError;
use crate::routes::AppState;
use crate::services::UserStatus;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use common::jwt::TokenError;
use common::peer::PeerError;
use common::observability::metrics::record_auth_decision;
use std::sync::Arc;
use tracing::{debug, instrument};

/// The verified caller of a protected request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: String,
}

/// Token from `Authorization: Bearer <token>`. The scheme is case-insensitive.
fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, GatewayError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(GatewayError::MissingToken)?;

    let (scheme, token) = value.split_once(' ').ok_or(GatewayError::MissingToken)?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(GatewayError::MissingToken);
    }
    Ok(token)
}

async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<String, GatewayError> {
    let token = extract_bearer_token(headers)?;

    let claims = state.tokens.verify(token).map_err(|e| match e {
        TokenError::Expired => GatewayError::ExpiredToken,
        _ => GatewayError::InvalidToken,
    })?;

    // The signed subject is checked and forwarded byte for byte.
    if claims.sub.trim().is_empty() {
        return Err(GatewayError::NoSubject);
    }

    let status = state.verifier.check(&claims.sub).await;
    match status {
        Ok(UserStatus::Exists) => Ok(claims.sub),
        Ok(UserStatus::Missing) => Err(GatewayError::UserNotFound),
        Err(PeerError::Status(_)) => Err(GatewayError::VerificationFailed),
        Err(_) => Err(GatewayError::VerificationUnavailable),
    }
}

/// Reject the request with 401 unless the bearer token names a live user.
#[instrument(skip_all, name = "gateway.middleware.require_user")]
pub async fn require_user(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, GatewayError> {
    match authenticate(&state, req.headers()).await {
        Ok(user_id) => {
            record_auth_decision("allowed");
            req.extensions_mut().insert(AuthenticatedUser { user_id });
            Ok(next.run(req).await)
        }
        Err(err) => {
            record_auth_decision(err.auth_outcome());
            debug!(target: "gateway.middleware.auth", error = %err, "Request rejected");
            Err(err)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn with_auth(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token(&with_auth("Bearer abc")).unwrap(), "abc");
        assert_eq!(extract_bearer_token(&with_auth("bearer abc")).unwrap(), "abc");
    }

    #[test]
    fn test_extract_bearer_token_rejects_malformed() {
        for value in ["Basic abc", "Bearer", "Bearer   ", "abc"] {
            assert!(
                matches!(
                    extract_bearer_token(&with_auth(value)),
                    Err(GatewayError::MissingToken)
                ),
                "{value} should be rejected"
            );
        }
        assert!(extract_bearer_token(&HeaderMap::new()).is_err());
    }
}
