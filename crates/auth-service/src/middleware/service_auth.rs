//! Service-to-service authorization for internal endpoints.
//!
//! Internal callers present the shared secret in `X-Service-Token`. The
//! comparison runs over HMAC tags so it takes the same time whatever prefix of
//! the secret the caller got right.

use crate::errors::AuthError;
use crate::routes::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use common::identity::SERVICE_TOKEN_HEADER;
use common::secret::{ExposeSecret, SecretString};
use ring::hmac;
use ring::rand::SystemRandom;
use std::fmt;
use std::sync::Arc;

/// Holds a per-process HMAC key and the tag of the expected token.
#[derive(Clone)]
pub struct ServiceTokenGuard {
    key: hmac::Key,
    expected: hmac::Tag,
}

impl fmt::Debug for ServiceTokenGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceTokenGuard").finish_non_exhaustive()
    }
}

impl ServiceTokenGuard {
    /// # Errors
    ///
    /// Returns `AuthError::Internal` if the system RNG is unavailable.
    pub fn new(token: &SecretString) -> Result<Self, AuthError> {
        let key = hmac::Key::generate(hmac::HMAC_SHA256, &SystemRandom::new())
            .map_err(|_| AuthError::Internal("Failed to generate HMAC key".to_string()))?;
        let expected = hmac::sign(&key, token.expose_secret().as_bytes());

        Ok(Self { key, expected })
    }

    /// Constant-time check of a presented token.
    pub fn accepts(&self, presented: &str) -> bool {
        hmac::verify(&self.key, presented.as_bytes(), self.expected.as_ref()).is_ok()
    }
}

/// Rejects the request with 401 unless `X-Service-Token` matches.
pub async fn require_service_token(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let presented = req
        .headers()
        .get(SERVICE_TOKEN_HEADER)
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthError::ServiceUnauthorized)?;

    if !state.service_guard.accepts(presented) {
        tracing::warn!(target: "auth.service_token", "Rejected internal call with wrong service token");
        return Err(AuthError::ServiceUnauthorized);
    }

    Ok(next.run(req).await)
}
