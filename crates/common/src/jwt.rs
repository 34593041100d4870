//! Session token issuance and verification.
//!
//! Tokens are HS256 JWTs signed with a process-wide secret that is loaded once
//! at startup and handed to [`TokenSigner::new`]. The auth service issues
//! them; the gateway verifies them.
//!
//! # Security
//!
//! - Tokens are size-checked BEFORE parsing
//! - Only HS256 is accepted; any other `alg` is rejected as malformed
//! - Zero leeway; expiry is checked by the library and again explicitly
//! - The `sub` field in [`Claims`] is redacted in Debug output

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::{debug, error};

/// Maximum accepted token size in bytes (4KB).
///
/// Typical session tokens are under 300 bytes. Larger inputs are rejected
/// before base64 decoding or signature checks run.
pub const MAX_JWT_SIZE_BYTES: usize = 4096;

/// Session lifetime: tokens expire 24 hours after issue.
pub const TOKEN_LIFETIME_SECONDS: i64 = 24 * 60 * 60;

/// Minimum accepted length of the signing secret in bytes.
pub const MIN_SECRET_BYTES: usize = 32;

/// Session token claims.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject: the user id. Missing subjects decode as empty.
    #[serde(default)]
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

impl fmt::Debug for Claims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Claims")
            .field("sub", &"[REDACTED]")
            .field("iat", &self.iat)
            .field("exp", &self.exp)
            .finish()
    }
}

/// Token failures. Verification failures carry no detail beyond their kind.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    #[error("Malformed token")]
    Malformed,

    #[error("Invalid token signature")]
    BadSignature,

    #[error("Token expired")]
    Expired,

    #[error("Token signing failed")]
    Signing,
}

/// Issues and verifies session tokens with a shared HS256 secret.
#[derive(Clone)]
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSigner")
            .field("secret", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl TokenSigner {
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        let bytes = secret.expose_secret().as_bytes();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
            validation,
        }
    }

    /// Issue a token for `subject`, valid for [`TOKEN_LIFETIME_SECONDS`].
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Signing` if encoding fails.
    pub fn issue(&self, subject: &str) -> Result<String, TokenError> {
        let now = Utc::now().timestamp();
        self.issue_with_times(subject, now, now + TOKEN_LIFETIME_SECONDS)
    }

    /// Issue a token with explicit timestamps.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Signing` if encoding fails.
    pub fn issue_with_times(&self, subject: &str, iat: i64, exp: i64) -> Result<String, TokenError> {
        let claims = Claims {
            sub: subject.to_string(),
            iat,
            exp,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(|e| {
            error!(target: "common.jwt", error = %e, "Token signing failed");
            TokenError::Signing
        })
    }

    /// Verify signature and expiry and return the claims.
    ///
    /// # Errors
    ///
    /// - `TokenError::Malformed` for oversized, unparseable or non-HS256 tokens
    /// - `TokenError::BadSignature` if the signature does not match the secret
    /// - `TokenError::Expired` if `exp` is not in the future
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        if token.len() > MAX_JWT_SIZE_BYTES {
            debug!(
                target: "common.jwt",
                token_size = token.len(),
                max_size = MAX_JWT_SIZE_BYTES,
                "Token rejected: size exceeds maximum"
            );
            return Err(TokenError::Malformed);
        }

        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            debug!(target: "common.jwt", error = %e, "Token rejected");
            match e.kind() {
                ErrorKind::InvalidSignature => TokenError::BadSignature,
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            }
        })?;

        // Checked again here so expiry never depends on library leeway settings.
        if data.claims.exp <= Utc::now().timestamp() {
            return Err(TokenError::Expired);
        }

        Ok(data.claims)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

    fn signer() -> TokenSigner {
        TokenSigner::new(&SecretString::from(
            "test-secret-with-at-least-32-bytes-of-entropy",
        ))
    }

    #[test]
    fn test_issue_then_verify_returns_subject() {
        let signer = signer();
        let token = signer.issue("user-123").unwrap();

        let claims = signer.verify(&token).unwrap();
        assert_eq!(claims.sub, "user-123");
        assert_eq!(claims.exp - claims.iat, TOKEN_LIFETIME_SECONDS);
    }

    #[test]
    fn test_expired_token_with_valid_signature_is_expired() {
        let signer = signer();
        let now = Utc::now().timestamp();
        let token = signer
            .issue_with_times("user-123", now - 7200, now - 3600)
            .unwrap();

        assert_eq!(signer.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_token_expiring_now_is_expired() {
        let signer = signer();
        let now = Utc::now().timestamp();
        let token = signer.issue_with_times("user-123", now - 60, now).unwrap();

        assert_eq!(signer.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_token_from_other_secret_is_bad_signature() {
        let other = TokenSigner::new(&SecretString::from(
            "a-completely-different-secret-of-32-bytes",
        ));
        let token = other.issue("user-123").unwrap();

        assert_eq!(signer().verify(&token), Err(TokenError::BadSignature));
    }

    #[test]
    fn test_garbage_is_malformed() {
        assert_eq!(signer().verify("not-a-jwt"), Err(TokenError::Malformed));
        assert_eq!(signer().verify(""), Err(TokenError::Malformed));
    }

    #[test]
    fn test_oversized_token_is_malformed() {
        let token = "a".repeat(MAX_JWT_SIZE_BYTES + 1);
        assert_eq!(signer().verify(&token), Err(TokenError::Malformed));
    }

    #[test]
    fn test_alg_none_is_rejected() {
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"none","typ":"JWT"}"#);
        let exp = Utc::now().timestamp() + 3600;
        let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"user-123","iat":0,"exp":{exp}}}"#));
        let token = format!("{header}.{payload}.");

        assert_eq!(signer().verify(&token), Err(TokenError::Malformed));
    }

    #[test]
    fn test_missing_subject_decodes_as_empty() {
        let signer = signer();
        let token = signer.issue("").unwrap();

        let claims = signer.verify(&token).unwrap();
        assert!(claims.sub.is_empty());
    }

    #[test]
    fn test_claims_debug_redacts_subject() {
        let claims = Claims {
            sub: "secret-user-id".to_string(),
            iat: 1,
            exp: 2,
        };

        let debug = format!("{claims:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("secret-user-id"));
    }
}
