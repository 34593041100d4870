//! Secret types for protecting sensitive values from accidental logging.
//!
//! Re-exports [`secrecy`] types. `SecretString` implements `Debug` with
//! redaction, so a struct deriving `Debug` over a secret field logs safely.
//! Secrets are zeroized on drop.
//!
//! Use `SecretString` for plaintext passwords in request bodies, the JWT
//! signing secret, the service-to-service token and the database password.
//!
//! ```rust
//! use common::secret::{ExposeSecret, SecretString};
//! use serde::Deserialize;
//!
//! #[derive(Debug, Deserialize)]
//! struct LoginRequest {
//!     username: String,
//!     password: SecretString,
//! }
//!
//! let req: LoginRequest =
//!     serde_json::from_str(r#"{"username": "alice", "password": "hunter22"}"#).unwrap();
//!
//! assert!(!format!("{req:?}").contains("hunter22"));
//! assert_eq!(req.password.expose_secret(), "hunter22");
//! ```

pub use secrecy::{ExposeSecret, SecretBox, SecretString};
