pub mod proxy;
pub mod user_verifier;

pub use proxy::{ProxyClient, Upstream};
pub use user_verifier::{HttpUserVerifier, UserStatus, UserVerifier};
