pub mod auth_service;
pub mod profile_client;

pub use auth_service::AuthService;
pub use profile_client::{HttpProfileProvisioner, ProfileProvisioner};
