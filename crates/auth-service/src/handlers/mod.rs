//! HTTP request handlers for the auth service.

pub mod auth_handler;
pub mod metrics;

pub use auth_handler::{delete_user, get_user, health_check, login, register};
pub use metrics::metrics_handler;
