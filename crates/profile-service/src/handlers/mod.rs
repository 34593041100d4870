//! HTTP request handlers for the profile service.

pub mod metrics;
pub mod profile_handler;

pub use metrics::metrics_handler;
pub use profile_handler::{
    create_profile, delete_own_profile, delete_profile, get_own_profile, get_profile,
    health_check, update_own_profile, update_profile,
};
