pub mod metrics;
pub mod proxy;

pub use metrics::metrics_handler;
pub use proxy::{
    health_check, not_found, proxy_public, proxy_to_auth, proxy_to_feed, proxy_to_profile,
};
