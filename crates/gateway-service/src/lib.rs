//! Gateway library.
//!
//! Terminates public traffic. Protected requests are authenticated against
//! the session token and a live user check, then forwarded to the auth,
//! profile or feed service with `X-User-ID` set.

pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod services;
