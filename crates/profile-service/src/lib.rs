//! Profile service library.
//!
//! Owns user-facing profile data. Reads attach the user's publications from
//! the feed service; deletes cascade to the auth service.

pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
