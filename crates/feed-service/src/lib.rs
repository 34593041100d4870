//! Feed service library.
//!
//! Owns publications and comments. Author names are looked up from the
//! profile service when a record is written.

pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
