//! Auth service library.
//!
//! Owns user accounts: registration (with profile provisioning and rollback),
//! login, and user lookup and deletion.
//!
//! # Modules
//!
//! - `config` - Service configuration
//! - `errors` - Error types and their HTTP mapping
//! - `handlers` - HTTP request handlers
//! - `middleware` - Service-token guard for internal endpoints
//! - `models` - Data models
//! - `repositories` - User persistence (Postgres and in-memory)
//! - `routes` - Router assembly
//! - `services` - Business logic and the profile service client

pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
