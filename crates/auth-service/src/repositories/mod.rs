//! Database access layer.
//!
//! Repositories are reached only through their traits so the orchestrator
//! can run against Postgres in production and [`memory`] stores in tests.

pub mod memory;
pub mod users;

pub use users::{PgUserRepository, UserRepository};

/// Embedded migrations for the `users` schema.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
