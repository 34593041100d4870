//! Database access layer.

pub mod memory;
pub mod profiles;

pub use profiles::{PgProfileRepository, ProfileChanges, ProfileRepository};

/// Embedded migrations for the `profiles` schema.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
