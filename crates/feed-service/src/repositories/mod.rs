//! Database access layer.

pub mod comments;
pub mod memory;
pub mod publications;

pub use comments::{CommentRepository, PgCommentRepository};
pub use publications::{PgPublicationRepository, PublicationRepository};

/// Embedded migrations for the `publications` and `comments` schema.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
