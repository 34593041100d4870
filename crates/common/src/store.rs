//! Store error taxonomy.
//!
//! Repositories report failures as [`StoreError`] regardless of backend. The
//! Postgres mapping reads the driver's structured constraint signal rather
//! than matching on error text, so the in-memory stores used in tests and the
//! relational stores surface duplicates identically. A foreign-key violation means
//! the referenced parent row is gone, which reads as `NotFound`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Record not found")]
    NotFound,

    /// A uniqueness constraint rejected the write; carries the constraint name.
    #[error("Unique constraint violated: {0}")]
    Conflict(String),

    #[error("Store backend error: {0}")]
    Backend(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                StoreError::Conflict(db_err.constraint().unwrap_or("unique").to_string())
            }
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                StoreError::NotFound
            }
            other => StoreError::Backend(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::error::{DatabaseError, ErrorKind};
    use std::error::Error as StdError;

    #[derive(Debug)]
    struct ConstraintError {
        kind: ErrorKind,
        constraint: &'static str,
    }

    impl std::fmt::Display for ConstraintError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "violates constraint {}", self.constraint)
        }
    }

    impl StdError for ConstraintError {}

    impl DatabaseError for ConstraintError {
        fn message(&self) -> &str {
            "constraint violated"
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }

        fn constraint(&self) -> Option<&str> {
            Some(self.constraint)
        }

        fn kind(&self) -> ErrorKind {
            match self.kind {
                ErrorKind::UniqueViolation => ErrorKind::UniqueViolation,
                ErrorKind::ForeignKeyViolation => ErrorKind::ForeignKeyViolation,
                _ => ErrorKind::Other,
            }
        }
    }

    fn database_error(kind: ErrorKind, constraint: &'static str) -> sqlx::Error {
        sqlx::Error::Database(Box::new(ConstraintError { kind, constraint }))
    }

    #[test]
    fn test_unique_violation_maps_to_conflict() {
        let err = StoreError::from(database_error(ErrorKind::UniqueViolation, "users_email_key"));
        assert!(matches!(err, StoreError::Conflict(ref c) if c == "users_email_key"));
    }

    #[test]
    fn test_foreign_key_violation_maps_to_not_found() {
        let err = StoreError::from(database_error(
            ErrorKind::ForeignKeyViolation,
            "comments_post_id_fkey",
        ));
        assert!(matches!(err, StoreError::NotFound));
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        assert!(matches!(
            StoreError::from(sqlx::Error::RowNotFound),
            StoreError::NotFound
        ));
    }

    #[test]
    fn test_other_errors_map_to_backend() {
        let err = StoreError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, StoreError::Backend(_)));
    }

    #[test]
    fn test_display() {
        assert_eq!(
            StoreError::Conflict("users_email_key".to_string()).to_string(),
            "Unique constraint violated: users_email_key"
        );
        assert_eq!(StoreError::NotFound.to_string(), "Record not found");
    }
}
