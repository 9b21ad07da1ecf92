//! Relational lookup error types.

use search_sync_shared::EntityKind;
use thiserror::Error;

/// Errors from the relational lookups.
///
/// `NotFound` is kept apart from database failures: it means the row does not
/// exist (or is soft-deleted) at read time, which callers must not confuse
/// with a transient failure.
#[derive(Debug, Error)]
pub enum LookupError {
    /// No live row with this primary key.
    #[error("{entity} {id} not found")]
    NotFound { entity: EntityKind, id: i64 },

    /// The database rejected the query or a column could not be decoded.
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    /// A configured column name is not a plain SQL identifier.
    #[error("Invalid column name: {0:?}")]
    InvalidColumn(String),
}

impl LookupError {
    /// Create a not-found error.
    pub fn not_found(entity: EntityKind, id: i64) -> Self {
        Self::NotFound { entity, id }
    }

    /// Whether this error is a not-found condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = LookupError::not_found(EntityKind::Event, 42);
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "event 42 not found");
    }

    #[test]
    fn test_invalid_column_display() {
        let err = LookupError::InvalidColumn("x; drop".to_string());
        assert!(!err.is_not_found());
        assert_eq!(err.to_string(), "Invalid column name: \"x; drop\"");
    }

    #[test]
    fn test_database_error_is_not_not_found() {
        let err = LookupError::from(sqlx::Error::RowNotFound);
        assert!(!err.is_not_found());
    }
}
