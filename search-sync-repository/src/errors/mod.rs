//! Error types for the search sync repository.
//!
//! One error type per collaborator: the index writer and the relational lookups.

mod lookup_error;
mod search_index_error;

pub use lookup_error::LookupError;
pub use search_index_error::SearchIndexError;

/// The underlying database driver error carried by `LookupError::DatabaseError`.
pub type DatabaseError = sqlx::Error;
