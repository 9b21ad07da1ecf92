//! Search index error types.
//!
//! This module defines the error type for all index writer operations.

use thiserror::Error;

/// Errors from search index operations.
///
/// Used by the `SearchIndexProvider` trait. A delete of a missing document is
/// never an error, so there is no not-found variant here.
#[derive(Debug, Clone, Error)]
pub enum SearchIndexError {
    /// Failed to establish connection to the search index backend.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Failed to create an index or its alias.
    #[error("Index creation error: {0}")]
    IndexCreationError(String),

    /// The backend rejected an upsert.
    #[error("Write error: {0}")]
    WriteError(String),

    /// The backend rejected a delete.
    #[error("Delete error: {0}")]
    DeleteError(String),

    /// Failed to serialize a document for the backend.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl SearchIndexError {
    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create an index creation error.
    pub fn index_creation(msg: impl Into<String>) -> Self {
        Self::IndexCreationError(msg.into())
    }

    /// Create a write error.
    pub fn write(msg: impl Into<String>) -> Self {
        Self::WriteError(msg.into())
    }

    /// Create a delete error.
    pub fn delete(msg: impl Into<String>) -> Self {
        Self::DeleteError(msg.into())
    }

    /// Create a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::SerializationError(msg.into())
    }
}
