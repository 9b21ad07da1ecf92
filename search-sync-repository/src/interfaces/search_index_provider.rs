//! Search index provider trait definition.
//!
//! This module defines the index writer interface, allowing for different
//! backend implementations (OpenSearch, Elasticsearch, in-memory fakes).

use async_trait::async_trait;
use search_sync_shared::{DocumentKey, IndexDocument};

use crate::errors::SearchIndexError;

/// Abstracts the underlying search index implementation.
///
/// Every document is addressed by its relational primary key, rendered as a
/// string, inside the index of its entity kind. Both writes are idempotent:
/// upserting the same document twice leaves one identical document, and
/// deleting an id twice (or an id that was never indexed) succeeds.
///
/// # Index Initialization
///
/// Implementations should call `ensure_indices_exist` during application
/// start-up so the three indices and their aliases are in place before any
/// document operation.
#[async_trait]
pub trait SearchIndexProvider: Send + Sync {
    /// Ensure the events, jobs and organizations indices and their aliases
    /// exist, creating them if necessary.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the indices are ready for use
    /// * `Err(SearchIndexError)` - If initialization fails
    async fn ensure_indices_exist(&self) -> Result<(), SearchIndexError>;

    /// Write a full document, replacing any existing document with the same id.
    ///
    /// The stored document is overwritten, never merged: fields absent from
    /// `document` do not survive from a previous version.
    ///
    /// # Arguments
    ///
    /// * `document` - The document; its variant selects the target index
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the document was written
    /// * `Err(SearchIndexError)` - If the backend rejected the write
    async fn upsert_document(&self, document: &IndexDocument) -> Result<(), SearchIndexError>;

    /// Delete a document by id.
    ///
    /// If the document doesn't exist, the operation is considered successful.
    ///
    /// # Arguments
    ///
    /// * `key` - The entity kind and primary key of the document
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the document was deleted (or didn't exist)
    /// * `Err(SearchIndexError)` - If the deletion fails
    async fn delete_document(&self, key: &DocumentKey) -> Result<(), SearchIndexError>;
}
