//! Loader module for the search sync ingest.
//!
//! Writes documents to the search index. Every call reaches the index before
//! it returns, so the orchestrator only commits offsets for writes that landed.

use std::sync::Arc;
use tracing::{debug, error, instrument};

use crate::errors::IngestError;
use search_sync_repository::SearchIndexProvider;
use search_sync_shared::{DocumentKey, IndexDocument};

/// Loader that applies upserts and deletes to the search index.
#[derive(Clone)]
pub struct SearchLoader {
    provider: Arc<dyn SearchIndexProvider>,
}

impl SearchLoader {
    /// Create a new search loader with the given provider.
    pub fn new(provider: Arc<dyn SearchIndexProvider>) -> Self {
        Self { provider }
    }

    /// Create the indices and aliases if they are missing.
    pub async fn ensure_indices(&self) -> Result<(), IngestError> {
        self.provider.ensure_indices_exist().await.map_err(|e| {
            error!(error = %e, "Failed to ensure indices exist");
            IngestError::from(e)
        })
    }

    /// Replace the stored document with `document`.
    #[instrument(skip(self, document), fields(entity = %document.kind(), id = document.id()))]
    pub async fn upsert(&self, document: &IndexDocument) -> Result<(), IngestError> {
        match self.provider.upsert_document(document).await {
            Ok(()) => {
                debug!("Document upserted");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Failed to upsert document");
                Err(e.into())
            }
        }
    }

    /// Remove the document addressed by `key`; a missing document is not an error.
    #[instrument(skip(self), fields(entity = %key.kind, id = key.id))]
    pub async fn delete(&self, key: DocumentKey) -> Result<(), IngestError> {
        match self.provider.delete_document(&key).await {
            Ok(()) => {
                debug!("Document deleted");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Failed to delete document");
                Err(e.into())
            }
        }
    }
}
