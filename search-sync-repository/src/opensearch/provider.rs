//! OpenSearch provider implementation.
//!
//! This module provides the concrete implementation of `SearchIndexProvider`
//! using the OpenSearch Rust crate.

use async_trait::async_trait;
use opensearch::{
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    indices::{IndicesCreateParts, IndicesExistsAliasParts},
    DeleteParts, IndexParts, OpenSearch,
};
use search_sync_shared::{DocumentKey, EntityKind, IndexDocument};
use tracing::{debug, error, info};
use url::Url;

use crate::errors::SearchIndexError;
use crate::interfaces::SearchIndexProvider;
use crate::opensearch::index_config::{get_index_body, IndexConfig};

/// OpenSearch provider implementation.
///
/// Writes whole documents with the `index` API so an existing document is
/// replaced, never merged.
///
/// # Example
///
/// ```ignore
/// use search_sync_repository::opensearch::IndexConfig;
/// let provider = OpenSearchProvider::new("http://localhost:9200", IndexConfig::default()).await?;
/// provider.ensure_indices_exist().await?;
/// provider.upsert_document(&IndexDocument::Organization(doc)).await?;
/// ```
pub struct OpenSearchProvider {
    client: OpenSearch,
    index_config: IndexConfig,
}

impl OpenSearchProvider {
    /// Create a new OpenSearch provider connected to the specified URL.
    ///
    /// # Arguments
    ///
    /// * `url` - The OpenSearch server URL (e.g., "http://localhost:9200")
    /// * `index_config` - Aliases and version of the three indices
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchProvider)` - A new provider instance
    /// * `Err(SearchIndexError)` - If connection setup fails
    pub async fn new(url: &str, index_config: IndexConfig) -> Result<Self, SearchIndexError> {
        let parsed_url =
            Url::parse(url).map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let transport = TransportBuilder::new(conn_pool)
            .disable_proxy()
            .build()
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let client = OpenSearch::new(transport);

        info!(
            url = %url,
            events_alias = %index_config.events_alias,
            jobs_alias = %index_config.jobs_alias,
            organizations_alias = %index_config.organizations_alias,
            version = index_config.version,
            "Created OpenSearch provider"
        );

        Ok(Self {
            client,
            index_config,
        })
    }

    /// Whether an error body reports an index that already exists.
    ///
    /// Two replicas starting together may race to create the same index; the
    /// loser sees this error and can carry on.
    fn is_already_exists(body: &str) -> bool {
        body.contains("resource_already_exists_exception")
    }

    async fn ensure_index_exists(&self, kind: EntityKind) -> Result<(), SearchIndexError> {
        let alias = self.index_config.alias(kind);

        let exists = self
            .client
            .indices()
            .exists_alias(IndicesExistsAliasParts::Name(&[alias]))
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        if exists.status_code().is_success() {
            debug!(alias = %alias, "Index alias already exists");
            return Ok(());
        }

        let index_name = self.index_config.versioned_index_name(kind);
        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(&index_name))
            .body(get_index_body(kind, alias))
            .send()
            .await
            .map_err(|e| SearchIndexError::index_creation(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            if Self::is_already_exists(&error_body) {
                debug!(index = %index_name, "Index created concurrently");
                return Ok(());
            }
            error!(status = %status, body = %error_body, "Index creation failed");
            return Err(SearchIndexError::index_creation(format!(
                "Creating {} failed with status {}: {}",
                index_name, status, error_body
            )));
        }

        info!(index = %index_name, alias = %alias, "Created index");
        Ok(())
    }
}

#[async_trait]
impl SearchIndexProvider for OpenSearchProvider {
    async fn ensure_indices_exist(&self) -> Result<(), SearchIndexError> {
        for kind in EntityKind::ALL {
            self.ensure_index_exists(kind).await?;
        }
        Ok(())
    }

    /// Replace the document stored under the document's id.
    ///
    /// API reference: https://docs.opensearch.org/latest/api-reference/document-apis/index-document/
    async fn upsert_document(&self, document: &IndexDocument) -> Result<(), SearchIndexError> {
        let alias = self.index_config.alias(document.kind());
        let doc_id = document.document_id();

        let body = serde_json::to_value(document)
            .map_err(|e| SearchIndexError::serialization(e.to_string()))?;

        let response = self
            .client
            .index(IndexParts::IndexId(alias, &doc_id))
            .body(body)
            .send()
            .await
            .map_err(|e| SearchIndexError::write(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Index request failed");
            return Err(SearchIndexError::write(format!(
                "Index failed with status {}: {}",
                status, error_body
            )));
        }

        debug!(index = %alias, doc_id = %doc_id, "Document indexed");
        Ok(())
    }

    async fn delete_document(&self, key: &DocumentKey) -> Result<(), SearchIndexError> {
        let alias = self.index_config.alias(key.kind);
        let doc_id = key.document_id();

        let response = self
            .client
            .delete(DeleteParts::IndexId(alias, &doc_id))
            .send()
            .await
            .map_err(|e| SearchIndexError::delete(e.to_string()))?;

        let status = response.status_code();

        // 404 is acceptable - document may not exist
        if !status.is_success() && status.as_u16() != 404 {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Delete request failed");
            return Err(SearchIndexError::delete(format!(
                "Delete failed with status {}: {}",
                status, error_body
            )));
        }

        debug!(index = %alias, doc_id = %doc_id, "Document deleted");
        Ok(())
    }
}
