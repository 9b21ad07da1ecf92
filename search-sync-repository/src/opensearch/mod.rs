//! OpenSearch implementation of the search index provider.
//!
//! This module provides a concrete implementation of `SearchIndexProvider`
//! using OpenSearch as the backend.

mod index_config;
mod provider;

pub use index_config::{
    get_index_body, IndexConfig, DEFAULT_EVENTS_ALIAS, DEFAULT_JOBS_ALIAS,
    DEFAULT_ORGANIZATIONS_ALIAS,
};
pub use provider::OpenSearchProvider;
