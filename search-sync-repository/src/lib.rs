//! # Search Sync Repository
//!
//! This crate provides the two collaborators the synchronization engine
//! consumes: the index writer (`SearchIndexProvider`) and the relational
//! lookups (`EventsRepository`, `JobsRepository`, `OrganizationsRepository`).
//! It includes concrete implementations for OpenSearch and PostgreSQL.

pub mod errors;
pub mod interfaces;
pub mod opensearch;
pub mod postgres;

pub use errors::{LookupError, SearchIndexError};
pub use interfaces::{EventsRepository, JobsRepository, OrganizationsRepository, SearchIndexProvider};
pub use opensearch::OpenSearchProvider;
pub use postgres::PostgresRepository;
