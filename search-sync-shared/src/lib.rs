//! # Search Sync Shared
//!
//! This crate defines the data structures shared across the search sync
//! ecosystem: the denormalized documents written to the search indices, the
//! relational records the documents are rebuilt from, and the date/time
//! formatting used by both the index and the REST API.

pub mod format;
pub mod types;

pub use types::documents::{
    CategoryRef, EventDocument, JobDocument, OrganizationDocument, OrganizationSummary,
    PrerequisiteRef,
};
pub use types::entity_kind::EntityKind;
pub use types::index_document::{DocumentKey, IndexDocument};
pub use types::records::{
    CategoryRecord, EventRecord, JobRecord, OrganizationRecord, OrganizationSummaryRecord,
    PrerequisiteRecord,
};
