//! Interface definitions for the consumed collaborators.
//!
//! The traits allow dependency injection of the index writer and the
//! relational lookups, so the engine can be exercised with in-memory fakes.

mod lookups;
mod search_index_provider;

pub use lookups::{EventsRepository, JobsRepository, OrganizationsRepository};
pub use search_index_provider::SearchIndexProvider;
