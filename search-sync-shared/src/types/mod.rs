//! Core data structures shared by the consumer, processor and repository crates.

pub mod documents;
pub mod entity_kind;
pub mod index_document;
pub mod records;
