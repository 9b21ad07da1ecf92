//! Processor module for the search sync ingest.
//!
//! Turns change events into index writes: the dispatcher routes each event,
//! the reconstructors rebuild full documents from the relational store, and
//! the soft-delete detector folds logical deletes into deletes.

mod dispatcher;
pub mod keys;
pub mod reconstructor;
mod soft_delete;
mod tables;

#[cfg(test)]
pub(crate) mod testing;

pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use reconstructor::{Reconstructor, Reconstructors};
pub use soft_delete::{SoftDeleteDetector, DEFAULT_SOFT_DELETE_COLUMN};
pub use tables::{
    TrackedTables, DEFAULT_EVENTS_TABLE, DEFAULT_JOBS_TABLE, DEFAULT_ORGANIZATIONS_TABLE,
};
