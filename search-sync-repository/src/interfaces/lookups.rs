//! Relational lookup traits.
//!
//! One trait per tracked entity. Each read returns the row with its
//! associations loaded in the same call, or `LookupError::NotFound` when no
//! live row exists for the id.

use async_trait::async_trait;
use search_sync_shared::{EventRecord, JobRecord, OrganizationRecord};

use crate::errors::LookupError;

/// Read access to events, with organization and categories preloaded.
#[async_trait]
pub trait EventsRepository: Send + Sync {
    /// Fetch one event by primary key.
    async fn get_event(&self, id: i64) -> Result<EventRecord, LookupError>;

    /// List ids of live events greater than `after_id`, ascending, at most `limit`.
    async fn list_live_event_ids(&self, after_id: i64, limit: i64)
        -> Result<Vec<i64>, LookupError>;
}

/// Read access to jobs, with organization, categories and prerequisites preloaded.
#[async_trait]
pub trait JobsRepository: Send + Sync {
    /// Fetch one job by primary key.
    async fn get_job(&self, id: i64) -> Result<JobRecord, LookupError>;

    /// List ids of live jobs greater than `after_id`, ascending, at most `limit`.
    async fn list_live_job_ids(&self, after_id: i64, limit: i64) -> Result<Vec<i64>, LookupError>;
}

/// Read access to organizations.
#[async_trait]
pub trait OrganizationsRepository: Send + Sync {
    /// Fetch one organization by primary key.
    async fn get_organization(&self, id: i64) -> Result<OrganizationRecord, LookupError>;

    /// List ids of live organizations greater than `after_id`, ascending, at most `limit`.
    async fn list_live_organization_ids(
        &self,
        after_id: i64,
        limit: i64,
    ) -> Result<Vec<i64>, LookupError>;
}
