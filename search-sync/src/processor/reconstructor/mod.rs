//! Document reconstruction.
//!
//! A change event only carries the changed row's own columns. A reconstructor
//! re-reads the row through its relational lookup, with associations loaded in
//! the same call, and shapes the denormalized document written to the index.

mod events;
mod jobs;
mod organizations;

use std::sync::Arc;

use async_trait::async_trait;
use search_sync_repository::{EventsRepository, JobsRepository, OrganizationsRepository};
use search_sync_shared::{
    CategoryRecord, CategoryRef, EntityKind, IndexDocument, OrganizationSummary,
    OrganizationSummaryRecord,
};

use crate::consumer::RowImage;
use crate::errors::IngestError;

pub use events::{event_document, EventReconstructor};
pub use jobs::{job_document, JobReconstructor};
pub use organizations::{organization_document, OrganizationImage, OrganizationReconstructor};

/// Builds full documents for one entity kind.
#[async_trait]
pub trait Reconstructor: Send + Sync {
    /// The entity kind this reconstructor builds.
    fn kind(&self) -> EntityKind;

    /// Build the document for `id`.
    ///
    /// `after` is the event's after image when there is one; a bulk rebuild
    /// passes `None` and every field comes from the relational read.
    ///
    /// # Errors
    ///
    /// * `IngestError::NotFound` - No live row exists for `id`
    /// * `IngestError::LookupError` - The relational read failed
    /// * `IngestError::DecodeError` - A column of `after` has the wrong type
    async fn reconstruct(
        &self,
        after: Option<&RowImage>,
        id: i64,
    ) -> Result<IndexDocument, IngestError>;

    /// Live primary keys greater than `after_id`, ascending, at most `limit`.
    async fn list_live_ids(&self, after_id: i64, limit: i64) -> Result<Vec<i64>, IngestError>;
}

/// The three reconstructors, one per tracked entity kind.
#[derive(Clone)]
pub struct Reconstructors {
    events: EventReconstructor,
    jobs: JobReconstructor,
    organizations: OrganizationReconstructor,
}

impl Reconstructors {
    pub fn new(
        events: Arc<dyn EventsRepository>,
        jobs: Arc<dyn JobsRepository>,
        organizations: Arc<dyn OrganizationsRepository>,
    ) -> Self {
        Self {
            events: EventReconstructor::new(events),
            jobs: JobReconstructor::new(jobs),
            organizations: OrganizationReconstructor::new(organizations),
        }
    }

    pub fn for_kind(&self, kind: EntityKind) -> &dyn Reconstructor {
        match kind {
            EntityKind::Event => &self.events,
            EntityKind::Job => &self.jobs,
            EntityKind::Organization => &self.organizations,
        }
    }
}

fn organization_summary(record: Option<OrganizationSummaryRecord>) -> Option<OrganizationSummary> {
    record.map(|org| OrganizationSummary {
        id: org.id,
        name: org.name,
        pic_url: org.pic_url,
    })
}

fn category_refs(records: Vec<CategoryRecord>) -> Vec<CategoryRef> {
    let mut records = records;
    records.sort_by_key(|category| category.id);
    records
        .into_iter()
        .map(|category| CategoryRef {
            value: category.id,
            label: category.label,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_refs_are_ordered_by_id() {
        let refs = category_refs(vec![
            CategoryRecord {
                id: 5,
                label: "Music".to_string(),
            },
            CategoryRecord {
                id: 2,
                label: "Art".to_string(),
            },
        ]);
        assert_eq!(
            refs,
            vec![
                CategoryRef {
                    value: 2,
                    label: "Art".to_string()
                },
                CategoryRef {
                    value: 5,
                    label: "Music".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_missing_organization_summary() {
        assert!(organization_summary(None).is_none());
    }
}
