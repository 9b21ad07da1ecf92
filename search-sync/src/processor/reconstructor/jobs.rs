use std::sync::Arc;

use async_trait::async_trait;
use search_sync_repository::JobsRepository;
use search_sync_shared::{
    format::{format_optional_date, format_timestamp},
    EntityKind, IndexDocument, JobDocument, JobRecord, PrerequisiteRef,
};
use tracing::debug;

use super::{category_refs, organization_summary, Reconstructor};
use crate::consumer::RowImage;
use crate::errors::IngestError;

/// Shape a jobs document from a relational record.
pub fn job_document(record: JobRecord) -> JobDocument {
    let mut prerequisites = record.prerequisites;
    prerequisites.sort_by_key(|prerequisite| prerequisite.id);

    JobDocument {
        id: record.id,
        title: record.title,
        pic_url: record.pic_url,
        scope: record.scope,
        description: record.description,
        location_name: record.location_name,
        latitude: record.latitude,
        longitude: record.longitude,
        province: record.province,
        country: record.country,
        workplace_type: record.workplace_type,
        work_type: record.work_type,
        period: record.period,
        date_start: format_optional_date(record.date_start.as_ref()),
        date_end: format_optional_date(record.date_end.as_ref()),
        hours_per_day: record.hours_per_day,
        qualifications: record.qualifications,
        benefits: record.benefits,
        organization: organization_summary(record.organization),
        categories: category_refs(record.categories),
        prerequisites: prerequisites
            .into_iter()
            .map(|prerequisite| PrerequisiteRef {
                title: prerequisite.title,
                link: prerequisite.link,
            })
            .collect(),
        updated_at: format_timestamp(&record.updated_at),
    }
}

/// Rebuilds jobs documents.
#[derive(Clone)]
pub struct JobReconstructor {
    lookup: Arc<dyn JobsRepository>,
}

impl JobReconstructor {
    pub fn new(lookup: Arc<dyn JobsRepository>) -> Self {
        Self { lookup }
    }
}

#[async_trait]
impl Reconstructor for JobReconstructor {
    fn kind(&self) -> EntityKind {
        EntityKind::Job
    }

    async fn reconstruct(
        &self,
        _after: Option<&RowImage>,
        id: i64,
    ) -> Result<IndexDocument, IngestError> {
        let record = self.lookup.get_job(id).await?;
        debug!(
            id,
            categories = record.categories.len(),
            prerequisites = record.prerequisites.len(),
            "Reconstructing job"
        );
        Ok(IndexDocument::Job(job_document(record)))
    }

    async fn list_live_ids(&self, after_id: i64, limit: i64) -> Result<Vec<i64>, IngestError> {
        Ok(self.lookup.list_live_job_ids(after_id, limit).await?)
    }
}
