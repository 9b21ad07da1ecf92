use std::sync::Arc;

use async_trait::async_trait;
use search_sync_repository::EventsRepository;
use search_sync_shared::{
    format::{format_optional_date, format_optional_time, format_timestamp},
    EntityKind, EventDocument, EventRecord, IndexDocument,
};
use tracing::debug;

use super::{category_refs, organization_summary, Reconstructor};
use crate::consumer::RowImage;
use crate::errors::IngestError;

/// Shape an events document from a relational record.
///
/// Every scalar comes from the record, so dates and times are formatted the
/// same way as the organization and categories read alongside them.
pub fn event_document(record: EventRecord) -> EventDocument {
    EventDocument {
        id: record.id,
        name: record.name,
        pic_url: record.pic_url,
        content: record.content,
        latitude: record.latitude,
        longitude: record.longitude,
        start_date: format_optional_date(record.start_date.as_ref()),
        end_date: format_optional_date(record.end_date.as_ref()),
        start_time: format_optional_time(record.start_time.as_ref()),
        end_time: format_optional_time(record.end_time.as_ref()),
        location_name: record.location_name,
        province: record.province,
        country: record.country,
        location_type: record.location_type,
        organization: organization_summary(record.organization),
        categories: category_refs(record.categories),
        audience: record.audience,
        price: record.price,
        updated_at: format_timestamp(&record.updated_at),
    }
}

/// Rebuilds events documents.
#[derive(Clone)]
pub struct EventReconstructor {
    lookup: Arc<dyn EventsRepository>,
}

impl EventReconstructor {
    pub fn new(lookup: Arc<dyn EventsRepository>) -> Self {
        Self { lookup }
    }
}

#[async_trait]
impl Reconstructor for EventReconstructor {
    fn kind(&self) -> EntityKind {
        EntityKind::Event
    }

    async fn reconstruct(
        &self,
        _after: Option<&RowImage>,
        id: i64,
    ) -> Result<IndexDocument, IngestError> {
        let record = self.lookup.get_event(id).await?;
        debug!(id, categories = record.categories.len(), "Reconstructing event");
        Ok(IndexDocument::Event(event_document(record)))
    }

    async fn list_live_ids(&self, after_id: i64, limit: i64) -> Result<Vec<i64>, IngestError> {
        Ok(self.lookup.list_live_event_ids(after_id, limit).await?)
    }
}
