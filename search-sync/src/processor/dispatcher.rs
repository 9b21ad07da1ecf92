//! Routing of change events to index writes.

use search_sync_shared::{DocumentKey, EntityKind};
use tracing::{debug, instrument};

use crate::consumer::{ChangeEvent, Operation, RowImage};
use crate::errors::IngestError;
use crate::loader::SearchLoader;
use crate::processor::keys::row_id;
use crate::processor::reconstructor::Reconstructors;
use crate::processor::soft_delete::SoftDeleteDetector;
use crate::processor::tables::TrackedTables;

/// What the dispatcher did with one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The source table is not tracked; nothing was read or written.
    Ignored,
    /// A full document was written.
    Upserted(DocumentKey),
    /// The document was removed, by a delete or a soft delete.
    Deleted(DocumentKey),
}

/// Single entry point from decoded change events to the index.
///
/// The dispatcher never retries: every reconstruction or write error goes
/// back to the caller as is.
pub struct Dispatcher {
    tables: TrackedTables,
    soft_delete: SoftDeleteDetector,
    reconstructors: Reconstructors,
    loader: SearchLoader,
}

impl Dispatcher {
    pub fn new(
        tables: TrackedTables,
        soft_delete: SoftDeleteDetector,
        reconstructors: Reconstructors,
        loader: SearchLoader,
    ) -> Self {
        Self {
            tables,
            soft_delete,
            reconstructors,
            loader,
        }
    }

    pub fn loader(&self) -> &SearchLoader {
        &self.loader
    }

    /// Apply one change event to the index.
    #[instrument(
        skip(self, event),
        fields(table = %event.source_table, op = event.operation.code())
    )]
    pub async fn process(&self, event: &ChangeEvent) -> Result<DispatchOutcome, IngestError> {
        let Some(kind) = self.tables.entity_for(&event.source_table) else {
            debug!("Ignoring event from untracked table");
            return Ok(DispatchOutcome::Ignored);
        };

        match event.operation {
            Operation::Delete => {
                let before = image(event.before.as_ref(), "before", event)?;
                self.delete(kind, row_id(before)?).await
            }
            Operation::Create | Operation::Update | Operation::SnapshotRead => {
                let after = image(event.after.as_ref(), "after", event)?;
                let id = row_id(after)?;

                if self.soft_delete.is_soft_deleted(after) {
                    debug!(entity = %kind, id, "Soft delete marker set");
                    return self.delete(kind, id).await;
                }

                let document = self
                    .reconstructors
                    .for_kind(kind)
                    .reconstruct(Some(after), id)
                    .await?;
                self.loader.upsert(&document).await?;
                Ok(DispatchOutcome::Upserted(document.key()))
            }
        }
    }

    async fn delete(&self, kind: EntityKind, id: i64) -> Result<DispatchOutcome, IngestError> {
        let key = DocumentKey::new(kind, id);
        self.loader.delete(key).await?;
        Ok(DispatchOutcome::Deleted(key))
    }
}

fn image<'a>(
    image: Option<&'a RowImage>,
    name: &str,
    event: &ChangeEvent,
) -> Result<&'a RowImage, IngestError> {
    image.ok_or_else(|| {
        IngestError::decode(format!(
            "'{}' event on '{}' has no {} image",
            event.operation.code(),
            event.source_table,
            name
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::testing::{
        dispatcher_with_fakes, event_fixture, organization_fixture, IndexCall,
    };
    use search_sync_shared::{CategoryRef, IndexDocument, OrganizationSummary};
    use serde_json::{json, Value};

    fn row(value: Value) -> RowImage {
        value.as_object().cloned().unwrap()
    }

    fn create(table: &str, after: Value) -> ChangeEvent {
        ChangeEvent::new(Operation::Create, table, None, Some(row(after)))
    }

    fn update(table: &str, after: Value) -> ChangeEvent {
        ChangeEvent::new(Operation::Update, table, None, Some(row(after)))
    }

    fn delete(table: &str, before: Value) -> ChangeEvent {
        ChangeEvent::new(Operation::Delete, table, Some(row(before)), None)
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent() {
        let (dispatcher, lookups, index) = dispatcher_with_fakes();
        lookups.insert_event(event_fixture(3));
        let event = update("events", json!({ "id": 3, "name": "Summer Fair" }));

        dispatcher.process(&event).await.unwrap();
        let key = DocumentKey::new(EntityKind::Event, 3);
        let first = index.document(key).unwrap();

        dispatcher.process(&event).await.unwrap();
        let second = index.document(key).unwrap();

        assert_eq!(
            serde_json::to_vec(&first).unwrap(),
            serde_json::to_vec(&second).unwrap()
        );
        assert_eq!(index.document_count(), 1);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let (dispatcher, _lookups, index) = dispatcher_with_fakes();
        let event = delete("jobs", json!({ "id": 11 }));

        let key = DocumentKey::new(EntityKind::Job, 11);
        assert_eq!(
            dispatcher.process(&event).await.unwrap(),
            DispatchOutcome::Deleted(key)
        );
        assert_eq!(
            dispatcher.process(&event).await.unwrap(),
            DispatchOutcome::Deleted(key)
        );
        assert_eq!(
            index.calls(),
            vec![IndexCall::Delete(key), IndexCall::Delete(key)]
        );
    }

    #[tokio::test]
    async fn test_soft_delete_matches_hard_delete() {
        let (soft, soft_lookups, soft_index) = dispatcher_with_fakes();
        let (hard, hard_lookups, hard_index) = dispatcher_with_fakes();
        for (dispatcher, lookups) in [(&soft, &soft_lookups), (&hard, &hard_lookups)] {
            lookups.insert_event(event_fixture(3));
            dispatcher
                .process(&create("events", json!({ "id": 3 })))
                .await
                .unwrap();
        }

        let soft_outcome = soft
            .process(&update(
                "events",
                json!({ "id": 3, "deleted_at": "2024-05-01T00:00:00Z" }),
            ))
            .await
            .unwrap();
        let hard_outcome = hard
            .process(&delete("events", json!({ "id": 3 })))
            .await
            .unwrap();

        assert_eq!(soft_outcome, hard_outcome);
        assert_eq!(soft_index.calls().last(), hard_index.calls().last());
        assert_eq!(soft_index.document_count(), 0);
        assert_eq!(hard_index.document_count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_table_is_a_no_op() {
        let (dispatcher, lookups, index) = dispatcher_with_fakes();

        for event in [
            create("users", json!({ "id": 1 })),
            delete("roles", json!({ "id": 1 })),
            update("invitations", json!({ "id": "not even numeric" })),
        ] {
            assert_eq!(
                dispatcher.process(&event).await.unwrap(),
                DispatchOutcome::Ignored
            );
        }

        assert_eq!(lookups.lookup_count(), 0);
        assert!(index.calls().is_empty());
    }

    #[tokio::test]
    async fn test_reconstruction_carries_associations() {
        let (dispatcher, lookups, index) = dispatcher_with_fakes();
        lookups.insert_organization(organization_fixture(7));
        lookups.insert_event(event_fixture(3));

        dispatcher
            .process(&create(
                "events",
                json!({ "id": 3, "name": "Summer Fair", "organization_id": 7 }),
            ))
            .await
            .unwrap();

        let calls = index.calls();
        assert_eq!(calls.len(), 1);
        let IndexCall::Upsert(IndexDocument::Event(doc)) = &calls[0] else {
            panic!("expected an event upsert, got {:?}", calls[0]);
        };

        assert_eq!(
            doc.organization,
            Some(OrganizationSummary {
                id: 7,
                name: "Acme Foundation".to_string(),
                pic_url: Some("https://cdn.example.org/acme.png".to_string()),
            })
        );
        assert_eq!(
            doc.categories,
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

    #[tokio::test]
    async fn test_not_found_is_propagated_without_write() {
        let (dispatcher, lookups, index) = dispatcher_with_fakes();

        let err = dispatcher
            .process(&create("jobs", json!({ "id": 99 })))
            .await
            .unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(lookups.lookup_count(), 1);
        assert!(index.calls().is_empty());
    }

    #[tokio::test]
    async fn test_lookup_failure_is_propagated() {
        let (dispatcher, lookups, index) = dispatcher_with_fakes();
        lookups.insert_event(event_fixture(3));
        lookups.fail_with_database_error();

        let err = dispatcher
            .process(&update("events", json!({ "id": 3 })))
            .await
            .unwrap_err();

        assert!(matches!(err, IngestError::LookupError(_)));
        assert!(index.calls().is_empty());
    }

    #[tokio::test]
    async fn test_soft_deleted_event_is_deleted_without_lookup() {
        let (dispatcher, lookups, index) = dispatcher_with_fakes();
        lookups.insert_event(event_fixture(42));

        let outcome = dispatcher
            .process(&update(
                "events",
                json!({
                    "id": 42,
                    "name": "Summer Fair",
                    "deleted_at": "2024-05-01T00:00:00Z"
                }),
            ))
            .await
            .unwrap();

        let key = DocumentKey::new(EntityKind::Event, 42);
        assert_eq!(outcome, DispatchOutcome::Deleted(key));
        assert_eq!(index.calls(), vec![IndexCall::Delete(key)]);
        assert_eq!(lookups.lookup_count(), 0);
    }

    #[tokio::test]
    async fn test_organization_create_combines_image_and_record() {
        let (dispatcher, lookups, index) = dispatcher_with_fakes();
        lookups.insert_organization(organization_fixture(7));

        dispatcher
            .process(&create(
                "organization",
                json!({
                    "id": 7,
                    "org_name": "Acme",
                    "pic_url": "https://cdn.example.org/acme-new.png",
                    "description": "Community projects",
                    "email": "hello@acme.org",
                    "phone": "+34 611 111 111"
                }),
            ))
            .await
            .unwrap();

        let calls = index.calls();
        assert_eq!(calls.len(), 1);
        let IndexCall::Upsert(IndexDocument::Organization(doc)) = &calls[0] else {
            panic!("expected an organization upsert, got {:?}", calls[0]);
        };

        assert_eq!(doc.id, 7);
        assert_eq!(doc.name, "Acme");
        assert_eq!(
            doc.pic_url.as_deref(),
            Some("https://cdn.example.org/acme-new.png")
        );
        assert_eq!(doc.description.as_deref(), Some("Community projects"));
        assert_eq!(doc.email.as_deref(), Some("hello@acme.org"));
        assert_eq!(doc.phone.as_deref(), Some("+34 611 111 111"));
        assert_eq!(doc.latitude, Some(41.3874));
        assert_eq!(doc.longitude, Some(2.1686));
        assert_eq!(doc.province.as_deref(), Some("Barcelona"));
        assert_eq!(doc.country.as_deref(), Some("Spain"));
        assert_eq!(doc.updated_at, "2024-05-01 12:00:00");
    }

    #[tokio::test]
    async fn test_snapshot_read_upserts() {
        let (dispatcher, lookups, index) = dispatcher_with_fakes();
        lookups.insert_event(event_fixture(3));

        let event = ChangeEvent::new(
            Operation::SnapshotRead,
            "events",
            None,
            Some(row(json!({ "id": 3 }))),
        );

        assert_eq!(
            dispatcher.process(&event).await.unwrap(),
            DispatchOutcome::Upserted(DocumentKey::new(EntityKind::Event, 3))
        );
        assert_eq!(index.document_count(), 1);
    }

    #[tokio::test]
    async fn test_undelete_reindexes() {
        let (dispatcher, lookups, index) = dispatcher_with_fakes();
        lookups.insert_event(event_fixture(3));

        dispatcher
            .process(&update("events", json!({ "id": 3, "deleted_at": "2024-05-01" })))
            .await
            .unwrap();
        assert_eq!(index.document_count(), 0);

        dispatcher
            .process(&update("events", json!({ "id": 3, "deleted_at": null })))
            .await
            .unwrap();
        assert_eq!(index.document_count(), 1);
    }

    #[tokio::test]
    async fn test_bad_ids_are_decode_errors() {
        let (dispatcher, lookups, index) = dispatcher_with_fakes();

        for event in [
            create("events", json!({ "id": "42" })),
            update("jobs", json!({ "title": "no id" })),
            delete("organization", json!({ "id": 1.5 })),
        ] {
            let err = dispatcher.process(&event).await.unwrap_err();
            assert!(err.is_decode(), "{:?} should be a decode error", event);
        }

        assert_eq!(lookups.lookup_count(), 0);
        assert!(index.calls().is_empty());
    }

    #[tokio::test]
    async fn test_missing_images_are_decode_errors() {
        let (dispatcher, _lookups, index) = dispatcher_with_fakes();

        let create_without_after = ChangeEvent::new(Operation::Create, "events", None, None);
        let delete_without_before = ChangeEvent::new(Operation::Delete, "events", None, None);

        assert!(dispatcher
            .process(&create_without_after)
            .await
            .unwrap_err()
            .is_decode());
        assert!(dispatcher
            .process(&delete_without_before)
            .await
            .unwrap_err()
            .is_decode());
        assert!(index.calls().is_empty());
    }

    #[tokio::test]
    async fn test_write_failure_is_returned_unchanged() {
        let (dispatcher, lookups, index) = dispatcher_with_fakes();
        lookups.insert_event(event_fixture(3));
        index.fail_next(1);

        let err = dispatcher
            .process(&create("events", json!({ "id": 3 })))
            .await
            .unwrap_err();

        assert!(matches!(err, IngestError::WriteError(_)));
    }

    #[tokio::test]
    async fn test_row_removed_before_processing_stays_not_found() {
        let (dispatcher, lookups, index) = dispatcher_with_fakes();
        lookups.insert_event(event_fixture(3));
        dispatcher
            .process(&create("events", json!({ "id": 3 })))
            .await
            .unwrap();

        lookups.remove_event(3);
        let err = dispatcher
            .process(&update("events", json!({ "id": 3 })))
            .await
            .unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(index.document_count(), 1);
    }
}
