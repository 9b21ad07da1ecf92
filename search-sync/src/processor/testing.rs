//! In-memory lookups and index used by the unit tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use search_sync_repository::errors::DatabaseError;
use search_sync_repository::{
    EventsRepository, JobsRepository, LookupError, OrganizationsRepository, SearchIndexError,
    SearchIndexProvider,
};
use search_sync_shared::{
    CategoryRecord, DocumentKey, EntityKind, EventRecord, IndexDocument, JobRecord,
    OrganizationRecord, OrganizationSummaryRecord, PrerequisiteRecord,
};
use serde_json::Value;

use crate::loader::SearchLoader;
use crate::processor::{Dispatcher, Reconstructors, SoftDeleteDetector, TrackedTables};

fn updated_at() -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 1)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

pub fn acme_summary() -> OrganizationSummaryRecord {
    OrganizationSummaryRecord {
        id: 7,
        name: "Acme Foundation".to_string(),
        pic_url: Some("https://cdn.example.org/acme.png".to_string()),
    }
}

/// An event of the Acme organization with two categories.
pub fn event_fixture(id: i64) -> EventRecord {
    EventRecord {
        id,
        name: "Summer Fair".to_string(),
        pic_url: Some("https://cdn.example.org/fair.png".to_string()),
        content: Some("Food, music and workshops".to_string()),
        latitude: Some(41.3874),
        longitude: Some(2.1686),
        start_date: NaiveDate::from_ymd_opt(2024, 6, 1),
        end_date: None,
        start_time: NaiveTime::from_hms_opt(18, 30, 0),
        end_time: NaiveTime::from_hms_opt(21, 0, 0),
        location_name: Some("Parc de la Ciutadella".to_string()),
        province: Some("Barcelona".to_string()),
        country: Some("Spain".to_string()),
        location_type: Some("in-person".to_string()),
        audience: Some(200),
        price: Some(0.0),
        updated_at: updated_at(),
        organization: Some(acme_summary()),
        categories: vec![
            CategoryRecord {
                id: 5,
                label: "Music".to_string(),
            },
            CategoryRecord {
                id: 2,
                label: "Art".to_string(),
            },
        ],
    }
}

/// A job of the Acme organization; prerequisites deliberately out of id order.
pub fn job_fixture(id: i64) -> JobRecord {
    JobRecord {
        id,
        title: "Volunteer Coordinator".to_string(),
        pic_url: None,
        scope: Some("Coordinate weekend volunteers".to_string()),
        description: Some("Part-time role".to_string()),
        location_name: Some("Acme HQ".to_string()),
        latitude: Some(41.3874),
        longitude: Some(2.1686),
        province: Some("Barcelona".to_string()),
        country: Some("Spain".to_string()),
        workplace_type: Some("on-site".to_string()),
        work_type: Some("volunteer".to_string()),
        period: Some("weekends".to_string()),
        date_start: NaiveDate::from_ymd_opt(2024, 7, 1),
        date_end: NaiveDate::from_ymd_opt(2024, 9, 30),
        hours_per_day: Some(4),
        qualifications: None,
        benefits: Some("Meals included".to_string()),
        updated_at: updated_at(),
        organization: Some(acme_summary()),
        categories: vec![CategoryRecord {
            id: 3,
            label: "Community".to_string(),
        }],
        prerequisites: vec![
            PrerequisiteRecord {
                id: 2,
                title: "First aid".to_string(),
                link: None,
            },
            PrerequisiteRecord {
                id: 1,
                title: "Driving licence".to_string(),
                link: Some("https://example.org/licence".to_string()),
            },
        ],
    }
}

pub fn organization_fixture(id: i64) -> OrganizationRecord {
    OrganizationRecord {
        id,
        name: "Acme Foundation".to_string(),
        pic_url: Some("https://cdn.example.org/acme.png".to_string()),
        description: Some("Neighbourhood charity".to_string()),
        email: Some("contact@acme.org".to_string()),
        phone: Some("+34 600 000 000".to_string()),
        latitude: Some(41.3874),
        longitude: Some(2.1686),
        province: Some("Barcelona".to_string()),
        country: Some("Spain".to_string()),
        updated_at: updated_at(),
    }
}

/// Relational lookups backed by maps, recording every fetch-by-id.
#[derive(Default)]
pub struct FakeLookups {
    events: Mutex<BTreeMap<i64, EventRecord>>,
    jobs: Mutex<BTreeMap<i64, JobRecord>>,
    organizations: Mutex<BTreeMap<i64, OrganizationRecord>>,
    lookups: Mutex<Vec<(EntityKind, i64)>>,
    fail: AtomicBool,
}

impl FakeLookups {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_event(&self, record: EventRecord) {
        self.events.lock().unwrap().insert(record.id, record);
    }

    pub fn insert_job(&self, record: JobRecord) {
        self.jobs.lock().unwrap().insert(record.id, record);
    }

    pub fn insert_organization(&self, record: OrganizationRecord) {
        self.organizations.lock().unwrap().insert(record.id, record);
    }

    pub fn remove_event(&self, id: i64) {
        self.events.lock().unwrap().remove(&id);
    }

    /// Make every following fetch fail with a database error.
    pub fn fail_with_database_error(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    pub fn lookup_count(&self) -> usize {
        self.lookups.lock().unwrap().len()
    }

    fn fetch<T: Clone>(
        &self,
        map: &Mutex<BTreeMap<i64, T>>,
        kind: EntityKind,
        id: i64,
    ) -> Result<T, LookupError> {
        self.lookups.lock().unwrap().push((kind, id));
        if self.fail.load(Ordering::SeqCst) {
            return Err(LookupError::from(DatabaseError::PoolTimedOut));
        }
        map.lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| LookupError::not_found(kind, id))
    }

    fn page<T>(map: &Mutex<BTreeMap<i64, T>>, after_id: i64, limit: i64) -> Vec<i64> {
        map.lock()
            .unwrap()
            .keys()
            .copied()
            .filter(|id| *id > after_id)
            .take(limit as usize)
            .collect()
    }
}

#[async_trait]
impl EventsRepository for FakeLookups {
    async fn get_event(&self, id: i64) -> Result<EventRecord, LookupError> {
        self.fetch(&self.events, EntityKind::Event, id)
    }

    async fn list_live_event_ids(
        &self,
        after_id: i64,
        limit: i64,
    ) -> Result<Vec<i64>, LookupError> {
        Ok(Self::page(&self.events, after_id, limit))
    }
}

#[async_trait]
impl JobsRepository for FakeLookups {
    async fn get_job(&self, id: i64) -> Result<JobRecord, LookupError> {
        self.fetch(&self.jobs, EntityKind::Job, id)
    }

    async fn list_live_job_ids(&self, after_id: i64, limit: i64) -> Result<Vec<i64>, LookupError> {
        Ok(Self::page(&self.jobs, after_id, limit))
    }
}

#[async_trait]
impl OrganizationsRepository for FakeLookups {
    async fn get_organization(&self, id: i64) -> Result<OrganizationRecord, LookupError> {
        self.fetch(&self.organizations, EntityKind::Organization, id)
    }

    async fn list_live_organization_ids(
        &self,
        after_id: i64,
        limit: i64,
    ) -> Result<Vec<i64>, LookupError> {
        Ok(Self::page(&self.organizations, after_id, limit))
    }
}

/// One call made against the index.
#[derive(Debug, Clone, PartialEq)]
pub enum IndexCall {
    Upsert(IndexDocument),
    Delete(DocumentKey),
}

/// Index writer that records calls and keeps the resulting index state.
#[derive(Default)]
pub struct RecordingIndex {
    calls: Mutex<Vec<IndexCall>>,
    documents: Mutex<HashMap<DocumentKey, Value>>,
    failures_remaining: AtomicUsize,
}

impl RecordingIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject the next `count` writes.
    pub fn fail_next(&self, count: usize) {
        self.failures_remaining.store(count, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<IndexCall> {
        self.calls.lock().unwrap().clone()
    }

    /// The stored document, serialized the way the index receives it.
    pub fn document(&self, key: DocumentKey) -> Option<Value> {
        self.documents.lock().unwrap().get(&key).cloned()
    }

    pub fn document_count(&self) -> usize {
        self.documents.lock().unwrap().len()
    }

    fn injected_failure(&self) -> bool {
        self.failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl SearchIndexProvider for RecordingIndex {
    async fn ensure_indices_exist(&self) -> Result<(), SearchIndexError> {
        Ok(())
    }

    async fn upsert_document(&self, document: &IndexDocument) -> Result<(), SearchIndexError> {
        if self.injected_failure() {
            return Err(SearchIndexError::write("injected failure"));
        }
        self.calls
            .lock()
            .unwrap()
            .push(IndexCall::Upsert(document.clone()));
        let value = serde_json::to_value(document)
            .map_err(|e| SearchIndexError::serialization(e.to_string()))?;
        self.documents.lock().unwrap().insert(document.key(), value);
        Ok(())
    }

    async fn delete_document(&self, key: &DocumentKey) -> Result<(), SearchIndexError> {
        if self.injected_failure() {
            return Err(SearchIndexError::delete("injected failure"));
        }
        self.calls.lock().unwrap().push(IndexCall::Delete(*key));
        self.documents.lock().unwrap().remove(key);
        Ok(())
    }
}

/// A dispatcher over fresh fakes with the default tables and marker column.
pub fn dispatcher_with_fakes() -> (Dispatcher, Arc<FakeLookups>, Arc<RecordingIndex>) {
    let lookups = Arc::new(FakeLookups::new());
    let index = Arc::new(RecordingIndex::new());
    let dispatcher = Dispatcher::new(
        TrackedTables::default(),
        SoftDeleteDetector::default(),
        Reconstructors::new(lookups.clone(), lookups.clone(), lookups.clone()),
        SearchLoader::new(index.clone()),
    );
    (dispatcher, lookups, index)
}
