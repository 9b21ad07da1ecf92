//! Index-level wrappers around the three document variants.

use serde::Serialize;

use crate::types::documents::{EventDocument, JobDocument, OrganizationDocument};
use crate::types::entity_kind::EntityKind;

/// A full document routed to the index of its kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum IndexDocument {
    Event(EventDocument),
    Job(JobDocument),
    Organization(OrganizationDocument),
}

impl IndexDocument {
    /// The entity kind, which selects the target index.
    pub fn kind(&self) -> EntityKind {
        match self {
            IndexDocument::Event(_) => EntityKind::Event,
            IndexDocument::Job(_) => EntityKind::Job,
            IndexDocument::Organization(_) => EntityKind::Organization,
        }
    }

    /// The relational primary key.
    pub fn id(&self) -> i64 {
        match self {
            IndexDocument::Event(doc) => doc.id,
            IndexDocument::Job(doc) => doc.id,
            IndexDocument::Organization(doc) => doc.id,
        }
    }

    /// The index document identifier: the primary key as a string.
    pub fn document_id(&self) -> String {
        self.id().to_string()
    }

    /// The key-only form of this document.
    pub fn key(&self) -> DocumentKey {
        DocumentKey::new(self.kind(), self.id())
    }
}

/// A key-only document: enough to address a delete-by-id.
///
/// Hard deletes and soft deletes both reduce to this shape, so both end in the
/// same index effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentKey {
    pub kind: EntityKind,
    pub id: i64,
}

impl DocumentKey {
    pub fn new(kind: EntityKind, id: i64) -> Self {
        Self { kind, id }
    }

    /// The index document identifier: the primary key as a string.
    pub fn document_id(&self) -> String {
        self.id.to_string()
    }
}
