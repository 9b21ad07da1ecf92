use std::sync::Arc;

use async_trait::async_trait;
use search_sync_repository::OrganizationsRepository;
use search_sync_shared::{
    format::format_timestamp, EntityKind, IndexDocument, OrganizationDocument, OrganizationRecord,
};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::debug;

use super::Reconstructor;
use crate::consumer::RowImage;
use crate::errors::IngestError;

/// Deserialize a column that is present in the image, even when its value is null.
///
/// Paired with `#[serde(default)]`, an absent column becomes `None` and a
/// present one `Some(value)`, so `Some(None)` records an explicit null.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// The display columns of an `organization` after image.
///
/// Other columns in the image are ignored.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
pub struct OrganizationImage {
    #[serde(default, deserialize_with = "present")]
    pub org_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub pic_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub phone: Option<Option<String>>,
}

impl OrganizationImage {
    /// Parse the display columns out of an after image.
    pub fn parse(after: &RowImage) -> Result<Self, IngestError> {
        serde_json::from_value(Value::Object(after.clone()))
            .map_err(|e| IngestError::decode(format!("Malformed organization image: {}", e)))
    }
}

/// Shape an organizations document.
///
/// Display fields come from the after image when the column is present there
/// and from the record otherwise; location fields and `updatedAt` always come
/// from the record.
pub fn organization_document(
    image: &OrganizationImage,
    record: OrganizationRecord,
) -> OrganizationDocument {
    OrganizationDocument {
        id: record.id,
        name: image.org_name.clone().flatten().unwrap_or(record.name),
        pic_url: image.pic_url.clone().unwrap_or(record.pic_url),
        description: image.description.clone().unwrap_or(record.description),
        email: image.email.clone().unwrap_or(record.email),
        phone: image.phone.clone().unwrap_or(record.phone),
        latitude: record.latitude,
        longitude: record.longitude,
        province: record.province,
        country: record.country,
        updated_at: format_timestamp(&record.updated_at),
    }
}

/// Rebuilds organizations documents.
#[derive(Clone)]
pub struct OrganizationReconstructor {
    lookup: Arc<dyn OrganizationsRepository>,
}

impl OrganizationReconstructor {
    pub fn new(lookup: Arc<dyn OrganizationsRepository>) -> Self {
        Self { lookup }
    }
}

#[async_trait]
impl Reconstructor for OrganizationReconstructor {
    fn kind(&self) -> EntityKind {
        EntityKind::Organization
    }

    async fn reconstruct(
        &self,
        after: Option<&RowImage>,
        id: i64,
    ) -> Result<IndexDocument, IngestError> {
        let image = match after {
            Some(after) => OrganizationImage::parse(after)?,
            None => OrganizationImage::default(),
        };

        let record = self.lookup.get_organization(id).await?;
        debug!(id, "Reconstructing organization");
        Ok(IndexDocument::Organization(organization_document(
            &image, record,
        )))
    }

    async fn list_live_ids(&self, after_id: i64, limit: i64) -> Result<Vec<i64>, IngestError> {
        Ok(self
            .lookup
            .list_live_organization_ids(after_id, limit)
            .await?)
    }
}
