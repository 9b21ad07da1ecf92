use async_trait::async_trait;
use search_sync_shared::{EntityKind, EventRecord};
use sqlx::Row;
use tracing::debug;

use super::{load_categories, organization_summary, PostgresRepository};
use crate::errors::LookupError;
use crate::interfaces::EventsRepository;

impl PostgresRepository {
    pub(super) fn select_event_sql(&self) -> String {
        format!(
            r#"
    SELECT
        e.id::int8 AS id, e.name, e.pic_url, e.content,
        e.latitude::float8 AS latitude, e.longitude::float8 AS longitude,
        e.start_date, e.end_date, e.start_time, e.end_time,
        e.location_name, e.province, e.country, e.location_type,
        e.audience::int4 AS audience, e.price::float8 AS price,
        e.updated_at::timestamp AS updated_at,
        o.id::int8 AS org_id, o.org_name AS org_name, o.pic_url AS org_pic_url
    FROM events e
    LEFT JOIN organization o ON o.id = e.organization_id AND {}
    WHERE e.id = $1 AND {}
"#,
            self.live("o"),
            self.live("e")
        )
    }
}

#[async_trait]
impl EventsRepository for PostgresRepository {
    async fn get_event(&self, id: i64) -> Result<EventRecord, LookupError> {
        let mut tx = self.begin_snapshot().await?;

        let sql = self.select_event_sql();
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| LookupError::not_found(EntityKind::Event, id))?;

        let organization = organization_summary(&row)?;
        let categories = load_categories(&mut tx, "event_categories", "event_id", id).await?;

        let record = EventRecord {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            pic_url: row.try_get("pic_url")?,
            content: row.try_get("content")?,
            latitude: row.try_get("latitude")?,
            longitude: row.try_get("longitude")?,
            start_date: row.try_get("start_date")?,
            end_date: row.try_get("end_date")?,
            start_time: row.try_get("start_time")?,
            end_time: row.try_get("end_time")?,
            location_name: row.try_get("location_name")?,
            province: row.try_get("province")?,
            country: row.try_get("country")?,
            location_type: row.try_get("location_type")?,
            audience: row.try_get("audience")?,
            price: row.try_get("price")?,
            updated_at: row.try_get("updated_at")?,
            organization,
            categories,
        };

        tx.commit().await?;

        debug!(id, categories = record.categories.len(), "Loaded event");
        Ok(record)
    }

    async fn list_live_event_ids(
        &self,
        after_id: i64,
        limit: i64,
    ) -> Result<Vec<i64>, LookupError> {
        self.list_live_ids("events", after_id, limit).await
    }
}
