use async_trait::async_trait;
use search_sync_shared::{EntityKind, OrganizationRecord};
use sqlx::Row;

use super::PostgresRepository;
use crate::errors::LookupError;
use crate::interfaces::OrganizationsRepository;

impl PostgresRepository {
    pub(super) fn select_organization_sql(&self) -> String {
        format!(
            r#"
    SELECT
        o.id::int8 AS id, o.org_name, o.pic_url, o.description, o.email, o.phone,
        o.latitude::float8 AS latitude, o.longitude::float8 AS longitude,
        o.province, o.country, o.updated_at::timestamp AS updated_at
    FROM organization o
    WHERE o.id = $1 AND {}
"#,
            self.live("o")
        )
    }
}

#[async_trait]
impl OrganizationsRepository for PostgresRepository {
    async fn get_organization(&self, id: i64) -> Result<OrganizationRecord, LookupError> {
        let sql = self.select_organization_sql();
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| LookupError::not_found(EntityKind::Organization, id))?;

        Ok(OrganizationRecord {
            id: row.try_get("id")?,
            name: row.try_get("org_name")?,
            pic_url: row.try_get("pic_url")?,
            description: row.try_get("description")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
            latitude: row.try_get("latitude")?,
            longitude: row.try_get("longitude")?,
            province: row.try_get("province")?,
            country: row.try_get("country")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    async fn list_live_organization_ids(
        &self,
        after_id: i64,
        limit: i64,
    ) -> Result<Vec<i64>, LookupError> {
        self.list_live_ids("organization", after_id, limit).await
    }
}
