use async_trait::async_trait;
use search_sync_shared::{EntityKind, JobRecord, PrerequisiteRecord};
use sqlx::{Postgres, Row, Transaction};
use tracing::debug;

use super::{load_categories, organization_summary, PostgresRepository};
use crate::errors::LookupError;
use crate::interfaces::JobsRepository;

impl PostgresRepository {
    pub(super) fn select_job_sql(&self) -> String {
        format!(
            r#"
    SELECT
        j.id::int8 AS id, j.title, j.pic_url, j.scope, j.description,
        j.location_name, j.latitude::float8 AS latitude, j.longitude::float8 AS longitude,
        j.province, j.country, j.workplace_type, j.work_type, j.period,
        j.date_start, j.date_end, j.hours_per_day::int4 AS hours_per_day,
        j.qualifications, j.benefits, j.updated_at::timestamp AS updated_at,
        o.id::int8 AS org_id, o.org_name AS org_name, o.pic_url AS org_pic_url
    FROM jobs j
    LEFT JOIN organization o ON o.id = j.organization_id AND {}
    WHERE j.id = $1 AND {}
"#,
            self.live("o"),
            self.live("j")
        )
    }
}

const SELECT_PREREQUISITES: &str = r#"
    SELECT id::int8 AS id, title, link
    FROM prerequisites
    WHERE job_id = $1
    ORDER BY id
"#;

async fn load_prerequisites(
    tx: &mut Transaction<'static, Postgres>,
    job_id: i64,
) -> Result<Vec<PrerequisiteRecord>, LookupError> {
    let rows = sqlx::query(SELECT_PREREQUISITES)
        .bind(job_id)
        .fetch_all(&mut **tx)
        .await?;

    rows.iter()
        .map(|row| {
            Ok(PrerequisiteRecord {
                id: row.try_get("id")?,
                title: row.try_get("title")?,
                link: row.try_get("link")?,
            })
        })
        .collect()
}

#[async_trait]
impl JobsRepository for PostgresRepository {
    async fn get_job(&self, id: i64) -> Result<JobRecord, LookupError> {
        let mut tx = self.begin_snapshot().await?;

        let sql = self.select_job_sql();
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| LookupError::not_found(EntityKind::Job, id))?;

        let organization = organization_summary(&row)?;
        let categories = load_categories(&mut tx, "job_categories", "job_id", id).await?;
        let prerequisites = load_prerequisites(&mut tx, id).await?;

        let record = JobRecord {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            pic_url: row.try_get("pic_url")?,
            scope: row.try_get("scope")?,
            description: row.try_get("description")?,
            location_name: row.try_get("location_name")?,
            latitude: row.try_get("latitude")?,
            longitude: row.try_get("longitude")?,
            province: row.try_get("province")?,
            country: row.try_get("country")?,
            workplace_type: row.try_get("workplace_type")?,
            work_type: row.try_get("work_type")?,
            period: row.try_get("period")?,
            date_start: row.try_get("date_start")?,
            date_end: row.try_get("date_end")?,
            hours_per_day: row.try_get("hours_per_day")?,
            qualifications: row.try_get("qualifications")?,
            benefits: row.try_get("benefits")?,
            updated_at: row.try_get("updated_at")?,
            organization,
            categories,
            prerequisites,
        };

        tx.commit().await?;

        debug!(
            id,
            categories = record.categories.len(),
            prerequisites = record.prerequisites.len(),
            "Loaded job"
        );
        Ok(record)
    }

    async fn list_live_job_ids(&self, after_id: i64, limit: i64) -> Result<Vec<i64>, LookupError> {
        self.list_live_ids("jobs", after_id, limit).await
    }
}
