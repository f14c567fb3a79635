use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use crate::application::access::Scope;
use crate::application::dto::filters::ResidentFilter;
use crate::application::dto::pagination::{Page, PageRequest};
use crate::application::ports::resident_repository::{NewResident, ResidentRepository};
use crate::domain::residents::resident::{CareHomeRef, Resident};
use crate::infrastructure::db::{
    PgPool, SCOPE_FILTER, contains_pattern, map_db_error, scope_binds,
};

const RESIDENT_SELECT: &str = r#"
    SELECT r.id, r.name, r.date_of_birth, r.created_by, r.created_at, r.updated_at,
           c.id AS carehome_id, c.name AS carehome_name
    FROM residents r
    JOIN carehomes c ON c.id = r.carehome_id"#;

/// Shared by the page query and its count.
const LIST_FILTER: &str = r#"($3::text IS NULL OR r.name ILIKE $3 ESCAPE '\')"#;

pub struct SqlxResidentRepository {
    pub pool: PgPool,
}

impl SqlxResidentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch(&self, id: Uuid) -> anyhow::Result<Option<Resident>> {
        let sql = format!("{RESIDENT_SELECT} WHERE r.id = $1");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(resident_from_row))
    }
}

pub(crate) fn resident_from_row(r: &PgRow) -> Resident {
    Resident {
        id: r.get("id"),
        name: r.get("name"),
        date_of_birth: r.get("date_of_birth"),
        carehome: CareHomeRef {
            id: r.get("carehome_id"),
            name: r.get("carehome_name"),
        },
        created_by: r.get("created_by"),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    }
}

#[async_trait]
impl ResidentRepository for SqlxResidentRepository {
    async fn list(
        &self,
        scope: Scope,
        filter: &ResidentFilter,
        page: PageRequest,
    ) -> anyhow::Result<Page<Resident>> {
        let (kind, subject) = scope_binds(scope);
        let search = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(contains_pattern);

        let count_sql = format!(
            r#"SELECT COUNT(*) AS total
               FROM residents r
               JOIN carehomes c ON c.id = r.carehome_id
               WHERE {SCOPE_FILTER} AND {LIST_FILTER}"#
        );
        let total: i64 = sqlx::query(&count_sql)
            .bind(kind)
            .bind(subject)
            .bind(search.as_deref())
            .fetch_one(&self.pool)
            .await?
            .get("total");

        let sql = format!(
            r#"{RESIDENT_SELECT}
               WHERE {SCOPE_FILTER} AND {LIST_FILTER}
               ORDER BY r.name ASC, r.id ASC
               LIMIT $4 OFFSET $5"#
        );
        let rows = sqlx::query(&sql)
            .bind(kind)
            .bind(subject)
            .bind(search.as_deref())
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;
        Ok(Page::new(page, total, rows.iter().map(resident_from_row).collect()))
    }

    async fn get(&self, scope: Scope, id: Uuid) -> anyhow::Result<Option<Resident>> {
        let (kind, subject) = scope_binds(scope);
        let sql = format!("{RESIDENT_SELECT} WHERE r.id = $3 AND {SCOPE_FILTER}");
        let row = sqlx::query(&sql)
            .bind(kind)
            .bind(subject)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(resident_from_row))
    }

    async fn create(&self, resident: NewResident) -> anyhow::Result<Resident> {
        let row = sqlx::query(
            r#"INSERT INTO residents (name, date_of_birth, carehome_id, created_by)
               VALUES ($1, $2, $3, $4) RETURNING id"#,
        )
        .bind(&resident.name)
        .bind(resident.date_of_birth)
        .bind(resident.carehome_id)
        .bind(resident.created_by)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;
        let id: Uuid = row.get("id");
        self.fetch(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("resident {id} vanished after insert"))
    }

    async fn update(&self, resident: &Resident) -> anyhow::Result<Option<Resident>> {
        let res = sqlx::query(
            "UPDATE residents SET name = $2, date_of_birth = $3, updated_at = now() WHERE id = $1",
        )
        .bind(resident.id)
        .bind(&resident.name)
        .bind(resident.date_of_birth)
        .execute(&self.pool)
        .await?;
        if res.rows_affected() == 0 {
            return Ok(None);
        }
        self.fetch(resident.id).await
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM residents WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(res.rows_affected() > 0)
    }
}
