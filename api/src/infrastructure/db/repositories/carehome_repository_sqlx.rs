use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use crate::application::access::Scope;
use crate::application::ports::carehome_repository::{CareHomeRepository, NewCareHome};
use crate::domain::carehomes::carehome::CareHome;
use crate::infrastructure::db::{PgPool, SCOPE_FILTER, map_db_error, scope_binds};

const CAREHOME_COLUMNS: &str = "c.id, c.name, c.code, c.admin_id, c.address, c.created_at, c.updated_at";

pub struct SqlxCareHomeRepository {
    pub pool: PgPool,
}

impl SqlxCareHomeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

pub(crate) fn carehome_from_row(r: &PgRow) -> CareHome {
    CareHome {
        id: r.get("id"),
        name: r.get("name"),
        code: r.get("code"),
        admin_id: r.get("admin_id"),
        address: r.get("address"),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    }
}

#[async_trait]
impl CareHomeRepository for SqlxCareHomeRepository {
    async fn list(&self, scope: Scope) -> anyhow::Result<Vec<CareHome>> {
        let (kind, subject) = scope_binds(scope);
        let sql = format!(
            "SELECT {CAREHOME_COLUMNS} FROM carehomes c WHERE {SCOPE_FILTER} ORDER BY c.name ASC"
        );
        let rows = sqlx::query(&sql)
            .bind(kind)
            .bind(subject)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(carehome_from_row).collect())
    }

    async fn get(&self, scope: Scope, id: Uuid) -> anyhow::Result<Option<CareHome>> {
        let (kind, subject) = scope_binds(scope);
        let sql = format!(
            "SELECT {CAREHOME_COLUMNS} FROM carehomes c WHERE c.id = $3 AND {SCOPE_FILTER}"
        );
        let row = sqlx::query(&sql)
            .bind(kind)
            .bind(subject)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(carehome_from_row))
    }

    async fn name_and_address_taken(
        &self,
        name: &str,
        address: &str,
        exclude: Option<Uuid>,
    ) -> anyhow::Result<bool> {
        let row = sqlx::query(
            r#"SELECT EXISTS(
                 SELECT 1 FROM carehomes
                 WHERE name = $1 AND address = $2 AND ($3::uuid IS NULL OR id <> $3)
               ) AS taken"#,
        )
        .bind(name)
        .bind(address)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.get("taken"))
    }

    async fn create(&self, home: NewCareHome) -> anyhow::Result<CareHome> {
        let sql = format!(
            r#"INSERT INTO carehomes AS c (name, code, address, admin_id)
               VALUES ($1, $2, $3, $4)
               RETURNING {CAREHOME_COLUMNS}"#
        );
        let row = sqlx::query(&sql)
            .bind(&home.name)
            .bind(&home.code)
            .bind(&home.address)
            .bind(home.admin_id)
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(carehome_from_row(&row))
    }

    async fn update(&self, home: &CareHome) -> anyhow::Result<Option<CareHome>> {
        let sql = format!(
            r#"UPDATE carehomes AS c
               SET name = $2, address = $3, admin_id = $4, updated_at = now()
               WHERE c.id = $1
               RETURNING {CAREHOME_COLUMNS}"#
        );
        let row = sqlx::query(&sql)
            .bind(home.id)
            .bind(&home.name)
            .bind(&home.address)
            .bind(home.admin_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(row.as_ref().map(carehome_from_row))
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM carehomes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(res.rows_affected() > 0)
    }

    async fn first_for_admin(&self, admin_id: Uuid) -> anyhow::Result<Option<CareHome>> {
        let sql = format!(
            "SELECT {CAREHOME_COLUMNS} FROM carehomes c WHERE c.admin_id = $1 ORDER BY c.created_at ASC LIMIT 1"
        );
        let row = sqlx::query(&sql)
            .bind(admin_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(carehome_from_row))
    }
}
