use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use super::carehome_repository_sqlx::carehome_from_row;
use super::user_repository_sqlx::user_from_row;
use crate::application::access::Scope;
use crate::application::ports::carehome_manager_repository::CareHomeManagerRepository;
use crate::domain::carehomes::carehome::{
    CareHome, CareHomeSummary, ManagerAssignment, ManagerSummary,
};
use crate::domain::users::user::User;
use crate::infrastructure::db::{PgPool, SCOPE_FILTER, map_db_error, scope_binds};

const ASSIGNMENT_SELECT: &str = r#"
    SELECT a.id, a.created_at,
           u.id AS manager_id, u.email AS manager_email, u.name AS manager_name,
           c.id AS carehome_id, c.name AS carehome_name, c.code AS carehome_code,
           c.address AS carehome_address
    FROM carehome_managers a
    JOIN users u ON u.id = a.manager_id
    JOIN carehomes c ON c.id = a.carehome_id"#;

pub struct SqlxCareHomeManagerRepository {
    pub pool: PgPool,
}

impl SqlxCareHomeManagerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn assignment_from_row(r: &PgRow) -> ManagerAssignment {
    ManagerAssignment {
        id: r.get("id"),
        manager: ManagerSummary {
            id: r.get("manager_id"),
            email: r.get("manager_email"),
            name: r.get("manager_name"),
        },
        carehome: CareHomeSummary {
            id: r.get("carehome_id"),
            name: r.get("carehome_name"),
            code: r.get("carehome_code"),
            address: r.get("carehome_address"),
        },
        created_at: r.get("created_at"),
    }
}

#[async_trait]
impl CareHomeManagerRepository for SqlxCareHomeManagerRepository {
    async fn count_for_carehome(&self, carehome_id: Uuid) -> anyhow::Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM carehome_managers WHERE carehome_id = $1")
            .bind(carehome_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("n"))
    }

    async fn create(&self, carehome_id: Uuid, manager_id: Uuid) -> anyhow::Result<ManagerAssignment> {
        let row = sqlx::query(
            "INSERT INTO carehome_managers (carehome_id, manager_id) VALUES ($1, $2) RETURNING id",
        )
        .bind(carehome_id)
        .bind(manager_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;
        let id: Uuid = row.get("id");
        let sql = format!("{ASSIGNMENT_SELECT} WHERE a.id = $1");
        let row = sqlx::query(&sql).bind(id).fetch_one(&self.pool).await?;
        Ok(assignment_from_row(&row))
    }

    async fn get(&self, scope: Scope, id: Uuid) -> anyhow::Result<Option<ManagerAssignment>> {
        let (kind, subject) = scope_binds(scope);
        let sql = format!("{ASSIGNMENT_SELECT} WHERE a.id = $3 AND {SCOPE_FILTER}");
        let row = sqlx::query(&sql)
            .bind(kind)
            .bind(subject)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(assignment_from_row))
    }

    async fn list(&self, scope: Scope) -> anyhow::Result<Vec<ManagerAssignment>> {
        let (kind, subject) = scope_binds(scope);
        let sql = format!("{ASSIGNMENT_SELECT} WHERE {SCOPE_FILTER} ORDER BY a.created_at ASC");
        let rows = sqlx::query(&sql)
            .bind(kind)
            .bind(subject)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(assignment_from_row).collect())
    }

    async fn list_for_carehome(
        &self,
        scope: Scope,
        carehome_id: Uuid,
    ) -> anyhow::Result<Vec<ManagerAssignment>> {
        let (kind, subject) = scope_binds(scope);
        let sql = format!(
            "{ASSIGNMENT_SELECT} WHERE c.id = $3 AND {SCOPE_FILTER} ORDER BY a.created_at ASC"
        );
        let rows = sqlx::query(&sql)
            .bind(kind)
            .bind(subject)
            .bind(carehome_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(assignment_from_row).collect())
    }

    async fn list_unassigned_managers(&self, created_by: Uuid) -> anyhow::Result<Vec<User>> {
        let rows = sqlx::query(
            r#"SELECT u.id, u.email, u.username, u.name, u.avatar, u.role, u.created_by,
                      u.is_active, u.created_at, u.updated_at
               FROM users u
               WHERE u.role = 'manager' AND u.created_by = $1
                 AND NOT EXISTS (SELECT 1 FROM carehome_managers a WHERE a.manager_id = u.id)
               ORDER BY u.created_at ASC"#,
        )
        .bind(created_by)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(user_from_row).collect()
    }

    async fn first_carehome_for_manager(&self, manager_id: Uuid) -> anyhow::Result<Option<CareHome>> {
        let row = sqlx::query(
            r#"SELECT c.id, c.name, c.code, c.admin_id, c.address, c.created_at, c.updated_at
               FROM carehome_managers a JOIN carehomes c ON c.id = a.carehome_id
               WHERE a.manager_id = $1
               ORDER BY a.created_at ASC
               LIMIT 1"#,
        )
        .bind(manager_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(carehome_from_row))
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM carehome_managers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
