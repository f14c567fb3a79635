use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use crate::application::dto::filters::UserFilter;
use crate::application::ports::user_repository::{NewUserRecord, UserRepository};
use crate::domain::users::role::Role;
use crate::domain::users::user::User;
use crate::infrastructure::db::{PgPool, map_db_error};

const USER_COLUMNS: &str =
    "id, email, username, name, avatar, role, created_by, is_active, created_at, updated_at";

pub struct SqlxUserRepository {
    pub pool: PgPool,
}

impl SqlxUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

pub(crate) fn user_from_row(r: &PgRow) -> anyhow::Result<User> {
    let role: String = r.get("role");
    Ok(User {
        id: r.get("id"),
        email: r.get("email"),
        username: r.get("username"),
        name: r.get("name"),
        avatar: r.get("avatar"),
        role: role.parse::<Role>()?,
        created_by: r.get("created_by"),
        is_active: r.get("is_active"),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    })
}

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn create_user(&self, record: NewUserRecord) -> anyhow::Result<User> {
        let sql = format!(
            r#"INSERT INTO users (email, username, name, password_hash, role, avatar, created_by)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING {USER_COLUMNS}"#
        );
        let row = sqlx::query(&sql)
            .bind(&record.email)
            .bind(&record.username)
            .bind(&record.name)
            .bind(&record.password_hash)
            .bind(record.role.as_str())
            .bind(&record.avatar)
            .bind(record.created_by)
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)?;
        user_from_row(&row)
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let row = sqlx::query(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_credentials(&self, email: &str) -> anyhow::Result<Option<(User, String)>> {
        let sql = format!("SELECT {USER_COLUMNS}, password_hash FROM users WHERE email = $1");
        let row = sqlx::query(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(r) => Ok(Some((user_from_row(&r)?, r.get("password_hash")))),
            None => Ok(None),
        }
    }

    async fn username_exists(&self, username: &str) -> anyhow::Result<bool> {
        let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1) AS taken")
            .bind(username)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("taken"))
    }

    async fn list(&self, filter: &UserFilter) -> anyhow::Result<Vec<User>> {
        let sql = format!(
            r#"SELECT {USER_COLUMNS} FROM users
               WHERE ($1::uuid IS NULL OR created_by = $1)
                 AND ($2::text IS NULL OR role = $2)
               ORDER BY created_at ASC"#
        );
        let rows = sqlx::query(&sql)
            .bind(filter.created_by)
            .bind(filter.role.map(|r| r.as_str()))
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(user_from_row).collect()
    }

    async fn update_profile(&self, user: &User) -> anyhow::Result<Option<User>> {
        let sql = format!(
            r#"UPDATE users
               SET name = $2, email = $3, username = $4, avatar = $5, is_active = $6, updated_at = now()
               WHERE id = $1
               RETURNING {USER_COLUMNS}"#
        );
        let row = sqlx::query(&sql)
            .bind(user.id)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.username)
            .bind(&user.avatar)
            .bind(user.is_active)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn delete_user(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(res.rows_affected() > 0)
    }
}
