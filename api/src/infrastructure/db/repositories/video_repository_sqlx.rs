use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use crate::application::access::Scope;
use crate::application::dto::filters::{VideoFilter, VideoOrderField, VideoOrdering};
use crate::application::dto::pagination::{Page, PageRequest};
use crate::application::ports::video_repository::{NewVideo, VideoRepository};
use crate::domain::videos::video::Video;
use crate::infrastructure::db::{PgPool, SCOPE_FILTER, contains_pattern, map_db_error, scope_binds};

// Left joins keep resident-less videos; SCOPE_FILTER only admits those for 'all'.
const VIDEO_FROM: &str = r#"
    FROM videos v
    LEFT JOIN residents r ON r.id = v.resident_id
    LEFT JOIN carehomes c ON c.id = r.carehome_id"#;

const VIDEO_COLUMNS: &str = r#"
    SELECT v.id, v.title, v.description, v.file_path, v.content_type, v.file_size,
           v.resident_id, r.name AS resident_name, v.uploaded_at, v.updated_at"#;

const SEARCH_FILTER: &str =
    r#"($3::text IS NULL OR v.title ILIKE $3 ESCAPE '\' OR v.description ILIKE $3 ESCAPE '\')"#;

pub struct SqlxVideoRepository {
    pub pool: PgPool,
}

impl SqlxVideoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch(&self, id: Uuid) -> anyhow::Result<Option<Video>> {
        let sql = format!("{VIDEO_COLUMNS} {VIDEO_FROM} WHERE v.id = $1");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(video_from_row))
    }
}

fn video_from_row(r: &PgRow) -> Video {
    Video {
        id: r.get("id"),
        title: r.get("title"),
        description: r.get("description"),
        file_path: r.get("file_path"),
        content_type: r.get("content_type"),
        file_size: r.get("file_size"),
        resident_id: r.get("resident_id"),
        resident_name: r.get("resident_name"),
        uploaded_at: r.get("uploaded_at"),
        updated_at: r.get("updated_at"),
    }
}

fn order_clause(ordering: VideoOrdering) -> String {
    let column = match ordering.field {
        VideoOrderField::UploadedAt => "v.uploaded_at",
        VideoOrderField::Title => "v.title",
    };
    let dir = if ordering.descending { "DESC" } else { "ASC" };
    format!("{column} {dir}, v.id ASC")
}

#[async_trait]
impl VideoRepository for SqlxVideoRepository {
    async fn list(
        &self,
        scope: Scope,
        filter: &VideoFilter,
        page: PageRequest,
    ) -> anyhow::Result<Page<Video>> {
        let (kind, subject) = scope_binds(scope);
        let pattern = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(contains_pattern);

        let count_sql =
            format!("SELECT COUNT(*) AS total {VIDEO_FROM} WHERE {SCOPE_FILTER} AND {SEARCH_FILTER}");
        let total: i64 = sqlx::query(&count_sql)
            .bind(kind)
            .bind(subject)
            .bind(pattern.as_deref())
            .fetch_one(&self.pool)
            .await?
            .get("total");

        let sql = format!(
            r#"{VIDEO_COLUMNS} {VIDEO_FROM}
               WHERE {SCOPE_FILTER} AND {SEARCH_FILTER}
               ORDER BY {order}
               LIMIT $4 OFFSET $5"#,
            order = order_clause(filter.ordering)
        );
        let rows = sqlx::query(&sql)
            .bind(kind)
            .bind(subject)
            .bind(pattern.as_deref())
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;
        Ok(Page::new(page, total, rows.iter().map(video_from_row).collect()))
    }

    async fn get(&self, scope: Scope, id: Uuid) -> anyhow::Result<Option<Video>> {
        let (kind, subject) = scope_binds(scope);
        let sql = format!("{VIDEO_COLUMNS} {VIDEO_FROM} WHERE v.id = $3 AND {SCOPE_FILTER}");
        let row = sqlx::query(&sql)
            .bind(kind)
            .bind(subject)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(video_from_row))
    }

    async fn create(&self, video: NewVideo) -> anyhow::Result<Video> {
        sqlx::query(
            r#"INSERT INTO videos (id, title, description, file_path, content_type, file_size, resident_id)
               VALUES ($1, $2, $3, $4, $5, $6, $7)"#,
        )
        .bind(video.id)
        .bind(&video.title)
        .bind(&video.description)
        .bind(&video.file_path)
        .bind(&video.content_type)
        .bind(video.file_size)
        .bind(video.resident_id)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;
        self.fetch(video.id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("video {} vanished after insert", video.id))
    }

    async fn update(&self, video: &Video) -> anyhow::Result<Option<Video>> {
        let res = sqlx::query(
            r#"UPDATE videos
               SET title = $2, description = $3, file_path = $4, content_type = $5,
                   file_size = $6, resident_id = $7, updated_at = now()
               WHERE id = $1"#,
        )
        .bind(video.id)
        .bind(&video.title)
        .bind(&video.description)
        .bind(&video.file_path)
        .bind(&video.content_type)
        .bind(video.file_size)
        .bind(video.resident_id)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;
        if res.rows_affected() == 0 {
            return Ok(None);
        }
        self.fetch(video.id).await
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM videos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
