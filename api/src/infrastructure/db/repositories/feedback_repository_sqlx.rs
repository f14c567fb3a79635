use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use crate::application::access::Scope;
use crate::application::dto::filters::FeedbackFilter;
use crate::application::dto::pagination::{Page, PageRequest};
use crate::application::ports::feedback_repository::FeedbackRepository;
use crate::domain::feedbacks::feedback::Feedback;
use crate::infrastructure::db::{PgPool, SCOPE_FILTER, map_db_error, scope_binds};

const FEEDBACK_COLUMNS: &str = r#"f.id, f.resident_id, f.created_at, f.session_date,
    f.session_duration, f.vr_experience, f.engagement_level, f.satisfaction,
    f.physical_impact, f.cognitive_impact, f.emotional_response, f.feedback_notes"#;

const SCOPED_FROM: &str = r#"FROM feedbacks f
    JOIN residents r ON r.id = f.resident_id
    JOIN carehomes c ON c.id = r.carehome_id"#;

pub struct SqlxFeedbackRepository {
    pub pool: PgPool,
}

impl SqlxFeedbackRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn feedback_from_row(r: &PgRow) -> Feedback {
    Feedback {
        id: r.get("id"),
        resident_id: r.get("resident_id"),
        created_at: r.get("created_at"),
        session_date: r.get("session_date"),
        session_duration: r.get("session_duration"),
        vr_experience: r.get("vr_experience"),
        engagement_level: r.get("engagement_level"),
        satisfaction: r.get("satisfaction"),
        physical_impact: r.get("physical_impact"),
        cognitive_impact: r.get("cognitive_impact"),
        emotional_response: r.get("emotional_response"),
        feedback_notes: r.get("feedback_notes"),
    }
}

#[async_trait]
impl FeedbackRepository for SqlxFeedbackRepository {
    async fn list(
        &self,
        scope: Scope,
        filter: &FeedbackFilter,
        page: PageRequest,
    ) -> anyhow::Result<Page<Feedback>> {
        let (kind, subject) = scope_binds(scope);
        let filters = r#"($3::uuid IS NULL OR f.resident_id = $3)
                 AND ($4::date IS NULL OR f.session_date >= $4)
                 AND ($5::date IS NULL OR f.session_date <= $5)"#;

        let count_sql = format!(
            "SELECT COUNT(*) AS total {SCOPED_FROM} WHERE {SCOPE_FILTER} AND {filters}"
        );
        let total: i64 = sqlx::query(&count_sql)
            .bind(kind)
            .bind(subject)
            .bind(filter.resident_id)
            .bind(filter.start_date)
            .bind(filter.end_date)
            .fetch_one(&self.pool)
            .await?
            .get("total");

        let sql = format!(
            r#"SELECT {FEEDBACK_COLUMNS} {SCOPED_FROM}
               WHERE {SCOPE_FILTER} AND {filters}
               ORDER BY f.session_date DESC, f.created_at DESC
               LIMIT $6 OFFSET $7"#
        );
        let rows = sqlx::query(&sql)
            .bind(kind)
            .bind(subject)
            .bind(filter.resident_id)
            .bind(filter.start_date)
            .bind(filter.end_date)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;
        Ok(Page::new(page, total, rows.iter().map(feedback_from_row).collect()))
    }

    async fn get(&self, scope: Scope, id: Uuid) -> anyhow::Result<Option<Feedback>> {
        let (kind, subject) = scope_binds(scope);
        let sql = format!("SELECT {FEEDBACK_COLUMNS} {SCOPED_FROM} WHERE f.id = $3 AND {SCOPE_FILTER}");
        let row = sqlx::query(&sql)
            .bind(kind)
            .bind(subject)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(feedback_from_row))
    }

    async fn create(&self, fb: &Feedback) -> anyhow::Result<Feedback> {
        let sql = format!(
            r#"INSERT INTO feedbacks AS f (resident_id, session_date, session_duration, vr_experience,
                   engagement_level, satisfaction, physical_impact, cognitive_impact,
                   emotional_response, feedback_notes)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
               RETURNING {FEEDBACK_COLUMNS}"#
        );
        let row = sqlx::query(&sql)
            .bind(fb.resident_id)
            .bind(fb.session_date)
            .bind(fb.session_duration)
            .bind(&fb.vr_experience)
            .bind(fb.engagement_level)
            .bind(fb.satisfaction)
            .bind(fb.physical_impact)
            .bind(fb.cognitive_impact)
            .bind(&fb.emotional_response)
            .bind(&fb.feedback_notes)
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(feedback_from_row(&row))
    }

    async fn update(&self, fb: &Feedback) -> anyhow::Result<Option<Feedback>> {
        let sql = format!(
            r#"UPDATE feedbacks AS f SET resident_id = $2, session_date = $3, session_duration = $4,
                   vr_experience = $5, engagement_level = $6, satisfaction = $7,
                   physical_impact = $8, cognitive_impact = $9, emotional_response = $10,
                   feedback_notes = $11
               WHERE f.id = $1
               RETURNING {FEEDBACK_COLUMNS}"#
        );
        let row = sqlx::query(&sql)
            .bind(fb.id)
            .bind(fb.resident_id)
            .bind(fb.session_date)
            .bind(fb.session_duration)
            .bind(&fb.vr_experience)
            .bind(fb.engagement_level)
            .bind(fb.satisfaction)
            .bind(fb.physical_impact)
            .bind(fb.cognitive_impact)
            .bind(&fb.emotional_response)
            .bind(&fb.feedback_notes)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(row.as_ref().map(feedback_from_row))
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM feedbacks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(res.rows_affected() > 0)
    }
}
