use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use super::resident_repository_sqlx::resident_from_row;
use crate::application::access::Scope;
use crate::application::dto::filters::{
    FeedbackState, SessionFilter, SessionOrderField, SessionOrdering, StatusCategory,
};
use crate::application::dto::pagination::{Page, PageRequest};
use crate::application::ports::session_repository::{NewSession, SessionRepository};
use crate::domain::sessions::session::{SessionStatus, TherapySession};
use crate::infrastructure::db::{
    PgPool, SCOPE_FILTER, contains_pattern, map_db_error, scope_binds,
};

const SESSION_FROM: &str = r#"
    FROM therapy_sessions s
    JOIN residents r ON r.id = s.resident_id
    JOIN carehomes c ON c.id = r.carehome_id"#;

// Resident columns keep their plain names so `resident_from_row` applies.
const SESSION_SELECT: &str = r#"
    SELECT s.id AS session_id, s.scheduled_date, s.end_time, s.status, s.notes, s.feedback_id,
           s.created_at AS session_created_at, s.updated_at AS session_updated_at,
           r.id, r.name, r.date_of_birth, r.created_by, r.created_at, r.updated_at,
           c.id AS carehome_id, c.name AS carehome_name
    FROM therapy_sessions s
    JOIN residents r ON r.id = s.resident_id
    JOIN carehomes c ON c.id = r.carehome_id"#;

pub struct SqlxSessionRepository {
    pub pool: PgPool,
}

impl SqlxSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch(&self, id: Uuid) -> anyhow::Result<Option<TherapySession>> {
        let sql = format!("{SESSION_SELECT} WHERE s.id = $1");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(session_from_row).transpose()
    }
}

fn session_from_row(r: &PgRow) -> anyhow::Result<TherapySession> {
    let status: String = r.get("status");
    Ok(TherapySession {
        id: r.get("session_id"),
        resident: resident_from_row(r),
        scheduled_date: r.get("scheduled_date"),
        end_time: r.get("end_time"),
        status: status.parse::<SessionStatus>().map_err(anyhow::Error::msg)?,
        notes: r.get("notes"),
        feedback_id: r.get("feedback_id"),
        created_at: r.get("session_created_at"),
        updated_at: r.get("session_updated_at"),
    })
}

fn order_clause(ordering: SessionOrdering) -> String {
    let column = match ordering.field {
        SessionOrderField::ScheduledDate => "s.scheduled_date",
        SessionOrderField::CreatedAt => "s.created_at",
        SessionOrderField::UpdatedAt => "s.updated_at",
    };
    let dir = if ordering.descending { "DESC" } else { "ASC" };
    format!("{column} {dir}, s.id ASC")
}

fn category_clause(category: Option<StatusCategory>) -> &'static str {
    match category {
        None => "TRUE",
        Some(StatusCategory::Completed) => "s.status = 'completed'",
        Some(StatusCategory::Upcoming) => "(s.status = 'scheduled' AND s.scheduled_date > b.now)",
        Some(StatusCategory::PastDue) => "(s.status = 'scheduled' AND s.scheduled_date < b.now)",
        Some(StatusCategory::InProgress) => "s.status = 'in_progress'",
        Some(StatusCategory::Today) => "(s.scheduled_date >= b.day_start AND s.scheduled_date < b.day_end)",
    }
}

fn feedback_clause(state: Option<FeedbackState>) -> &'static str {
    match state {
        None => "TRUE",
        Some(FeedbackState::Completed) => "s.feedback_id IS NOT NULL",
        Some(FeedbackState::Pending) => "(s.status = 'completed' AND s.feedback_id IS NULL)",
    }
}

#[async_trait]
impl SessionRepository for SqlxSessionRepository {
    async fn list(
        &self,
        scope: Scope,
        filter: &SessionFilter,
        now: DateTime<Utc>,
        page: PageRequest,
    ) -> anyhow::Result<Page<TherapySession>> {
        let (kind, subject) = scope_binds(scope);
        let day_start = now
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .map(|d| d.and_utc())
            .unwrap_or(now);
        let day_end = day_start + Duration::days(1);
        let search = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(contains_pattern);
        let bounds = r#"WITH b AS (
                 SELECT $6::timestamptz AS now, $7::timestamptz AS day_start, $8::timestamptz AS day_end
               )"#;
        let filters = format!(
            r#"{SCOPE_FILTER}
                 AND ($3::text IS NULL OR s.status = $3)
                 AND ($4::uuid IS NULL OR s.resident_id = $4)
                 AND ($5::text IS NULL OR r.name ILIKE $5 ESCAPE '\' OR s.notes ILIKE $5 ESCAPE '\')
                 AND {category}
                 AND {feedback}"#,
            category = category_clause(filter.category),
            feedback = feedback_clause(filter.feedback),
        );

        let count_sql =
            format!("{bounds} SELECT COUNT(*) AS total {SESSION_FROM} CROSS JOIN b WHERE {filters}");
        let total: i64 = sqlx::query(&count_sql)
            .bind(kind)
            .bind(subject)
            .bind(filter.status.map(|s| s.as_str()))
            .bind(filter.resident_id)
            .bind(search.as_deref())
            .bind(now)
            .bind(day_start)
            .bind(day_end)
            .fetch_one(&self.pool)
            .await?
            .get("total");

        let sql = format!(
            r#"{bounds}
               {SESSION_SELECT}
               CROSS JOIN b
               WHERE {filters}
               ORDER BY {order}
               LIMIT $9 OFFSET $10"#,
            order = order_clause(filter.ordering),
        );
        let rows = sqlx::query(&sql)
            .bind(kind)
            .bind(subject)
            .bind(filter.status.map(|s| s.as_str()))
            .bind(filter.resident_id)
            .bind(search.as_deref())
            .bind(now)
            .bind(day_start)
            .bind(day_end)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;
        let results = rows
            .iter()
            .map(session_from_row)
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(Page::new(page, total, results))
    }

    async fn get(&self, scope: Scope, id: Uuid) -> anyhow::Result<Option<TherapySession>> {
        let (kind, subject) = scope_binds(scope);
        let sql = format!("{SESSION_SELECT} WHERE s.id = $3 AND {SCOPE_FILTER}");
        let row = sqlx::query(&sql)
            .bind(kind)
            .bind(subject)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(session_from_row).transpose()
    }

    async fn create(&self, session: NewSession) -> anyhow::Result<TherapySession> {
        let row = sqlx::query(
            r#"INSERT INTO therapy_sessions (resident_id, scheduled_date, end_time, status, notes, feedback_id)
               VALUES ($1, $2, $3, $4, $5, $6) RETURNING id"#,
        )
        .bind(session.resident_id)
        .bind(session.scheduled_date)
        .bind(session.end_time)
        .bind(session.status.as_str())
        .bind(&session.notes)
        .bind(session.feedback_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;
        let id: Uuid = row.get("id");
        self.fetch(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("session {id} vanished after insert"))
    }

    async fn update(&self, session: &TherapySession) -> anyhow::Result<Option<TherapySession>> {
        let res = sqlx::query(
            r#"UPDATE therapy_sessions
               SET resident_id = $2, scheduled_date = $3, end_time = $4, status = $5,
                   notes = $6, feedback_id = $7, updated_at = now()
               WHERE id = $1"#,
        )
        .bind(session.id)
        .bind(session.resident.id)
        .bind(session.scheduled_date)
        .bind(session.end_time)
        .bind(session.status.as_str())
        .bind(&session.notes)
        .bind(session.feedback_id)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;
        if res.rows_affected() == 0 {
            return Ok(None);
        }
        self.fetch(session.id).await
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM therapy_sessions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn feedback_linked_elsewhere(
        &self,
        feedback_id: Uuid,
        exclude_session: Option<Uuid>,
    ) -> anyhow::Result<bool> {
        let row = sqlx::query(
            r#"SELECT EXISTS(
                 SELECT 1 FROM therapy_sessions
                 WHERE feedback_id = $1 AND ($2::uuid IS NULL OR id <> $2)
               ) AS linked"#,
        )
        .bind(feedback_id)
        .bind(exclude_session)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.get("linked"))
    }
}
