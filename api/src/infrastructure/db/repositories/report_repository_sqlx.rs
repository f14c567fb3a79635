use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use crate::application::access::Scope;
use crate::application::dto::filters::{ReportFilter, ReportOrdering};
use crate::application::dto::pagination::{Page, PageRequest};
use crate::application::ports::report_repository::{NewReport, ReportRepository};
use crate::domain::reports::report::Report;
use crate::infrastructure::db::{PgPool, SCOPE_FILTER, map_db_error, scope_binds};

const REPORT_SELECT: &str = r#"
    SELECT p.id, p.report_month, p.resident_id, r.name AS resident_name,
           p.description, p.pdf_path, p.created_at
    FROM reports p
    JOIN residents r ON r.id = p.resident_id
    JOIN carehomes c ON c.id = r.carehome_id"#;

pub struct SqlxReportRepository {
    pub pool: PgPool,
}

impl SqlxReportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch(&self, id: Uuid) -> anyhow::Result<Option<Report>> {
        let sql = format!("{REPORT_SELECT} WHERE p.id = $1");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(report_from_row))
    }
}

fn report_from_row(r: &PgRow) -> Report {
    Report {
        id: r.get("id"),
        report_month: r.get("report_month"),
        resident_id: r.get("resident_id"),
        resident_name: r.get("resident_name"),
        description: r.get("description"),
        pdf_path: r.get("pdf_path"),
        created_at: r.get("created_at"),
    }
}

fn order_clause(ordering: ReportOrdering) -> &'static str {
    match ordering {
        ReportOrdering::MonthAsc => "p.report_month ASC, r.name ASC",
        ReportOrdering::MonthDesc => "p.report_month DESC, r.name ASC",
        ReportOrdering::ResidentAsc => "r.name ASC, p.report_month ASC",
        ReportOrdering::ResidentDesc => "r.name DESC, p.report_month ASC",
    }
}

#[async_trait]
impl ReportRepository for SqlxReportRepository {
    async fn list(
        &self,
        scope: Scope,
        filter: &ReportFilter,
        page: PageRequest,
    ) -> anyhow::Result<Page<Report>> {
        let (kind, subject) = scope_binds(scope);
        let filters = r#"($3::uuid IS NULL OR p.resident_id = $3)
                 AND ($4::date IS NULL OR p.report_month >= $4)
                 AND ($5::date IS NULL OR p.report_month <= $5)"#;

        let count_sql = format!(
            r#"SELECT COUNT(*) AS total
               FROM reports p
               JOIN residents r ON r.id = p.resident_id
               JOIN carehomes c ON c.id = r.carehome_id
               WHERE {SCOPE_FILTER} AND {filters}"#
        );
        let total: i64 = sqlx::query(&count_sql)
            .bind(kind)
            .bind(subject)
            .bind(filter.resident_id)
            .bind(filter.start_month)
            .bind(filter.end_month)
            .fetch_one(&self.pool)
            .await?
            .get("total");

        let sql = format!(
            r#"{REPORT_SELECT}
               WHERE {SCOPE_FILTER} AND {filters}
               ORDER BY {order}, p.id ASC
               LIMIT $6 OFFSET $7"#,
            order = order_clause(filter.ordering)
        );
        let rows = sqlx::query(&sql)
            .bind(kind)
            .bind(subject)
            .bind(filter.resident_id)
            .bind(filter.start_month)
            .bind(filter.end_month)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;
        Ok(Page::new(page, total, rows.iter().map(report_from_row).collect()))
    }

    async fn get(&self, scope: Scope, id: Uuid) -> anyhow::Result<Option<Report>> {
        let (kind, subject) = scope_binds(scope);
        let sql = format!("{REPORT_SELECT} WHERE p.id = $3 AND {SCOPE_FILTER}");
        let row = sqlx::query(&sql)
            .bind(kind)
            .bind(subject)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(report_from_row))
    }

    async fn exists_for_month(&self, resident_id: Uuid, month: NaiveDate) -> anyhow::Result<bool> {
        let row = sqlx::query(
            "SELECT EXISTS(SELECT 1 FROM reports WHERE resident_id = $1 AND report_month = $2) AS taken",
        )
        .bind(resident_id)
        .bind(month)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.get("taken"))
    }

    async fn create(&self, report: NewReport) -> anyhow::Result<Report> {
        sqlx::query(
            r#"INSERT INTO reports (id, report_month, resident_id, description, pdf_path)
               VALUES ($1, $2, $3, $4, $5)"#,
        )
        .bind(report.id)
        .bind(report.report_month)
        .bind(report.resident_id)
        .bind(&report.description)
        .bind(&report.pdf_path)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;
        self.fetch(report.id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("report {} vanished after insert", report.id))
    }

    async fn update(&self, report: &Report) -> anyhow::Result<Option<Report>> {
        let res = sqlx::query("UPDATE reports SET description = $2, pdf_path = $3 WHERE id = $1")
            .bind(report.id)
            .bind(&report.description)
            .bind(&report.pdf_path)
            .execute(&self.pool)
            .await?;
        if res.rows_affected() == 0 {
            return Ok(None);
        }
        self.fetch(report.id).await
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM reports WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
