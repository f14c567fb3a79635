use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::application::access::Scope;
use crate::application::dto::filters::ReportFilter;
use crate::application::dto::pagination::{Page, PageRequest};
use crate::domain::reports::report::Report;

#[derive(Debug, Clone)]
pub struct NewReport {
    pub id: Uuid,
    pub report_month: NaiveDate,
    pub resident_id: Uuid,
    pub description: String,
    pub pdf_path: String,
}

#[async_trait]
pub trait ReportRepository: Send + Sync {
    async fn list(
        &self,
        scope: Scope,
        filter: &ReportFilter,
        page: PageRequest,
    ) -> anyhow::Result<Page<Report>>;
    async fn get(&self, scope: Scope, id: Uuid) -> anyhow::Result<Option<Report>>;
    async fn exists_for_month(&self, resident_id: Uuid, month: NaiveDate) -> anyhow::Result<bool>;
    async fn create(&self, report: NewReport) -> anyhow::Result<Report>;
    /// Persists description and pdf_path.
    async fn update(&self, report: &Report) -> anyhow::Result<Option<Report>>;
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
}
