use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::application::access::Actor;
use crate::application::errors::{AppError, AppResult};
use crate::application::ports::report_repository::{NewReport, ReportRepository};
use crate::application::ports::report_store::ReportFileStore;
use crate::application::ports::resident_repository::ResidentRepository;
use crate::domain::reports::report::{Report, validate_pdf, validate_report_month};
use crate::domain::users::permission::{Action, Permission, Resource};

const DUPLICATE_REPORT: &str = "A report for this resident and month already exists.";

pub struct CreateReport<'a, R, P, S>
where
    R: ReportRepository + ?Sized,
    P: ResidentRepository + ?Sized,
    S: ReportFileStore + ?Sized,
{
    pub reports: &'a R,
    pub residents: &'a P,
    pub store: &'a S,
    pub max_bytes: usize,
}

#[derive(Debug, Clone)]
pub struct ReportUpload {
    pub resident_id: Uuid,
    pub report_month: NaiveDate,
    pub description: String,
    pub pdf: Vec<u8>,
}

impl<'a, R, P, S> CreateReport<'a, R, P, S>
where
    R: ReportRepository + ?Sized,
    P: ResidentRepository + ?Sized,
    S: ReportFileStore + ?Sized,
{
    pub async fn execute(&self, actor: &Actor, upload: ReportUpload) -> AppResult<Report> {
        actor.require(Permission::new(Action::Add, Resource::Report))?;
        if self.residents.get(actor.scope(), upload.resident_id).await?.is_none() {
            return Err(AppError::validation("Invalid resident."));
        }
        let month = validate_report_month(upload.report_month, Utc::now().date_naive())
            .map_err(AppError::Validation)?;
        validate_pdf(&upload.pdf, self.max_bytes).map_err(AppError::Validation)?;
        if self.reports.exists_for_month(upload.resident_id, month).await? {
            return Err(AppError::Conflict(DUPLICATE_REPORT.into()));
        }

        let id = Uuid::new_v4();
        let pdf_path = self.store.save(id, &upload.pdf).await?;
        let created = self
            .reports
            .create(NewReport {
                id,
                report_month: month,
                resident_id: upload.resident_id,
                description: upload.description,
                pdf_path: pdf_path.clone(),
            })
            .await;
        match created {
            Ok(report) => {
                tracing::info!(report_id = %report.id, resident_id = %report.resident_id, month = %month, "report_created");
                Ok(report)
            }
            Err(err) => {
                if let Err(cleanup) = self.store.delete(&pdf_path).await {
                    tracing::warn!(report_id = %id, error = ?cleanup, "failed to remove orphaned report file");
                }
                Err(err.into())
            }
        }
    }
}
