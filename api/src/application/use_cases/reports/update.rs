use uuid::Uuid;

use crate::application::access::Actor;
use crate::application::errors::{AppError, AppResult};
use crate::application::ports::report_repository::ReportRepository;
use crate::application::ports::report_store::ReportFileStore;
use crate::domain::reports::report::{Report, validate_pdf};
use crate::domain::users::permission::{Action, Permission, Resource};

pub struct UpdateReport<'a, R, S>
where
    R: ReportRepository + ?Sized,
    S: ReportFileStore + ?Sized,
{
    pub reports: &'a R,
    pub store: &'a S,
    pub max_bytes: usize,
}

/// The report month and resident are fixed once created.
#[derive(Debug, Clone, Default)]
pub struct ReportPatch {
    pub description: Option<String>,
    pub pdf: Option<Vec<u8>>,
}

impl<'a, R, S> UpdateReport<'a, R, S>
where
    R: ReportRepository + ?Sized,
    S: ReportFileStore + ?Sized,
{
    pub async fn execute(&self, actor: &Actor, id: Uuid, patch: ReportPatch) -> AppResult<Report> {
        actor.require(Permission::new(Action::Change, Resource::Report))?;
        let mut report = self
            .reports
            .get(actor.scope(), id)
            .await?
            .ok_or(AppError::NotFound)?;
        if let Some(description) = patch.description {
            report.description = description;
        }
        if let Some(pdf) = patch.pdf {
            validate_pdf(&pdf, self.max_bytes).map_err(AppError::Validation)?;
            report.pdf_path = self.store.save(report.id, &pdf).await?;
        }
        self.reports
            .update(&report)
            .await?
            .ok_or(AppError::NotFound)
    }
}
