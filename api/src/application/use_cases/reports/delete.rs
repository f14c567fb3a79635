use uuid::Uuid;

use crate::application::access::Actor;
use crate::application::errors::{AppError, AppResult};
use crate::application::ports::report_repository::ReportRepository;
use crate::application::ports::report_store::ReportFileStore;
use crate::domain::users::permission::{Action, Permission, Resource};

pub struct DeleteReport<'a, R, S>
where
    R: ReportRepository + ?Sized,
    S: ReportFileStore + ?Sized,
{
    pub reports: &'a R,
    pub store: &'a S,
}

impl<'a, R, S> DeleteReport<'a, R, S>
where
    R: ReportRepository + ?Sized,
    S: ReportFileStore + ?Sized,
{
    /// Removing the stored PDF is best effort.
    pub async fn execute(&self, actor: &Actor, id: Uuid) -> AppResult<()> {
        actor.require(Permission::new(Action::Delete, Resource::Report))?;
        let report = self
            .reports
            .get(actor.scope(), id)
            .await?
            .ok_or(AppError::NotFound)?;
        if !self.reports.delete(report.id).await? {
            return Err(AppError::NotFound);
        }
        if let Err(err) = self.store.delete(&report.pdf_path).await {
            tracing::warn!(report_id = %report.id, path = %report.pdf_path, error = ?err, "failed to remove report file");
        }
        tracing::info!(report_id = %report.id, "report_deleted");
        Ok(())
    }
}
