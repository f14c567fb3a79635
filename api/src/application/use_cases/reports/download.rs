use uuid::Uuid;

use crate::application::access::Actor;
use crate::application::errors::{AppError, AppResult};
use crate::application::ports::report_repository::ReportRepository;
use crate::application::ports::report_store::ReportFileStore;
use crate::domain::reports::report::Report;
use crate::domain::users::permission::{Action, Permission, Resource};

pub struct DownloadReport<'a, R, S>
where
    R: ReportRepository + ?Sized,
    S: ReportFileStore + ?Sized,
{
    pub repo: &'a R,
    pub store: &'a S,
}

impl<'a, R, S> DownloadReport<'a, R, S>
where
    R: ReportRepository + ?Sized,
    S: ReportFileStore + ?Sized,
{
    pub async fn execute(&self, actor: &Actor, id: Uuid) -> AppResult<(Report, Vec<u8>)> {
        actor.require(Permission::new(Action::View, Resource::Report))?;
        let report = self
            .repo
            .get(actor.scope(), id)
            .await?
            .ok_or(AppError::NotFound)?;
        let bytes = self.store.read(&report.pdf_path).await.map_err(|err| {
            tracing::warn!(report_id = %report.id, path = %report.pdf_path, error = ?err, "report file unreadable");
            AppError::NotFound
        })?;
        Ok((report, bytes))
    }
}
