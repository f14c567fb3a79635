use uuid::Uuid;

use crate::application::access::Actor;
use crate::application::errors::{AppError, AppResult};
use crate::application::ports::report_repository::ReportRepository;
use crate::domain::reports::report::Report;
use crate::domain::users::permission::{Action, Permission, Resource};

pub struct GetReport<'a, R: ReportRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: ReportRepository + ?Sized> GetReport<'a, R> {
    pub async fn execute(&self, actor: &Actor, id: Uuid) -> AppResult<Report> {
        actor.require(Permission::new(Action::View, Resource::Report))?;
        self.repo
            .get(actor.scope(), id)
            .await?
            .ok_or(AppError::NotFound)
    }
}
