use crate::application::access::Actor;
use crate::application::dto::filters::ReportFilter;
use crate::application::dto::pagination::{Page, PageRequest};
use crate::application::errors::AppResult;
use crate::application::ports::report_repository::ReportRepository;
use crate::domain::reports::report::{Report, first_of_month};
use crate::domain::users::permission::{Action, Permission, Resource};

pub struct ListReports<'a, R: ReportRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: ReportRepository + ?Sized> ListReports<'a, R> {
    pub async fn execute(
        &self,
        actor: &Actor,
        filter: &ReportFilter,
        page: PageRequest,
    ) -> AppResult<Page<Report>> {
        actor.require(Permission::new(Action::View, Resource::Report))?;
        let filter = ReportFilter {
            start_month: filter.start_month.map(first_of_month),
            end_month: filter.end_month.map(first_of_month),
            ..filter.clone()
        };
        Ok(self.repo.list(actor.scope(), &filter, page).await?)
    }
}
