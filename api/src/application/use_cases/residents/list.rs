use crate::application::access::Actor;
use crate::application::dto::filters::ResidentFilter;
use crate::application::dto::pagination::{Page, PageRequest};
use crate::application::errors::AppResult;
use crate::application::ports::resident_repository::ResidentRepository;
use crate::domain::residents::resident::Resident;
use crate::domain::users::permission::{Action, Permission, Resource};

pub struct ListResidents<'a, R: ResidentRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: ResidentRepository + ?Sized> ListResidents<'a, R> {
    pub async fn execute(
        &self,
        actor: &Actor,
        filter: &ResidentFilter,
        page: PageRequest,
    ) -> AppResult<Page<Resident>> {
        actor.require(Permission::new(Action::View, Resource::Resident))?;
        Ok(self.repo.list(actor.scope(), filter, page).await?)
    }
}
