use crate::application::access::Actor;
use crate::application::errors::AppResult;
use crate::application::ports::carehome_repository::CareHomeRepository;
use crate::domain::carehomes::carehome::CareHome;
use crate::domain::users::permission::{Action, Permission, Resource};

pub struct ListCareHomes<'a, R: CareHomeRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: CareHomeRepository + ?Sized> ListCareHomes<'a, R> {
    pub async fn execute(&self, actor: &Actor) -> AppResult<Vec<CareHome>> {
        actor.require(Permission::new(Action::View, Resource::CareHome))?;
        Ok(self.repo.list(actor.scope()).await?)
    }
}
