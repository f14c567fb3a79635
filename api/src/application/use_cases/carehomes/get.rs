use uuid::Uuid;

use crate::application::access::Actor;
use crate::application::errors::{AppError, AppResult};
use crate::application::ports::carehome_repository::CareHomeRepository;
use crate::domain::carehomes::carehome::CareHome;
use crate::domain::users::permission::{Action, Permission, Resource};

pub struct GetCareHome<'a, R: CareHomeRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: CareHomeRepository + ?Sized> GetCareHome<'a, R> {
    pub async fn execute(&self, actor: &Actor, id: Uuid) -> AppResult<CareHome> {
        actor.require(Permission::new(Action::View, Resource::CareHome))?;
        self.repo
            .get(actor.scope(), id)
            .await?
            .ok_or(AppError::NotFound)
    }
}
