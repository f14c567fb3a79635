use uuid::Uuid;

use crate::application::access::Actor;
use crate::application::errors::{AppError, AppResult};
use crate::application::ports::carehome_manager_repository::CareHomeManagerRepository;
use crate::domain::carehomes::carehome::ManagerAssignment;
use crate::domain::users::permission::{Action, Permission, Resource};

pub struct GetAssignment<'a, R: CareHomeManagerRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: CareHomeManagerRepository + ?Sized> GetAssignment<'a, R> {
    pub async fn execute(&self, actor: &Actor, id: Uuid) -> AppResult<ManagerAssignment> {
        actor.require(Permission::new(Action::View, Resource::CareHomeManager))?;
        self.repo
            .get(actor.scope(), id)
            .await?
            .ok_or(AppError::NotFound)
    }
}
