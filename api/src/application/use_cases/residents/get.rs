use uuid::Uuid;

use crate::application::access::Actor;
use crate::application::errors::{AppError, AppResult};
use crate::application::ports::resident_repository::ResidentRepository;
use crate::domain::residents::resident::Resident;
use crate::domain::users::permission::{Action, Permission, Resource};

pub struct GetResident<'a, R: ResidentRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: ResidentRepository + ?Sized> GetResident<'a, R> {
    pub async fn execute(&self, actor: &Actor, id: Uuid) -> AppResult<Resident> {
        actor.require(Permission::new(Action::View, Resource::Resident))?;
        self.repo
            .get(actor.scope(), id)
            .await?
            .ok_or(AppError::NotFound)
    }
}
