use uuid::Uuid;

use crate::application::access::Actor;
use crate::application::errors::{AppError, AppResult};
use crate::application::ports::resident_repository::ResidentRepository;
use crate::domain::users::permission::{Action, Permission, Resource};

pub struct DeleteResident<'a, R: ResidentRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: ResidentRepository + ?Sized> DeleteResident<'a, R> {
    pub async fn execute(&self, actor: &Actor, id: Uuid) -> AppResult<()> {
        actor.require(Permission::new(Action::Delete, Resource::Resident))?;
        if self.repo.get(actor.scope(), id).await?.is_none() || !self.repo.delete(id).await? {
            return Err(AppError::NotFound);
        }
        tracing::info!(resident_id = %id, "resident_deleted");
        Ok(())
    }
}
