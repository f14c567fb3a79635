use uuid::Uuid;

use crate::application::access::Actor;
use crate::application::errors::{AppError, AppResult};
use crate::application::ports::carehome_repository::CareHomeRepository;
use crate::domain::users::permission::{Action, Permission, Resource};

pub struct DeleteCareHome<'a, R: CareHomeRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: CareHomeRepository + ?Sized> DeleteCareHome<'a, R> {
    /// Fails with a conflict while residents or manager assignments
    /// still reference the care home.
    pub async fn execute(&self, actor: &Actor, id: Uuid) -> AppResult<()> {
        actor.require(Permission::new(Action::Delete, Resource::CareHome))?;
        if self.repo.get(actor.scope(), id).await?.is_none() || !self.repo.delete(id).await? {
            return Err(AppError::NotFound);
        }
        tracing::info!(carehome_id = %id, "carehome_deleted");
        Ok(())
    }
}
