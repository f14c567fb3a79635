use uuid::Uuid;

use crate::application::access::Actor;
use crate::application::errors::{AppError, AppResult};
use crate::application::ports::carehome_manager_repository::CareHomeManagerRepository;
use crate::domain::users::permission::{Action, Permission, Resource};

pub struct UnassignManager<'a, R: CareHomeManagerRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: CareHomeManagerRepository + ?Sized> UnassignManager<'a, R> {
    pub async fn execute(&self, actor: &Actor, id: Uuid) -> AppResult<()> {
        actor.require(Permission::new(Action::Delete, Resource::CareHomeManager))?;
        let assignment = self
            .repo
            .get(actor.scope(), id)
            .await?
            .ok_or(AppError::NotFound)?;
        if !self.repo.delete(assignment.id).await? {
            return Err(AppError::NotFound);
        }
        tracing::info!(
            carehome_id = %assignment.carehome.id,
            manager_id = %assignment.manager.id,
            "carehome_manager_unassigned"
        );
        Ok(())
    }
}
