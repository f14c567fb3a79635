use uuid::Uuid;

use crate::application::access::Actor;
use crate::application::errors::{AppError, AppResult};
use crate::application::ports::session_repository::SessionRepository;
use crate::domain::users::permission::{Action, Permission, Resource};

pub struct DeleteSession<'a, R: SessionRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: SessionRepository + ?Sized> DeleteSession<'a, R> {
    pub async fn execute(&self, actor: &Actor, id: Uuid) -> AppResult<()> {
        actor.require(Permission::new(Action::Delete, Resource::Session))?;
        if self.repo.get(actor.scope(), id).await?.is_none() || !self.repo.delete(id).await? {
            return Err(AppError::NotFound);
        }
        tracing::info!(session_id = %id, "session_deleted");
        Ok(())
    }
}
