use uuid::Uuid;

use super::is_visible;
use crate::application::access::Actor;
use crate::application::errors::{AppError, AppResult};
use crate::application::ports::user_repository::UserRepository;
use crate::domain::users::permission::{Action, Permission, Resource};

pub struct DeleteUser<'a, R: UserRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: UserRepository + ?Sized> DeleteUser<'a, R> {
    pub async fn execute(&self, actor: &Actor, id: Uuid) -> AppResult<()> {
        actor.require(Permission::new(Action::Delete, Resource::User))?;
        if id == actor.user_id {
            return Err(AppError::validation("You cannot delete your own account."));
        }
        let visible = self
            .repo
            .find_by_id(id)
            .await?
            .is_some_and(|u| is_visible(actor, &u));
        if !visible || !self.repo.delete_user(id).await? {
            return Err(AppError::NotFound);
        }
        tracing::info!(user_id = %id, deleted_by = %actor.user_id, "user_deleted");
        Ok(())
    }
}
