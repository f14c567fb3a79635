use uuid::Uuid;

use super::is_visible;
use crate::application::access::Actor;
use crate::application::errors::{AppError, AppResult};
use crate::application::ports::user_repository::UserRepository;
use crate::domain::users::permission::{Action, Permission, Resource};
use crate::domain::users::user::User;

pub struct GetUser<'a, R: UserRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: UserRepository + ?Sized> GetUser<'a, R> {
    pub async fn execute(&self, actor: &Actor, id: Uuid) -> AppResult<User> {
        actor.require(Permission::new(Action::View, Resource::User))?;
        self.repo
            .find_by_id(id)
            .await?
            .filter(|u| is_visible(actor, u))
            .ok_or(AppError::NotFound)
    }
}
