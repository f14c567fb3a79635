use crate::application::access::{Actor, Scope};
use crate::application::dto::filters::UserFilter;
use crate::application::errors::AppResult;
use crate::application::ports::user_repository::UserRepository;
use crate::domain::users::permission::{Action, Permission, Resource};
use crate::domain::users::role::Role;
use crate::domain::users::user::User;

pub struct ListUsers<'a, R: UserRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: UserRepository + ?Sized> ListUsers<'a, R> {
    pub async fn execute(&self, actor: &Actor, role: Option<Role>) -> AppResult<Vec<User>> {
        actor.require(Permission::new(Action::View, Resource::User))?;
        let created_by = match actor.scope() {
            Scope::All => None,
            _ => Some(actor.user_id),
        };
        Ok(self.repo.list(&UserFilter { created_by, role }).await?)
    }
}
