use crate::application::access::Actor;
use crate::application::errors::{AppError, AppResult};
use crate::application::ports::user_repository::UserRepository;
use crate::application::services::accounts::{NewUser, UserManager};
use crate::domain::users::permission::{Action, Permission, Resource};
use crate::domain::users::role::Role;
use crate::domain::users::user::User;

pub struct CreateUser<'a, R: UserRepository + ?Sized> {
    pub repo: &'a R,
}

#[derive(Debug, Clone)]
pub struct CreateUserInput {
    pub role: Role,
    pub email: String,
    pub name: String,
    pub password: String,
}

impl<'a, R: UserRepository + ?Sized> CreateUser<'a, R> {
    pub async fn execute(&self, actor: &Actor, input: CreateUserInput) -> AppResult<User> {
        actor.require(Permission::new(Action::Add, Resource::User))?;
        if !actor.role.can_create(input.role) {
            return Err(AppError::forbidden(format!(
                "{} users cannot create {} users.",
                actor.role.label(),
                input.role.label()
            )));
        }
        if input.password.is_empty() {
            return Err(AppError::validation("password is required."));
        }
        let manager = UserManager { repo: self.repo };
        let user = manager
            .create_user(NewUser {
                email: input.email,
                name: input.name,
                password: Some(input.password),
                created_by: Some(actor.user_id),
                role: Some(input.role),
                ..Default::default()
            })
            .await?;
        Ok(user)
    }
}
