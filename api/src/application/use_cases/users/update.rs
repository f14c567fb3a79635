use uuid::Uuid;

use super::is_visible;
use crate::application::access::Actor;
use crate::application::errors::{AppError, AppResult};
use crate::application::ports::user_repository::UserRepository;
use crate::application::services::accounts::{USER_NAME_MAX, is_valid_email, normalize_email};
use crate::domain::users::permission::{Action, Permission, Resource};
use crate::domain::users::user::User;

pub struct UpdateUser<'a, R: UserRepository + ?Sized> {
    pub repo: &'a R,
}

/// Absent fields are left unchanged. The role is never writable.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<Option<String>>,
}

impl<'a, R: UserRepository + ?Sized> UpdateUser<'a, R> {
    pub async fn execute(&self, actor: &Actor, id: Uuid, patch: UserPatch) -> AppResult<User> {
        actor.require(Permission::new(Action::Change, Resource::User))?;
        let mut user = self
            .repo
            .find_by_id(id)
            .await?
            .filter(|u| is_visible(actor, u))
            .ok_or(AppError::NotFound)?;

        if let Some(name) = patch.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(AppError::validation("Name is required."));
            }
            if name.chars().count() > USER_NAME_MAX {
                return Err(AppError::validation(format!(
                    "Name must be at most {USER_NAME_MAX} characters."
                )));
            }
            user.name = name.to_string();
        }
        if let Some(email) = patch.email {
            if !is_valid_email(email.trim()) {
                return Err(AppError::validation("Enter a valid email address."));
            }
            let email = normalize_email(&email);
            if email != user.email {
                if let Some(other) = self.repo.find_by_email(&email).await? {
                    if other.id != user.id {
                        return Err(AppError::Conflict(
                            "A user with this email already exists.".into(),
                        ));
                    }
                }
                user.email = email;
            }
        }
        if let Some(avatar) = patch.avatar {
            user.avatar = avatar;
        }

        self.repo
            .update_profile(&user)
            .await?
            .ok_or(AppError::NotFound)
    }
}
