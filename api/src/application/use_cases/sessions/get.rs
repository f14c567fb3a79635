use uuid::Uuid;

use crate::application::access::Actor;
use crate::application::errors::{AppError, AppResult};
use crate::application::ports::session_repository::SessionRepository;
use crate::domain::sessions::session::TherapySession;
use crate::domain::users::permission::{Action, Permission, Resource};

pub struct GetSession<'a, R: SessionRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: SessionRepository + ?Sized> GetSession<'a, R> {
    pub async fn execute(&self, actor: &Actor, id: Uuid) -> AppResult<TherapySession> {
        actor.require(Permission::new(Action::View, Resource::Session))?;
        self.repo
            .get(actor.scope(), id)
            .await?
            .ok_or(AppError::NotFound)
    }
}
