use chrono::Utc;

use crate::application::access::Actor;
use crate::application::dto::filters::SessionFilter;
use crate::application::dto::pagination::{Page, PageRequest};
use crate::application::errors::AppResult;
use crate::application::ports::session_repository::SessionRepository;
use crate::domain::sessions::session::TherapySession;
use crate::domain::users::permission::{Action, Permission, Resource};

pub struct ListSessions<'a, R: SessionRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: SessionRepository + ?Sized> ListSessions<'a, R> {
    pub async fn execute(
        &self,
        actor: &Actor,
        filter: &SessionFilter,
        page: PageRequest,
    ) -> AppResult<Page<TherapySession>> {
        actor.require(Permission::new(Action::View, Resource::Session))?;
        Ok(self.repo.list(actor.scope(), filter, Utc::now(), page).await?)
    }
}
