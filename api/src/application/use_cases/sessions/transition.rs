use chrono::Utc;
use uuid::Uuid;

use crate::application::access::Actor;
use crate::application::errors::{AppError, AppResult};
use crate::application::ports::session_repository::SessionRepository;
use crate::domain::sessions::session::{TherapySession, Transition};
use crate::domain::users::permission::{Action, Permission, Resource};

/// Moves a session along its lifecycle (start, complete, cancel).
pub struct TransitionSession<'a, R: SessionRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: SessionRepository + ?Sized> TransitionSession<'a, R> {
    pub async fn execute(
        &self,
        actor: &Actor,
        id: Uuid,
        transition: Transition,
    ) -> AppResult<TherapySession> {
        actor.require(Permission::new(Action::Change, Resource::Session))?;
        let mut session = self
            .repo
            .get(actor.scope(), id)
            .await?
            .ok_or(AppError::NotFound)?;
        session.apply(transition, Utc::now());
        let session = self
            .repo
            .update(&session)
            .await?
            .ok_or(AppError::NotFound)?;
        tracing::info!(session_id = %session.id, status = %session.status, "session_status_changed");
        Ok(session)
    }
}
