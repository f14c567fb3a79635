use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::ensure_feedback_link;
use crate::application::access::Actor;
use crate::application::errors::{AppError, AppResult};
use crate::application::ports::feedback_repository::FeedbackRepository;
use crate::application::ports::resident_repository::ResidentRepository;
use crate::application::ports::session_repository::SessionRepository;
use crate::domain::sessions::session::{SessionStatus, TherapySession};
use crate::domain::users::permission::{Action, Permission, Resource};

pub struct UpdateSession<'a, S, R, F>
where
    S: SessionRepository + ?Sized,
    R: ResidentRepository + ?Sized,
    F: FeedbackRepository + ?Sized,
{
    pub sessions: &'a S,
    pub residents: &'a R,
    pub feedbacks: &'a F,
}

/// Absent fields are left unchanged; `Some(None)` clears a nullable one.
#[derive(Debug, Clone, Default)]
pub struct SessionPatch {
    pub resident_id: Option<Uuid>,
    pub scheduled_date: Option<DateTime<Utc>>,
    pub end_time: Option<Option<DateTime<Utc>>>,
    pub status: Option<SessionStatus>,
    pub notes: Option<Option<String>>,
    pub feedback_id: Option<Option<Uuid>>,
}

impl<'a, S, R, F> UpdateSession<'a, S, R, F>
where
    S: SessionRepository + ?Sized,
    R: ResidentRepository + ?Sized,
    F: FeedbackRepository + ?Sized,
{
    pub async fn execute(&self, actor: &Actor, id: Uuid, patch: SessionPatch) -> AppResult<TherapySession> {
        actor.require(Permission::new(Action::Change, Resource::Session))?;
        let scope = actor.scope();
        let mut session = self
            .sessions
            .get(scope, id)
            .await?
            .ok_or(AppError::NotFound)?;

        if let Some(resident_id) = patch.resident_id {
            session.resident = self
                .residents
                .get(scope, resident_id)
                .await?
                .ok_or_else(|| AppError::validation("Invalid resident."))?;
        }
        if let Some(v) = patch.scheduled_date {
            session.scheduled_date = v;
        }
        if let Some(v) = patch.end_time {
            session.end_time = v;
        }
        if let Some(v) = patch.status {
            session.status = v;
        }
        if let Some(v) = patch.notes {
            session.notes = v;
        }
        if let Some(v) = patch.feedback_id {
            session.feedback_id = v;
        }
        if let Some(end) = session.end_time {
            if end < session.scheduled_date {
                return Err(AppError::validation("end_time cannot precede scheduled_date."));
            }
        }
        if let Some(fid) = session.feedback_id {
            ensure_feedback_link(
                self.feedbacks,
                self.sessions,
                scope,
                fid,
                session.resident.id,
                Some(session.id),
            )
            .await?;
        }

        self.sessions
            .update(&session)
            .await?
            .ok_or(AppError::NotFound)
    }
}
