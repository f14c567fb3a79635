use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::ensure_feedback_link;
use crate::application::access::Actor;
use crate::application::errors::{AppError, AppResult};
use crate::application::ports::feedback_repository::FeedbackRepository;
use crate::application::ports::resident_repository::ResidentRepository;
use crate::application::ports::session_repository::{NewSession, SessionRepository};
use crate::domain::sessions::session::{SessionStatus, TherapySession};
use crate::domain::users::permission::{Action, Permission, Resource};

pub struct CreateSession<'a, S, R, F>
where
    S: SessionRepository + ?Sized,
    R: ResidentRepository + ?Sized,
    F: FeedbackRepository + ?Sized,
{
    pub sessions: &'a S,
    pub residents: &'a R,
    pub feedbacks: &'a F,
}

#[derive(Debug, Clone)]
pub struct SessionInput {
    pub resident_id: Uuid,
    pub scheduled_date: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub status: Option<SessionStatus>,
    pub notes: Option<String>,
    pub feedback_id: Option<Uuid>,
}

impl<'a, S, R, F> CreateSession<'a, S, R, F>
where
    S: SessionRepository + ?Sized,
    R: ResidentRepository + ?Sized,
    F: FeedbackRepository + ?Sized,
{
    pub async fn execute(&self, actor: &Actor, input: SessionInput) -> AppResult<TherapySession> {
        actor.require(Permission::new(Action::Add, Resource::Session))?;
        let scope = actor.scope();
        if self.residents.get(scope, input.resident_id).await?.is_none() {
            return Err(AppError::validation("Invalid resident."));
        }
        if let Some(end) = input.end_time {
            if end < input.scheduled_date {
                return Err(AppError::validation("end_time cannot precede scheduled_date."));
            }
        }
        if let Some(fid) = input.feedback_id {
            ensure_feedback_link(self.feedbacks, self.sessions, scope, fid, input.resident_id, None)
                .await?;
        }

        let session = self
            .sessions
            .create(NewSession {
                resident_id: input.resident_id,
                scheduled_date: input.scheduled_date,
                end_time: input.end_time,
                status: input.status.unwrap_or(SessionStatus::Scheduled),
                notes: input.notes,
                feedback_id: input.feedback_id,
            })
            .await?;
        tracing::info!(session_id = %session.id, resident_id = %session.resident.id, "session_created");
        Ok(session)
    }
}
