pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod transition;
pub mod update;

use uuid::Uuid;

use crate::application::access::Scope;
use crate::application::errors::{AppError, AppResult};
use crate::application::ports::feedback_repository::FeedbackRepository;
use crate::application::ports::session_repository::SessionRepository;

/// A linked feedback record must describe the same resident and must not
/// already be linked to another session.
async fn ensure_feedback_link<F, S>(
    feedbacks: &F,
    sessions: &S,
    scope: Scope,
    feedback_id: Uuid,
    resident_id: Uuid,
    session_id: Option<Uuid>,
) -> AppResult<()>
where
    F: FeedbackRepository + ?Sized,
    S: SessionRepository + ?Sized,
{
    let feedback = feedbacks
        .get(scope, feedback_id)
        .await?
        .ok_or_else(|| AppError::validation("Invalid feedback."))?;
    if feedback.resident_id != resident_id {
        return Err(AppError::validation(
            "Feedback must belong to the session's resident.",
        ));
    }
    if sessions
        .feedback_linked_elsewhere(feedback_id, session_id)
        .await?
    {
        return Err(AppError::Conflict(
            "This feedback is already linked to another session.".into(),
        ));
    }
    Ok(())
}
