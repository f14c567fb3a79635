use uuid::Uuid;

use crate::application::access::Actor;
use crate::application::errors::{AppError, AppResult};
use crate::application::ports::feedback_repository::FeedbackRepository;
use crate::domain::users::permission::{Action, Permission, Resource};

pub struct DeleteFeedback<'a, R: FeedbackRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: FeedbackRepository + ?Sized> DeleteFeedback<'a, R> {
    pub async fn execute(&self, actor: &Actor, id: Uuid) -> AppResult<()> {
        actor.require(Permission::new(Action::Delete, Resource::Feedback))?;
        if self.repo.get(actor.scope(), id).await?.is_none() || !self.repo.delete(id).await? {
            return Err(AppError::NotFound);
        }
        tracing::info!(feedback_id = %id, "feedback_deleted");
        Ok(())
    }
}
