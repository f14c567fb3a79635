use uuid::Uuid;

use crate::application::access::Actor;
use crate::application::errors::{AppError, AppResult};
use crate::application::ports::feedback_repository::FeedbackRepository;
use crate::domain::feedbacks::feedback::Feedback;
use crate::domain::users::permission::{Action, Permission, Resource};

pub struct GetFeedback<'a, R: FeedbackRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: FeedbackRepository + ?Sized> GetFeedback<'a, R> {
    pub async fn execute(&self, actor: &Actor, id: Uuid) -> AppResult<Feedback> {
        actor.require(Permission::new(Action::View, Resource::Feedback))?;
        self.repo
            .get(actor.scope(), id)
            .await?
            .ok_or(AppError::NotFound)
    }
}
