use crate::application::access::Actor;
use crate::application::dto::filters::FeedbackFilter;
use crate::application::dto::pagination::{Page, PageRequest};
use crate::application::errors::{AppError, AppResult};
use crate::application::ports::feedback_repository::FeedbackRepository;
use crate::domain::feedbacks::feedback::Feedback;
use crate::domain::users::permission::{Action, Permission, Resource};

pub struct ListFeedbacks<'a, R: FeedbackRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: FeedbackRepository + ?Sized> ListFeedbacks<'a, R> {
    pub async fn execute(
        &self,
        actor: &Actor,
        filter: &FeedbackFilter,
        page: PageRequest,
    ) -> AppResult<Page<Feedback>> {
        actor.require(Permission::new(Action::View, Resource::Feedback))?;
        if let (Some(start), Some(end)) = (filter.start_date, filter.end_date) {
            if start > end {
                return Err(AppError::validation("start_date must not be after end_date."));
            }
        }
        Ok(self.repo.list(actor.scope(), filter, page).await?)
    }
}
