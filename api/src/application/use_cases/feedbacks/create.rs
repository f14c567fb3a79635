use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::application::access::Actor;
use crate::application::errors::{AppError, AppResult};
use crate::application::ports::feedback_repository::FeedbackRepository;
use crate::application::ports::resident_repository::ResidentRepository;
use crate::domain::feedbacks::feedback::Feedback;
use crate::domain::users::permission::{Action, Permission, Resource};

pub struct CreateFeedback<'a, F, R>
where
    F: FeedbackRepository + ?Sized,
    R: ResidentRepository + ?Sized,
{
    pub feedbacks: &'a F,
    pub residents: &'a R,
}

#[derive(Debug, Clone)]
pub struct FeedbackInput {
    pub resident_id: Uuid,
    pub session_date: NaiveDate,
    pub session_duration: i32,
    pub vr_experience: String,
    pub engagement_level: i16,
    pub satisfaction: i16,
    pub physical_impact: i16,
    pub cognitive_impact: i16,
    pub emotional_response: String,
    pub feedback_notes: String,
}

impl<'a, F, R> CreateFeedback<'a, F, R>
where
    F: FeedbackRepository + ?Sized,
    R: ResidentRepository + ?Sized,
{
    pub async fn execute(&self, actor: &Actor, input: FeedbackInput) -> AppResult<Feedback> {
        actor.require(Permission::new(Action::Add, Resource::Feedback))?;
        if self.residents.get(actor.scope(), input.resident_id).await?.is_none() {
            return Err(AppError::validation("Invalid resident."));
        }
        let draft = Feedback {
            id: Uuid::nil(),
            resident_id: input.resident_id,
            created_at: Utc::now(),
            session_date: input.session_date,
            session_duration: input.session_duration,
            vr_experience: input.vr_experience,
            engagement_level: input.engagement_level,
            satisfaction: input.satisfaction,
            physical_impact: input.physical_impact,
            cognitive_impact: input.cognitive_impact,
            emotional_response: input.emotional_response,
            feedback_notes: input.feedback_notes,
        };
        draft.validate().map_err(AppError::Validation)?;
        let feedback = self.feedbacks.create(&draft).await?;
        tracing::info!(feedback_id = %feedback.id, resident_id = %feedback.resident_id, "feedback_created");
        Ok(feedback)
    }
}
