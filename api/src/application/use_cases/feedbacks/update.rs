use chrono::NaiveDate;
use uuid::Uuid;

use crate::application::access::Actor;
use crate::application::errors::{AppError, AppResult};
use crate::application::ports::feedback_repository::FeedbackRepository;
use crate::application::ports::resident_repository::ResidentRepository;
use crate::domain::feedbacks::feedback::Feedback;
use crate::domain::users::permission::{Action, Permission, Resource};

pub struct UpdateFeedback<'a, F, R>
where
    F: FeedbackRepository + ?Sized,
    R: ResidentRepository + ?Sized,
{
    pub feedbacks: &'a F,
    pub residents: &'a R,
}

#[derive(Debug, Clone, Default)]
pub struct FeedbackPatch {
    pub resident_id: Option<Uuid>,
    pub session_date: Option<NaiveDate>,
    pub session_duration: Option<i32>,
    pub vr_experience: Option<String>,
    pub engagement_level: Option<i16>,
    pub satisfaction: Option<i16>,
    pub physical_impact: Option<i16>,
    pub cognitive_impact: Option<i16>,
    pub emotional_response: Option<String>,
    pub feedback_notes: Option<String>,
}

impl<'a, F, R> UpdateFeedback<'a, F, R>
where
    F: FeedbackRepository + ?Sized,
    R: ResidentRepository + ?Sized,
{
    pub async fn execute(&self, actor: &Actor, id: Uuid, patch: FeedbackPatch) -> AppResult<Feedback> {
        actor.require(Permission::new(Action::Change, Resource::Feedback))?;
        let mut fb = self
            .feedbacks
            .get(actor.scope(), id)
            .await?
            .ok_or(AppError::NotFound)?;

        if let Some(resident_id) = patch.resident_id {
            if self.residents.get(actor.scope(), resident_id).await?.is_none() {
                return Err(AppError::validation("Invalid resident."));
            }
            fb.resident_id = resident_id;
        }
        if let Some(v) = patch.session_date {
            fb.session_date = v;
        }
        if let Some(v) = patch.session_duration {
            fb.session_duration = v;
        }
        if let Some(v) = patch.vr_experience {
            fb.vr_experience = v;
        }
        if let Some(v) = patch.engagement_level {
            fb.engagement_level = v;
        }
        if let Some(v) = patch.satisfaction {
            fb.satisfaction = v;
        }
        if let Some(v) = patch.physical_impact {
            fb.physical_impact = v;
        }
        if let Some(v) = patch.cognitive_impact {
            fb.cognitive_impact = v;
        }
        if let Some(v) = patch.emotional_response {
            fb.emotional_response = v;
        }
        if let Some(v) = patch.feedback_notes {
            fb.feedback_notes = v;
        }
        fb.validate().map_err(AppError::Validation)?;

        self.feedbacks
            .update(&fb)
            .await?
            .ok_or(AppError::NotFound)
    }
}
