use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::auth::CurrentUser;
use super::error::ErrorBody;
use super::extract::{ApiJson, ApiPath, ApiQuery};
use super::pagination::{PageQuery, Paginated, PaginatedFeedbacks};
use crate::application::dto::filters::FeedbackFilter;
use crate::application::errors::AppError;
use crate::application::use_cases::feedbacks::create::{CreateFeedback, FeedbackInput};
use crate::application::use_cases::feedbacks::delete::DeleteFeedback;
use crate::application::use_cases::feedbacks::get::GetFeedback;
use crate::application::use_cases::feedbacks::list::ListFeedbacks;
use crate::application::use_cases::feedbacks::update::{FeedbackPatch, UpdateFeedback};
use crate::bootstrap::app_context::AppContext;
use crate::domain::feedbacks::feedback::Feedback;

#[derive(Debug, Serialize, ToSchema)]
pub struct FeedbackResponse {
    pub id: Uuid,
    pub resident: Uuid,
    pub created_at: DateTime<Utc>,
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

impl From<Feedback> for FeedbackResponse {
    fn from(f: Feedback) -> Self {
        Self {
            id: f.id,
            resident: f.resident_id,
            created_at: f.created_at,
            session_date: f.session_date,
            session_duration: f.session_duration,
            vr_experience: f.vr_experience,
            engagement_level: f.engagement_level,
            satisfaction: f.satisfaction,
            physical_impact: f.physical_impact,
            cognitive_impact: f.cognitive_impact,
            emotional_response: f.emotional_response,
            feedback_notes: f.feedback_notes,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct FeedbackQuery {
    pub resident: Option<Uuid>,
    /// Inclusive lower bound on `session_date`.
    pub start_date: Option<NaiveDate>,
    /// Inclusive upper bound on `session_date`.
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateFeedbackRequest {
    pub resident: Uuid,
    pub session_date: NaiveDate,
    pub session_duration: i32,
    pub vr_experience: String,
    pub engagement_level: i16,
    pub satisfaction: i16,
    pub physical_impact: i16,
    pub cognitive_impact: i16,
    pub emotional_response: String,
    #[serde(default)]
    pub feedback_notes: String,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateFeedbackRequest {
    pub resident: Option<Uuid>,
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

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/feedbacks/", get(list_feedbacks).post(create_feedback))
        .route(
            "/feedbacks/:id/",
            get(get_feedback)
                .put(update_feedback)
                .patch(update_feedback)
                .delete(delete_feedback),
        )
        .with_state(ctx)
}

#[utoipa::path(get, path = "/api/feedbacks/", tag = "Feedbacks", params(PageQuery, FeedbackQuery), responses(
    (status = 200, body = PaginatedFeedbacks),
    (status = 400, body = ErrorBody)
))]
pub async fn list_feedbacks(
    State(ctx): State<AppContext>,
    CurrentUser(actor): CurrentUser,
    ApiQuery(page): ApiQuery<PageQuery>,
    ApiQuery(q): ApiQuery<FeedbackQuery>,
) -> Result<Json<Paginated<FeedbackResponse>>, AppError> {
    let filter = FeedbackFilter {
        resident_id: q.resident,
        start_date: q.start_date,
        end_date: q.end_date,
    };
    let repo = ctx.feedback_repo();
    let uc = ListFeedbacks {
        repo: repo.as_ref(),
    };
    let page = uc.execute(&actor, &filter, page.request()).await?;
    Ok(Json(page.into()))
}

#[utoipa::path(post, path = "/api/feedbacks/", tag = "Feedbacks", request_body = CreateFeedbackRequest, responses(
    (status = 201, body = FeedbackResponse),
    (status = 400, body = ErrorBody),
    (status = 403, body = ErrorBody)
))]
pub async fn create_feedback(
    State(ctx): State<AppContext>,
    CurrentUser(actor): CurrentUser,
    ApiJson(req): ApiJson<CreateFeedbackRequest>,
) -> Result<(StatusCode, Json<FeedbackResponse>), AppError> {
    let feedbacks = ctx.feedback_repo();
    let residents = ctx.resident_repo();
    let uc = CreateFeedback {
        feedbacks: feedbacks.as_ref(),
        residents: residents.as_ref(),
    };
    let feedback = uc
        .execute(
            &actor,
            FeedbackInput {
                resident_id: req.resident,
                session_date: req.session_date,
                session_duration: req.session_duration,
                vr_experience: req.vr_experience,
                engagement_level: req.engagement_level,
                satisfaction: req.satisfaction,
                physical_impact: req.physical_impact,
                cognitive_impact: req.cognitive_impact,
                emotional_response: req.emotional_response,
                feedback_notes: req.feedback_notes,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(feedback.into())))
}

#[utoipa::path(get, path = "/api/feedbacks/{id}/", tag = "Feedbacks", params(("id" = Uuid, Path, description = "Feedback id")), responses(
    (status = 200, body = FeedbackResponse),
    (status = 404, body = ErrorBody)
))]
pub async fn get_feedback(
    State(ctx): State<AppContext>,
    CurrentUser(actor): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<FeedbackResponse>, AppError> {
    let repo = ctx.feedback_repo();
    let uc = GetFeedback {
        repo: repo.as_ref(),
    };
    Ok(Json(uc.execute(&actor, id).await?.into()))
}

#[utoipa::path(patch, path = "/api/feedbacks/{id}/", tag = "Feedbacks", params(("id" = Uuid, Path, description = "Feedback id")), request_body = UpdateFeedbackRequest, responses(
    (status = 200, body = FeedbackResponse),
    (status = 400, body = ErrorBody),
    (status = 403, body = ErrorBody),
    (status = 404, body = ErrorBody)
))]
pub async fn update_feedback(
    State(ctx): State<AppContext>,
    CurrentUser(actor): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateFeedbackRequest>,
) -> Result<Json<FeedbackResponse>, AppError> {
    let feedbacks = ctx.feedback_repo();
    let residents = ctx.resident_repo();
    let uc = UpdateFeedback {
        feedbacks: feedbacks.as_ref(),
        residents: residents.as_ref(),
    };
    let patch = FeedbackPatch {
        resident_id: req.resident,
        session_date: req.session_date,
        session_duration: req.session_duration,
        vr_experience: req.vr_experience,
        engagement_level: req.engagement_level,
        satisfaction: req.satisfaction,
        physical_impact: req.physical_impact,
        cognitive_impact: req.cognitive_impact,
        emotional_response: req.emotional_response,
        feedback_notes: req.feedback_notes,
    };
    Ok(Json(uc.execute(&actor, id, patch).await?.into()))
}

#[utoipa::path(delete, path = "/api/feedbacks/{id}/", tag = "Feedbacks", params(("id" = Uuid, Path, description = "Feedback id")), responses(
    (status = 204),
    (status = 403, body = ErrorBody),
    (status = 404, body = ErrorBody)
))]
pub async fn delete_feedback(
    State(ctx): State<AppContext>,
    CurrentUser(actor): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, AppError> {
    let repo = ctx.feedback_repo();
    let uc = DeleteFeedback {
        repo: repo.as_ref(),
    };
    uc.execute(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
