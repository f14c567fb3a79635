use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::auth::CurrentUser;
use super::error::ErrorBody;
use super::extract::{ApiJson, ApiPath, ApiQuery, double_option};
use super::pagination::{PageQuery, Paginated, PaginatedSessions};
use super::residents::ResidentResponse;
use crate::application::access::Actor;
use crate::application::dto::filters::{FeedbackState, SessionFilter, SessionOrdering, StatusCategory};
use crate::application::errors::AppError;
use crate::application::use_cases::sessions::create::{CreateSession, SessionInput};
use crate::application::use_cases::sessions::delete::DeleteSession;
use crate::application::use_cases::sessions::get::GetSession;
use crate::application::use_cases::sessions::list::ListSessions;
use crate::application::use_cases::sessions::transition::TransitionSession;
use crate::application::use_cases::sessions::update::{SessionPatch, UpdateSession};
use crate::bootstrap::app_context::AppContext;
use crate::domain::sessions::session::{FeedbackStatus, SessionStatus, TherapySession, Transition};

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    pub id: Uuid,
    pub resident: Uuid,
    pub resident_details: ResidentResponse,
    pub scheduled_date: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    #[schema(value_type = String, example = "scheduled")]
    pub status: SessionStatus,
    pub notes: Option<String>,
    pub feedback: Option<Uuid>,
    /// "Completed", "Pending" or "Not Applicable".
    #[schema(value_type = String, example = "Not Applicable")]
    pub feedback_status: FeedbackStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TherapySession> for SessionResponse {
    fn from(s: TherapySession) -> Self {
        let feedback_status = s.feedback_status();
        Self {
            id: s.id,
            resident: s.resident.id,
            resident_details: s.resident.into(),
            scheduled_date: s.scheduled_date,
            end_time: s.end_time,
            status: s.status,
            notes: s.notes,
            feedback: s.feedback_id,
            feedback_status,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct SessionQuery {
    pub status: Option<String>,
    pub resident: Option<Uuid>,
    /// `completed`, `upcoming`, `past_due`, `in_progress` or `today`.
    pub status_category: Option<String>,
    /// `completed` or `pending`.
    pub feedback_status: Option<String>,
    pub search: Option<String>,
    /// `scheduled_date`, `created_at` or `updated_at`, `-` for descending.
    pub ordering: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSessionRequest {
    pub resident: Uuid,
    pub scheduled_date: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    #[schema(value_type = Option<String>)]
    pub status: Option<SessionStatus>,
    pub notes: Option<String>,
    pub feedback: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateSessionRequest {
    pub resident: Option<Uuid>,
    pub scheduled_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub end_time: Option<Option<DateTime<Utc>>>,
    #[schema(value_type = Option<String>)]
    pub status: Option<SessionStatus>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub notes: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<Uuid>)]
    pub feedback: Option<Option<Uuid>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TransitionResponse {
    pub status: String,
}

fn non_empty(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

fn session_filter(q: SessionQuery) -> Result<SessionFilter, AppError> {
    let status = non_empty(q.status.as_deref())
        .map(|s| s.parse::<SessionStatus>().map_err(AppError::Validation))
        .transpose()?;
    let category = non_empty(q.status_category.as_deref())
        .map(|s| {
            StatusCategory::parse(s)
                .ok_or_else(|| AppError::validation(format!("Invalid status_category \"{s}\".")))
        })
        .transpose()?;
    let feedback = non_empty(q.feedback_status.as_deref())
        .map(|s| {
            FeedbackState::parse(s)
                .ok_or_else(|| AppError::validation(format!("Invalid feedback_status \"{s}\".")))
        })
        .transpose()?;
    let ordering = match non_empty(q.ordering.as_deref()) {
        None => SessionOrdering::default(),
        Some(s) => SessionOrdering::parse(s)
            .ok_or_else(|| AppError::validation(format!("Invalid ordering \"{s}\".")))?,
    };
    Ok(SessionFilter {
        status,
        resident_id: q.resident,
        category,
        feedback,
        search: non_empty(q.search.as_deref()).map(str::to_string),
        ordering,
    })
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/sessions/", get(list_sessions).post(create_session))
        .route(
            "/sessions/:id/",
            get(get_session)
                .put(update_session)
                .patch(update_session)
                .delete(delete_session),
        )
        .route("/sessions/:id/mark_completed/", post(mark_completed))
        .route("/sessions/:id/mark_in_progress/", post(mark_in_progress))
        .route("/sessions/:id/cancel_session/", post(cancel_session))
        .with_state(ctx)
}

#[utoipa::path(get, path = "/api/sessions/", tag = "Sessions", params(PageQuery, SessionQuery), responses(
    (status = 200, body = PaginatedSessions),
    (status = 400, body = ErrorBody)
))]
pub async fn list_sessions(
    State(ctx): State<AppContext>,
    CurrentUser(actor): CurrentUser,
    ApiQuery(page): ApiQuery<PageQuery>,
    ApiQuery(q): ApiQuery<SessionQuery>,
) -> Result<Json<Paginated<SessionResponse>>, AppError> {
    let filter = session_filter(q)?;
    let repo = ctx.session_repo();
    let uc = ListSessions {
        repo: repo.as_ref(),
    };
    let page = uc.execute(&actor, &filter, page.request()).await?;
    Ok(Json(page.into()))
}

#[utoipa::path(post, path = "/api/sessions/", tag = "Sessions", request_body = CreateSessionRequest, responses(
    (status = 201, body = SessionResponse),
    (status = 400, body = ErrorBody),
    (status = 409, body = ErrorBody)
))]
pub async fn create_session(
    State(ctx): State<AppContext>,
    CurrentUser(actor): CurrentUser,
    ApiJson(req): ApiJson<CreateSessionRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), AppError> {
    let sessions = ctx.session_repo();
    let residents = ctx.resident_repo();
    let feedbacks = ctx.feedback_repo();
    let uc = CreateSession {
        sessions: sessions.as_ref(),
        residents: residents.as_ref(),
        feedbacks: feedbacks.as_ref(),
    };
    let session = uc
        .execute(
            &actor,
            SessionInput {
                resident_id: req.resident,
                scheduled_date: req.scheduled_date,
                end_time: req.end_time,
                status: req.status,
                notes: req.notes,
                feedback_id: req.feedback,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(session.into())))
}

#[utoipa::path(get, path = "/api/sessions/{id}/", tag = "Sessions", params(("id" = Uuid, Path, description = "Session id")), responses(
    (status = 200, body = SessionResponse),
    (status = 404, body = ErrorBody)
))]
pub async fn get_session(
    State(ctx): State<AppContext>,
    CurrentUser(actor): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    let repo = ctx.session_repo();
    let uc = GetSession {
        repo: repo.as_ref(),
    };
    Ok(Json(uc.execute(&actor, id).await?.into()))
}

#[utoipa::path(patch, path = "/api/sessions/{id}/", tag = "Sessions", params(("id" = Uuid, Path, description = "Session id")), request_body = UpdateSessionRequest, responses(
    (status = 200, body = SessionResponse),
    (status = 400, body = ErrorBody),
    (status = 404, body = ErrorBody),
    (status = 409, body = ErrorBody)
))]
pub async fn update_session(
    State(ctx): State<AppContext>,
    CurrentUser(actor): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateSessionRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let sessions = ctx.session_repo();
    let residents = ctx.resident_repo();
    let feedbacks = ctx.feedback_repo();
    let uc = UpdateSession {
        sessions: sessions.as_ref(),
        residents: residents.as_ref(),
        feedbacks: feedbacks.as_ref(),
    };
    let patch = SessionPatch {
        resident_id: req.resident,
        scheduled_date: req.scheduled_date,
        end_time: req.end_time,
        status: req.status,
        notes: req.notes,
        feedback_id: req.feedback,
    };
    Ok(Json(uc.execute(&actor, id, patch).await?.into()))
}

#[utoipa::path(delete, path = "/api/sessions/{id}/", tag = "Sessions", params(("id" = Uuid, Path, description = "Session id")), responses(
    (status = 204),
    (status = 404, body = ErrorBody)
))]
pub async fn delete_session(
    State(ctx): State<AppContext>,
    CurrentUser(actor): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, AppError> {
    let repo = ctx.session_repo();
    let uc = DeleteSession {
        repo: repo.as_ref(),
    };
    uc.execute(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn apply_transition(
    ctx: &AppContext,
    actor: &Actor,
    id: Uuid,
    transition: Transition,
) -> Result<Json<TransitionResponse>, AppError> {
    let repo = ctx.session_repo();
    let uc = TransitionSession {
        repo: repo.as_ref(),
    };
    uc.execute(actor, id, transition).await?;
    Ok(Json(TransitionResponse {
        status: transition.message().to_string(),
    }))
}

#[utoipa::path(post, path = "/api/sessions/{id}/mark_completed/", tag = "Sessions", params(("id" = Uuid, Path, description = "Session id")), responses(
    (status = 200, body = TransitionResponse),
    (status = 400, body = ErrorBody),
    (status = 404, body = ErrorBody)
))]
pub async fn mark_completed(
    State(ctx): State<AppContext>,
    CurrentUser(actor): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<TransitionResponse>, AppError> {
    apply_transition(&ctx, &actor, id, Transition::MarkCompleted).await
}

#[utoipa::path(post, path = "/api/sessions/{id}/mark_in_progress/", tag = "Sessions", params(("id" = Uuid, Path, description = "Session id")), responses(
    (status = 200, body = TransitionResponse),
    (status = 400, body = ErrorBody),
    (status = 404, body = ErrorBody)
))]
pub async fn mark_in_progress(
    State(ctx): State<AppContext>,
    CurrentUser(actor): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<TransitionResponse>, AppError> {
    apply_transition(&ctx, &actor, id, Transition::MarkInProgress).await
}

#[utoipa::path(post, path = "/api/sessions/{id}/cancel_session/", tag = "Sessions", params(("id" = Uuid, Path, description = "Session id")), responses(
    (status = 200, body = TransitionResponse),
    (status = 400, body = ErrorBody),
    (status = 404, body = ErrorBody)
))]
pub async fn cancel_session(
    State(ctx): State<AppContext>,
    CurrentUser(actor): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<TransitionResponse>, AppError> {
    apply_transition(&ctx, &actor, id, Transition::Cancel).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_params_are_ignored() {
        let q = SessionQuery {
            status: Some(" ".into()),
            search: Some(String::new()),
            ..Default::default()
        };
        let filter = session_filter(q).unwrap();
        assert!(filter.status.is_none());
        assert!(filter.search.is_none());
        assert_eq!(filter.ordering, SessionOrdering::default());
    }

    #[test]
    fn rejects_unknown_values() {
        let bad_status = SessionQuery {
            status: Some("done".into()),
            ..Default::default()
        };
        assert!(session_filter(bad_status).is_err());
        let bad_category = SessionQuery {
            status_category: Some("someday".into()),
            ..Default::default()
        };
        assert!(session_filter(bad_category).is_err());
    }

    #[test]
    fn parses_all_filters() {
        let q = SessionQuery {
            status: Some("in_progress".into()),
            status_category: Some("past_due".into()),
            feedback_status: Some("pending".into()),
            ordering: Some("-updated_at".into()),
            ..Default::default()
        };
        let filter = session_filter(q).unwrap();
        assert_eq!(filter.status, Some(SessionStatus::InProgress));
        assert_eq!(filter.category, Some(StatusCategory::PastDue));
        assert_eq!(filter.feedback, Some(FeedbackState::Pending));
        assert!(filter.ordering.descending);
    }
}
