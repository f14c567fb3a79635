use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::auth::CurrentUser;
use super::error::ErrorBody;
use super::extract::{ApiJson, ApiPath, ApiQuery};
use super::users::UserResponse;
use crate::application::errors::AppError;
use crate::application::use_cases::carehome_managers::assign::AssignManager;
use crate::application::use_cases::carehome_managers::get::GetAssignment;
use crate::application::use_cases::carehome_managers::list::{
    AssignmentListing, AssignmentQuery, ListAssignments,
};
use crate::application::use_cases::carehome_managers::unassign::UnassignManager;
use crate::bootstrap::app_context::AppContext;
use crate::domain::carehomes::carehome::{CareHomeSummary, ManagerAssignment, ManagerSummary};

#[derive(Debug, Serialize, ToSchema)]
pub struct ManagerDetails {
    pub id: Uuid,
    pub email: String,
    pub name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CareHomeDetails {
    pub id: Uuid,
    pub name: String,
    pub code: Option<String>,
    pub address: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AssignmentResponse {
    pub id: Uuid,
    pub manager: ManagerDetails,
    pub carehome: CareHomeDetails,
    pub created_at: DateTime<Utc>,
}

impl From<ManagerSummary> for ManagerDetails {
    fn from(m: ManagerSummary) -> Self {
        Self {
            id: m.id,
            email: m.email,
            name: m.name,
        }
    }
}

impl From<CareHomeSummary> for CareHomeDetails {
    fn from(c: CareHomeSummary) -> Self {
        Self {
            id: c.id,
            name: c.name,
            code: c.code,
            address: c.address,
        }
    }
}

impl From<ManagerAssignment> for AssignmentResponse {
    fn from(a: ManagerAssignment) -> Self {
        Self {
            id: a.id,
            manager: a.manager.into(),
            carehome: a.carehome.into(),
            created_at: a.created_at,
        }
    }
}

/// `?type=unassigned` returns bare manager accounts instead of assignments.
#[derive(Debug, Serialize, ToSchema)]
#[serde(untagged)]
pub enum AssignmentListResponse {
    Assignments(Vec<AssignmentResponse>),
    Managers(Vec<UserResponse>),
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct AssignmentListQuery {
    pub carehome: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignRequest {
    pub carehome_id: Uuid,
    pub manager_id: Uuid,
}

fn listing_query(q: &AssignmentListQuery) -> Result<AssignmentQuery, AppError> {
    if let Some(raw) = q.carehome.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let id = Uuid::parse_str(raw).map_err(|_| AppError::validation("Invalid carehome."))?;
        return Ok(AssignmentQuery::ForCareHome(id));
    }
    if q.kind.as_deref() == Some("unassigned") {
        return Ok(AssignmentQuery::Unassigned);
    }
    Ok(AssignmentQuery::All)
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route(
            "/carehome-managers/",
            get(list_assignments).post(assign_manager),
        )
        .route(
            "/carehome-managers/:id/",
            get(get_assignment).delete(unassign_manager),
        )
        .with_state(ctx)
}

#[utoipa::path(get, path = "/api/carehome-managers/", tag = "CareHomeManagers", params(AssignmentListQuery), responses(
    (status = 200, body = AssignmentListResponse),
    (status = 400, body = ErrorBody),
    (status = 403, body = ErrorBody)
))]
pub async fn list_assignments(
    State(ctx): State<AppContext>,
    CurrentUser(actor): CurrentUser,
    ApiQuery(q): ApiQuery<AssignmentListQuery>,
) -> Result<Json<AssignmentListResponse>, AppError> {
    let query = listing_query(&q)?;
    let repo = ctx.carehome_manager_repo();
    let uc = ListAssignments {
        repo: repo.as_ref(),
    };
    let body = match uc.execute(&actor, query).await? {
        AssignmentListing::Assignments(items) => AssignmentListResponse::Assignments(
            items.into_iter().map(AssignmentResponse::from).collect(),
        ),
        AssignmentListing::UnassignedManagers(users) => AssignmentListResponse::Managers(
            users.into_iter().map(UserResponse::from).collect(),
        ),
    };
    Ok(Json(body))
}

#[utoipa::path(post, path = "/api/carehome-managers/", tag = "CareHomeManagers", request_body = AssignRequest, responses(
    (status = 201, body = AssignmentResponse),
    (status = 400, body = ErrorBody),
    (status = 409, body = ErrorBody)
))]
pub async fn assign_manager(
    State(ctx): State<AppContext>,
    CurrentUser(actor): CurrentUser,
    ApiJson(req): ApiJson<AssignRequest>,
) -> Result<(StatusCode, Json<AssignmentResponse>), AppError> {
    let assignments = ctx.carehome_manager_repo();
    let carehomes = ctx.carehome_repo();
    let users = ctx.user_repo();
    let uc = AssignManager {
        assignments: assignments.as_ref(),
        carehomes: carehomes.as_ref(),
        users: users.as_ref(),
    };
    let assignment = uc.execute(&actor, req.carehome_id, req.manager_id).await?;
    Ok((StatusCode::CREATED, Json(assignment.into())))
}

#[utoipa::path(get, path = "/api/carehome-managers/{id}/", tag = "CareHomeManagers", params(("id" = Uuid, Path, description = "Assignment id")), responses(
    (status = 200, body = AssignmentResponse),
    (status = 404, body = ErrorBody)
))]
pub async fn get_assignment(
    State(ctx): State<AppContext>,
    CurrentUser(actor): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<AssignmentResponse>, AppError> {
    let repo = ctx.carehome_manager_repo();
    let uc = GetAssignment {
        repo: repo.as_ref(),
    };
    Ok(Json(uc.execute(&actor, id).await?.into()))
}

#[utoipa::path(delete, path = "/api/carehome-managers/{id}/", tag = "CareHomeManagers", params(("id" = Uuid, Path, description = "Assignment id")), responses(
    (status = 204),
    (status = 404, body = ErrorBody)
))]
pub async fn unassign_manager(
    State(ctx): State<AppContext>,
    CurrentUser(actor): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, AppError> {
    let repo = ctx.carehome_manager_repo();
    let uc = UnassignManager {
        repo: repo.as_ref(),
    };
    uc.execute(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
