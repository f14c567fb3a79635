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
use super::pagination::{PageQuery, Paginated, PaginatedResidents};
use crate::application::dto::filters::ResidentFilter;
use crate::application::errors::AppError;
use crate::application::use_cases::residents::create::{CreateResident, ResidentInput};
use crate::application::use_cases::residents::delete::DeleteResident;
use crate::application::use_cases::residents::get::GetResident;
use crate::application::use_cases::residents::list::ListResidents;
use crate::application::use_cases::residents::update::{ResidentPatch, UpdateResident};
use crate::bootstrap::app_context::AppContext;
use crate::domain::residents::resident::{CareHomeRef, Resident};

#[derive(Debug, Serialize, ToSchema)]
pub struct CareHomeName {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ResidentResponse {
    pub id: Uuid,
    pub name: String,
    pub date_of_birth: NaiveDate,
    pub care_home: CareHomeName,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CareHomeRef> for CareHomeName {
    fn from(c: CareHomeRef) -> Self {
        Self {
            id: c.id,
            name: c.name,
        }
    }
}

impl From<Resident> for ResidentResponse {
    fn from(r: Resident) -> Self {
        Self {
            id: r.id,
            name: r.name,
            date_of_birth: r.date_of_birth,
            care_home: r.carehome.into(),
            created_by: r.created_by,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ResidentQuery {
    /// Case-insensitive match on the resident name.
    pub search: Option<String>,
}

/// The care home comes from the creating user; only a SuperAdmin may name one.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateResidentRequest {
    pub name: String,
    pub date_of_birth: NaiveDate,
    pub carehome: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateResidentRequest {
    pub name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/residents/", get(list_residents).post(create_resident))
        .route(
            "/residents/:id/",
            get(get_resident)
                .put(update_resident)
                .patch(update_resident)
                .delete(delete_resident),
        )
        .with_state(ctx)
}

#[utoipa::path(get, path = "/api/residents/", tag = "Residents", params(PageQuery, ResidentQuery), responses(
    (status = 200, body = PaginatedResidents)
))]
pub async fn list_residents(
    State(ctx): State<AppContext>,
    CurrentUser(actor): CurrentUser,
    ApiQuery(page): ApiQuery<PageQuery>,
    ApiQuery(q): ApiQuery<ResidentQuery>,
) -> Result<Json<Paginated<ResidentResponse>>, AppError> {
    let filter = ResidentFilter {
        search: q.search.filter(|s| !s.trim().is_empty()),
    };
    let repo = ctx.resident_repo();
    let uc = ListResidents {
        repo: repo.as_ref(),
    };
    let page = uc.execute(&actor, &filter, page.request()).await?;
    Ok(Json(page.into()))
}

#[utoipa::path(post, path = "/api/residents/", tag = "Residents", request_body = CreateResidentRequest, responses(
    (status = 201, body = ResidentResponse),
    (status = 400, body = ErrorBody),
    (status = 403, body = ErrorBody)
))]
pub async fn create_resident(
    State(ctx): State<AppContext>,
    CurrentUser(actor): CurrentUser,
    ApiJson(req): ApiJson<CreateResidentRequest>,
) -> Result<(StatusCode, Json<ResidentResponse>), AppError> {
    let residents = ctx.resident_repo();
    let carehomes = ctx.carehome_repo();
    let assignments = ctx.carehome_manager_repo();
    let uc = CreateResident {
        residents: residents.as_ref(),
        carehomes: carehomes.as_ref(),
        assignments: assignments.as_ref(),
    };
    let resident = uc
        .execute(
            &actor,
            ResidentInput {
                name: req.name,
                date_of_birth: req.date_of_birth,
                carehome_id: req.carehome,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(resident.into())))
}

#[utoipa::path(get, path = "/api/residents/{id}/", tag = "Residents", params(("id" = Uuid, Path, description = "Resident id")), responses(
    (status = 200, body = ResidentResponse),
    (status = 404, body = ErrorBody)
))]
pub async fn get_resident(
    State(ctx): State<AppContext>,
    CurrentUser(actor): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ResidentResponse>, AppError> {
    let repo = ctx.resident_repo();
    let uc = GetResident {
        repo: repo.as_ref(),
    };
    Ok(Json(uc.execute(&actor, id).await?.into()))
}

#[utoipa::path(patch, path = "/api/residents/{id}/", tag = "Residents", params(("id" = Uuid, Path, description = "Resident id")), request_body = UpdateResidentRequest, responses(
    (status = 200, body = ResidentResponse),
    (status = 400, body = ErrorBody),
    (status = 404, body = ErrorBody)
))]
pub async fn update_resident(
    State(ctx): State<AppContext>,
    CurrentUser(actor): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateResidentRequest>,
) -> Result<Json<ResidentResponse>, AppError> {
    let repo = ctx.resident_repo();
    let uc = UpdateResident {
        repo: repo.as_ref(),
    };
    let patch = ResidentPatch {
        name: req.name,
        date_of_birth: req.date_of_birth,
    };
    Ok(Json(uc.execute(&actor, id, patch).await?.into()))
}

#[utoipa::path(delete, path = "/api/residents/{id}/", tag = "Residents", params(("id" = Uuid, Path, description = "Resident id")), responses(
    (status = 204),
    (status = 404, body = ErrorBody),
    (status = 409, body = ErrorBody)
))]
pub async fn delete_resident(
    State(ctx): State<AppContext>,
    CurrentUser(actor): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, AppError> {
    let repo = ctx.resident_repo();
    let uc = DeleteResident {
        repo: repo.as_ref(),
    };
    uc.execute(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
