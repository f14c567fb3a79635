use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::auth::CurrentUser;
use super::error::ErrorBody;
use super::extract::{ApiJson, ApiPath, double_option};
use crate::application::errors::AppError;
use crate::application::use_cases::carehomes::create::{CareHomeInput, CreateCareHome};
use crate::application::use_cases::carehomes::delete::DeleteCareHome;
use crate::application::use_cases::carehomes::get::GetCareHome;
use crate::application::use_cases::carehomes::list::ListCareHomes;
use crate::application::use_cases::carehomes::update::{CareHomePatch, UpdateCareHome};
use crate::bootstrap::app_context::AppContext;
use crate::domain::carehomes::carehome::CareHome;

#[derive(Debug, Serialize, ToSchema)]
pub struct CareHomeResponse {
    pub id: Uuid,
    pub name: String,
    pub code: Option<String>,
    pub admin: Option<Uuid>,
    pub address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CareHome> for CareHomeResponse {
    fn from(h: CareHome) -> Self {
        Self {
            id: h.id,
            name: h.name,
            code: h.code,
            admin: h.admin_id,
            address: h.address,
            created_at: h.created_at,
            updated_at: h.updated_at,
        }
    }
}

/// `code` is generated server-side and ignored if sent.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCareHomeRequest {
    pub name: String,
    pub address: String,
    pub admin: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateCareHomeRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<Uuid>)]
    pub admin: Option<Option<Uuid>>,
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/carehomes/", get(list_carehomes).post(create_carehome))
        .route(
            "/carehomes/:id/",
            get(get_carehome)
                .put(update_carehome)
                .patch(update_carehome)
                .delete(delete_carehome),
        )
        .with_state(ctx)
}

#[utoipa::path(get, path = "/api/carehomes/", tag = "CareHomes", responses(
    (status = 200, body = [CareHomeResponse])
))]
pub async fn list_carehomes(
    State(ctx): State<AppContext>,
    CurrentUser(actor): CurrentUser,
) -> Result<Json<Vec<CareHomeResponse>>, AppError> {
    let repo = ctx.carehome_repo();
    let uc = ListCareHomes {
        repo: repo.as_ref(),
    };
    let homes = uc.execute(&actor).await?;
    Ok(Json(homes.into_iter().map(CareHomeResponse::from).collect()))
}

#[utoipa::path(post, path = "/api/carehomes/", tag = "CareHomes", request_body = CreateCareHomeRequest, responses(
    (status = 201, body = CareHomeResponse),
    (status = 400, body = ErrorBody),
    (status = 403, body = ErrorBody)
))]
pub async fn create_carehome(
    State(ctx): State<AppContext>,
    CurrentUser(actor): CurrentUser,
    ApiJson(req): ApiJson<CreateCareHomeRequest>,
) -> Result<(StatusCode, Json<CareHomeResponse>), AppError> {
    let carehomes = ctx.carehome_repo();
    let users = ctx.user_repo();
    let uc = CreateCareHome {
        carehomes: carehomes.as_ref(),
        users: users.as_ref(),
    };
    let home = uc
        .execute(
            &actor,
            CareHomeInput {
                name: req.name,
                address: req.address,
                admin_id: req.admin,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(CareHomeResponse::from(home))))
}

#[utoipa::path(get, path = "/api/carehomes/{id}/", tag = "CareHomes", params(("id" = Uuid, Path, description = "Care home id")), responses(
    (status = 200, body = CareHomeResponse),
    (status = 404, body = ErrorBody)
))]
pub async fn get_carehome(
    State(ctx): State<AppContext>,
    CurrentUser(actor): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<CareHomeResponse>, AppError> {
    let repo = ctx.carehome_repo();
    let uc = GetCareHome {
        repo: repo.as_ref(),
    };
    Ok(Json(CareHomeResponse::from(uc.execute(&actor, id).await?)))
}

#[utoipa::path(patch, path = "/api/carehomes/{id}/", tag = "CareHomes", params(("id" = Uuid, Path, description = "Care home id")), request_body = UpdateCareHomeRequest, responses(
    (status = 200, body = CareHomeResponse),
    (status = 400, body = ErrorBody),
    (status = 404, body = ErrorBody)
))]
pub async fn update_carehome(
    State(ctx): State<AppContext>,
    CurrentUser(actor): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateCareHomeRequest>,
) -> Result<Json<CareHomeResponse>, AppError> {
    let carehomes = ctx.carehome_repo();
    let users = ctx.user_repo();
    let uc = UpdateCareHome {
        carehomes: carehomes.as_ref(),
        users: users.as_ref(),
    };
    let patch = CareHomePatch {
        name: req.name,
        address: req.address,
        admin_id: req.admin,
    };
    Ok(Json(CareHomeResponse::from(uc.execute(&actor, id, patch).await?)))
}

#[utoipa::path(delete, path = "/api/carehomes/{id}/", tag = "CareHomes", params(("id" = Uuid, Path, description = "Care home id")), responses(
    (status = 204),
    (status = 404, body = ErrorBody),
    (status = 409, body = ErrorBody)
))]
pub async fn delete_carehome(
    State(ctx): State<AppContext>,
    CurrentUser(actor): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, AppError> {
    let repo = ctx.carehome_repo();
    let uc = DeleteCareHome {
        repo: repo.as_ref(),
    };
    uc.execute(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
