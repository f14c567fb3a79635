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
use super::extract::{ApiJson, ApiPath, ApiQuery, double_option};
use crate::application::errors::AppError;
use crate::application::use_cases::users::create::{CreateUser, CreateUserInput};
use crate::application::use_cases::users::delete::DeleteUser;
use crate::application::use_cases::users::get::GetUser;
use crate::application::use_cases::users::list::ListUsers;
use crate::application::use_cases::users::update::{UpdateUser, UserPatch};
use crate::bootstrap::app_context::AppContext;
use crate::domain::users::role::Role;
use crate::domain::users::user::User;

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub username: Option<String>,
    pub name: String,
    pub avatar: Option<String>,
    pub role: String,
    pub is_superadmin: bool,
    pub is_admin: bool,
    pub is_manager: bool,
    pub is_active: bool,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            is_superadmin: u.is_superadmin(),
            is_admin: u.is_admin(),
            is_manager: u.is_manager(),
            role: u.role.as_str().to_string(),
            id: u.id,
            email: u.email,
            username: u.username,
            name: u.name,
            avatar: u.avatar,
            is_active: u.is_active,
            created_by: u.created_by,
            created_at: u.created_at,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct UserTypeQuery {
    /// `admin` or `manager`.
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub avatar: Option<Option<String>>,
}

/// Only Admin and Manager accounts are created over HTTP.
fn parse_user_type(raw: Option<&str>) -> Result<Role, AppError> {
    match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
        Some("admin") => Ok(Role::Admin),
        Some("manager") => Ok(Role::Manager),
        _ => Err(AppError::validation("Invalid user type.")),
    }
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/users/", get(list_users).post(create_user))
        .route(
            "/users/:id/",
            get(get_user)
                .put(update_user)
                .patch(update_user)
                .delete(delete_user),
        )
        .with_state(ctx)
}

#[utoipa::path(get, path = "/api/auth/users/", tag = "Users", params(UserTypeQuery), responses(
    (status = 200, body = [UserResponse]),
    (status = 400, body = ErrorBody)
))]
pub async fn list_users(
    State(ctx): State<AppContext>,
    CurrentUser(actor): CurrentUser,
    ApiQuery(q): ApiQuery<UserTypeQuery>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let role = match q.kind.as_deref() {
        None => None,
        Some(raw) => Some(parse_user_type(Some(raw))?),
    };
    let repo = ctx.user_repo();
    let uc = ListUsers {
        repo: repo.as_ref(),
    };
    let users = uc.execute(&actor, role).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

#[utoipa::path(post, path = "/api/auth/users/", tag = "Users", params(UserTypeQuery), request_body = CreateUserRequest, responses(
    (status = 201, body = UserResponse),
    (status = 400, body = ErrorBody),
    (status = 403, body = ErrorBody),
    (status = 409, body = ErrorBody)
))]
pub async fn create_user(
    State(ctx): State<AppContext>,
    CurrentUser(actor): CurrentUser,
    ApiQuery(q): ApiQuery<UserTypeQuery>,
    ApiJson(req): ApiJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let role = parse_user_type(q.kind.as_deref())?;
    let repo = ctx.user_repo();
    let uc = CreateUser {
        repo: repo.as_ref(),
    };
    let user = uc
        .execute(
            &actor,
            CreateUserInput {
                role,
                email: req.email,
                name: req.name,
                password: req.password,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

#[utoipa::path(get, path = "/api/auth/users/{id}/", tag = "Users", params(("id" = Uuid, Path, description = "User id")), responses(
    (status = 200, body = UserResponse),
    (status = 404, body = ErrorBody)
))]
pub async fn get_user(
    State(ctx): State<AppContext>,
    CurrentUser(actor): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<UserResponse>, AppError> {
    let repo = ctx.user_repo();
    let uc = GetUser {
        repo: repo.as_ref(),
    };
    Ok(Json(UserResponse::from(uc.execute(&actor, id).await?)))
}

#[utoipa::path(patch, path = "/api/auth/users/{id}/", tag = "Users", params(("id" = Uuid, Path, description = "User id")), request_body = UpdateUserRequest, responses(
    (status = 200, body = UserResponse),
    (status = 400, body = ErrorBody),
    (status = 404, body = ErrorBody)
))]
pub async fn update_user(
    State(ctx): State<AppContext>,
    CurrentUser(actor): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let repo = ctx.user_repo();
    let uc = UpdateUser {
        repo: repo.as_ref(),
    };
    let patch = UserPatch {
        name: req.name,
        email: req.email,
        avatar: req.avatar,
    };
    Ok(Json(UserResponse::from(uc.execute(&actor, id, patch).await?)))
}

#[utoipa::path(delete, path = "/api/auth/users/{id}/", tag = "Users", params(("id" = Uuid, Path, description = "User id")), responses(
    (status = 204),
    (status = 404, body = ErrorBody)
))]
pub async fn delete_user(
    State(ctx): State<AppContext>,
    CurrentUser(actor): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, AppError> {
    let repo = ctx.user_repo();
    let uc = DeleteUser {
        repo: repo.as_ref(),
    };
    uc.execute(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
