use axum::{
    Json, Router,
    extract::{FromRequestParts, State},
    http::{HeaderMap, HeaderValue, StatusCode, header, request::Parts},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::error::ErrorBody;
use super::extract::ApiJson;
use super::users::UserResponse;
use crate::application::access::{Actor, resolve_actor};
use crate::application::errors::AppError;
use crate::application::services::tokens::TokenKind;
use crate::application::use_cases::auth::login::{Login, LoginRequest};
use crate::application::use_cases::auth::logout::Logout;
use crate::application::use_cases::auth::me::GetMe;
use crate::application::use_cases::auth::refresh::RefreshAccess;
use crate::application::use_cases::auth::verify::VerifyToken;
use crate::bootstrap::app_context::AppContext;
use crate::bootstrap::config::Config;

#[derive(Debug, Deserialize, ToSchema)]
pub struct TokenRequest {
    pub email: String,
    pub password: String,
}

/// The refresh token travels only in the HttpOnly cookie.
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    pub access: String,
    pub name: String,
    pub is_admin: bool,
    pub is_superadmin: bool,
    pub is_manager: bool,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct RefreshRequest {
    pub refresh: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AccessResponse {
    pub access: String,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct VerifyRequest {
    pub token: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EmptyResponse {}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/token/", post(obtain_token))
        .route("/token/refresh/", post(refresh_token))
        .route("/token/verify/", post(verify_token))
        .route("/logout/", post(logout))
        .route("/user/", get(current_user))
        .with_state(ctx)
}

#[utoipa::path(post, path = "/api/auth/token/", tag = "Auth", request_body = TokenRequest, security(()), responses(
    (status = 200, body = TokenResponse),
    (status = 401, body = ErrorBody)
))]
pub async fn obtain_token(
    State(ctx): State<AppContext>,
    ApiJson(req): ApiJson<TokenRequest>,
) -> Result<(HeaderMap, Json<TokenResponse>), AppError> {
    let users = ctx.user_repo();
    let assignments = ctx.carehome_manager_repo();
    let uc = Login {
        users: users.as_ref(),
        assignments: assignments.as_ref(),
        tokens: ctx.tokens(),
    };
    let outcome = uc
        .execute(&LoginRequest {
            email: req.email,
            password: req.password,
        })
        .await?;

    let mut headers = HeaderMap::new();
    set_cookie(&mut headers, &build_refresh_cookie(&ctx.cfg, &outcome.tokens.refresh));
    let user = outcome.user;
    Ok((
        headers,
        Json(TokenResponse {
            access: outcome.tokens.access,
            is_admin: user.is_admin(),
            is_superadmin: user.is_superadmin(),
            is_manager: user.is_manager(),
            name: user.name,
        }),
    ))
}

#[utoipa::path(post, path = "/api/auth/token/refresh/", tag = "Auth", request_body = RefreshRequest, security(()), responses(
    (status = 200, body = AccessResponse),
    (status = 401, body = ErrorBody)
))]
pub async fn refresh_token(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    body: Option<ApiJson<RefreshRequest>>,
) -> Result<Json<AccessResponse>, AppError> {
    let supplied = body.and_then(|ApiJson(b)| b.refresh);
    let refresh = token_or_cookie(&ctx.cfg, supplied, &headers)
        .ok_or_else(|| AppError::unauthorized("No refresh token provided"))?;
    let users = ctx.user_repo();
    let revoked = ctx.revoked_tokens();
    let uc = RefreshAccess {
        users: users.as_ref(),
        revoked: revoked.as_ref(),
        tokens: ctx.tokens(),
    };
    let access = uc.execute(&refresh).await?;
    Ok(Json(AccessResponse { access }))
}

#[utoipa::path(post, path = "/api/auth/token/verify/", tag = "Auth", request_body = VerifyRequest, security(()), responses(
    (status = 200, body = EmptyResponse),
    (status = 401, body = ErrorBody)
))]
pub async fn verify_token(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    body: Option<ApiJson<VerifyRequest>>,
) -> Result<Json<EmptyResponse>, AppError> {
    let supplied = body.and_then(|ApiJson(b)| b.token);
    let token = token_or_cookie(&ctx.cfg, supplied, &headers)
        .ok_or_else(|| AppError::unauthorized("No token provided"))?;
    let revoked = ctx.revoked_tokens();
    let uc = VerifyToken {
        revoked: revoked.as_ref(),
        tokens: ctx.tokens(),
    };
    uc.execute(&token).await?;
    Ok(Json(EmptyResponse {}))
}

#[utoipa::path(post, path = "/api/auth/logout/", tag = "Auth", request_body = RefreshRequest, responses(
    (status = 205),
    (status = 401, body = ErrorBody)
))]
pub async fn logout(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    body: Option<ApiJson<RefreshRequest>>,
) -> Result<(HeaderMap, StatusCode), AppError> {
    let supplied = body.and_then(|ApiJson(b)| b.refresh);
    let refresh = token_or_cookie(&ctx.cfg, supplied, &headers)
        .ok_or_else(|| AppError::unauthorized("No refresh token provided"))?;
    let revoked = ctx.revoked_tokens();
    let uc = Logout {
        revoked: revoked.as_ref(),
        tokens: ctx.tokens(),
    };
    uc.execute(&refresh).await?;

    let mut out = HeaderMap::new();
    set_cookie(&mut out, &clear_refresh_cookie(&ctx.cfg));
    Ok((out, StatusCode::RESET_CONTENT))
}

#[utoipa::path(get, path = "/api/auth/user/", tag = "Auth", responses(
    (status = 200, body = UserResponse),
    (status = 401, body = ErrorBody)
))]
pub async fn current_user(
    State(ctx): State<AppContext>,
    CurrentUser(actor): CurrentUser,
) -> Result<Json<UserResponse>, AppError> {
    let repo = ctx.user_repo();
    let uc = GetMe {
        repo: repo.as_ref(),
    };
    let user = uc.execute(actor.user_id).await?;
    Ok(Json(UserResponse::from(user)))
}

// --- Bearer extractor ---

pub struct Bearer(pub String);

#[axum::async_trait]
impl<S> FromRequestParts<S> for Bearer
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|auth| auth.strip_prefix("Bearer "))
            .map(|t| Bearer(t.trim().to_string()))
            .filter(|b| !b.0.is_empty())
            .ok_or_else(|| AppError::unauthorized("Authentication credentials were not provided."))
    }
}

/// The authenticated, still-active account behind an access token.
pub struct CurrentUser(pub Actor);

#[axum::async_trait]
impl FromRequestParts<AppContext> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        let Bearer(token) = Bearer::from_request_parts(parts, ctx).await?;
        let claims = ctx.tokens().decode(&token, TokenKind::Access)?;
        let users = ctx.user_repo();
        let actor = resolve_actor(users.as_ref(), claims.subject()?).await?;
        Ok(CurrentUser(actor))
    }
}

// --- Cookie helpers ---

fn token_or_cookie(cfg: &Config, supplied: Option<String>, headers: &HeaderMap) -> Option<String> {
    supplied
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .or_else(|| {
            headers
                .get(header::COOKIE)
                .and_then(|v| v.to_str().ok())
                .and_then(|raw| get_cookie(raw, &cfg.auth_cookie_name))
                .filter(|t| !t.is_empty())
        })
}

fn get_cookie(cookie_header: &str, name: &str) -> Option<String> {
    for part in cookie_header.split(';') {
        let kv = part.trim();
        if let Some((k, v)) = kv.split_once('=') {
            if k.trim() == name {
                return Some(v.trim().to_string());
            }
        }
    }
    None
}

fn build_refresh_cookie(cfg: &Config, token: &str) -> String {
    cookie(cfg, token, cfg.jwt_refresh_expires_secs.max(0))
}

fn clear_refresh_cookie(cfg: &Config) -> String {
    cookie(cfg, "", 0)
}

fn cookie(cfg: &Config, value: &str, max_age_secs: i64) -> String {
    let secure_attr = if cfg.auth_cookie_secure { "; Secure" } else { "" };
    format!(
        "{}={}; HttpOnly{}; Path=/; Max-Age={}; SameSite={}",
        cfg.auth_cookie_name,
        value,
        secure_attr,
        max_age_secs,
        cfg.auth_cookie_samesite.as_str()
    )
}

fn set_cookie(headers: &mut HeaderMap, cookie: &str) {
    match HeaderValue::from_str(cookie) {
        Ok(v) => {
            headers.insert(header::SET_COOKIE, v);
        }
        Err(err) => tracing::warn!(error = ?err, "refusing to emit malformed cookie"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> Config {
        Config::from_lookup(|_| None).unwrap()
    }

    #[test]
    fn reads_named_cookie() {
        let raw = "theme=dark; refresh_token=abc.def.ghi ; other=1";
        assert_eq!(get_cookie(raw, "refresh_token").as_deref(), Some("abc.def.ghi"));
        assert_eq!(get_cookie(raw, "missing"), None);
    }

    #[test]
    fn refresh_cookie_is_http_only_with_refresh_lifetime() {
        let c = build_refresh_cookie(&cfg(), "tok");
        assert!(c.starts_with("refresh_token=tok; HttpOnly"));
        assert!(c.contains("Max-Age=86400"));
        assert!(c.contains("SameSite=Lax"));
        assert!(!c.contains("Secure"));
        assert!(clear_refresh_cookie(&cfg()).contains("Max-Age=0"));
    }

    #[test]
    fn body_token_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("refresh_token=from-cookie"));
        assert_eq!(
            token_or_cookie(&cfg(), Some("from-body".into()), &headers).as_deref(),
            Some("from-body")
        );
        assert_eq!(
            token_or_cookie(&cfg(), Some("  ".into()), &headers).as_deref(),
            Some("from-cookie")
        );
        assert_eq!(token_or_cookie(&cfg(), None, &HeaderMap::new()), None);
    }
}
