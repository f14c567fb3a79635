use crate::application::access::resolve_actor;
use crate::application::errors::{AppError, AppResult};
use crate::application::ports::revoked_token_repository::RevokedTokenRepository;
use crate::application::ports::user_repository::UserRepository;
use crate::application::services::tokens::{TokenKind, TokenService};

/// Exchanges a refresh token for a new access token.
pub struct RefreshAccess<'a, U, T>
where
    U: UserRepository + ?Sized,
    T: RevokedTokenRepository + ?Sized,
{
    pub users: &'a U,
    pub revoked: &'a T,
    pub tokens: &'a TokenService,
}

impl<'a, U, T> RefreshAccess<'a, U, T>
where
    U: UserRepository + ?Sized,
    T: RevokedTokenRepository + ?Sized,
{
    pub async fn execute(&self, refresh: &str) -> AppResult<String> {
        let claims = self.tokens.decode(refresh, TokenKind::Refresh)?;
        if self.revoked.is_revoked(claims.jti_uuid()?).await? {
            return Err(AppError::unauthorized("Token is blacklisted"));
        }
        let actor = resolve_actor(self.users, claims.subject()?).await?;
        let (access, _) = self.tokens.issue(actor.user_id, TokenKind::Access)?;
        Ok(access)
    }
}
