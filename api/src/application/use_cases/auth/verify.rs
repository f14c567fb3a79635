use crate::application::errors::{AppError, AppResult};
use crate::application::ports::revoked_token_repository::RevokedTokenRepository;
use crate::application::services::tokens::{TokenError, TokenKind, TokenService};

/// Accepts either token kind. Refresh tokens must not be revoked.
pub struct VerifyToken<'a, T: RevokedTokenRepository + ?Sized> {
    pub revoked: &'a T,
    pub tokens: &'a TokenService,
}

impl<'a, T: RevokedTokenRepository + ?Sized> VerifyToken<'a, T> {
    pub async fn execute(&self, token: &str) -> AppResult<()> {
        let claims = match self.tokens.decode(token, TokenKind::Access) {
            Err(TokenError::WrongKind) => self.tokens.decode(token, TokenKind::Refresh)?,
            other => other?,
        };
        if claims.token_type == TokenKind::Refresh
            && self.revoked.is_revoked(claims.jti_uuid()?).await?
        {
            return Err(AppError::unauthorized("Token is blacklisted"));
        }
        Ok(())
    }
}
