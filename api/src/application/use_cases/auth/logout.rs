use chrono::Utc;

use crate::application::errors::AppResult;
use crate::application::ports::revoked_token_repository::RevokedTokenRepository;
use crate::application::services::tokens::{TokenKind, TokenService};

/// Blacklists a refresh token by its `jti`.
pub struct Logout<'a, T: RevokedTokenRepository + ?Sized> {
    pub revoked: &'a T,
    pub tokens: &'a TokenService,
}

impl<'a, T: RevokedTokenRepository + ?Sized> Logout<'a, T> {
    pub async fn execute(&self, refresh: &str) -> AppResult<()> {
        let claims = self.tokens.decode(refresh, TokenKind::Refresh)?;
        let jti = claims.jti_uuid()?;
        self.revoked.revoke(jti, claims.expires_at()).await?;
        tracing::info!(user_id = %claims.sub, jti = %jti, "refresh_token_revoked");

        match self.revoked.purge_expired(Utc::now()).await {
            Ok(0) => {}
            Ok(n) => tracing::debug!(purged = n, "expired_revocations_purged"),
            Err(err) => tracing::warn!(error = ?err, "failed to purge expired revocations"),
        }
        Ok(())
    }
}
