use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Blacklist of refresh tokens, keyed by `jti`.
#[async_trait]
pub trait RevokedTokenRepository: Send + Sync {
    async fn revoke(&self, jti: Uuid, expires_at: DateTime<Utc>) -> anyhow::Result<()>;
    async fn is_revoked(&self, jti: Uuid) -> anyhow::Result<bool>;
    async fn purge_expired(&self, now: DateTime<Utc>) -> anyhow::Result<u64>;
}
