use async_trait::async_trait;
use uuid::Uuid;

/// Blob storage for uploaded videos. Paths are relative to the store root.
#[async_trait]
pub trait VideoFileStore: Send + Sync {
    /// `filename` must already be sanitized.
    async fn save_video(&self, video_id: Uuid, filename: &str, bytes: &[u8]) -> anyhow::Result<String>;
    async fn read_video(&self, path: &str) -> anyhow::Result<Vec<u8>>;
    async fn delete_video(&self, path: &str) -> anyhow::Result<()>;
}
