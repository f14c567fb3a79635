use async_trait::async_trait;
use uuid::Uuid;

/// Blob storage for report PDFs. Paths are relative to the store root.
#[async_trait]
pub trait ReportFileStore: Send + Sync {
    async fn save(&self, report_id: Uuid, bytes: &[u8]) -> anyhow::Result<String>;
    async fn read(&self, path: &str) -> anyhow::Result<Vec<u8>>;
    async fn delete(&self, path: &str) -> anyhow::Result<()>;
}
