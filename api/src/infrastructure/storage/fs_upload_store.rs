use std::path::{Component, Path, PathBuf};

use uuid::Uuid;

use crate::application::ports::report_store::ReportFileStore;
use crate::application::ports::video_store::VideoFileStore;

const REPORTS_DIR: &str = "reports";
const VIDEOS_DIR: &str = "videos";

/// Uploaded files under one root: `reports/<id>.pdf` and
/// `videos/<id>/<filename>`.
pub struct FsUploadStore {
    pub uploads_root: PathBuf,
}

impl FsUploadStore {
    pub fn new(uploads_root: impl Into<PathBuf>) -> Self {
        Self {
            uploads_root: uploads_root.into(),
        }
    }

    fn absolute_from_relative(&self, rel: &str) -> anyhow::Result<PathBuf> {
        let rel_path = Path::new(rel);
        let clean = rel_path
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        anyhow::ensure!(clean && !rel.is_empty(), "invalid upload path: {rel}");
        Ok(self.uploads_root.join(rel_path))
    }

    async fn write(&self, rel: String, bytes: &[u8]) -> anyhow::Result<String> {
        let abs = self.absolute_from_relative(&rel)?;
        if let Some(parent) = abs.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&abs, bytes).await?;
        Ok(rel)
    }

    async fn read_file(&self, rel: &str) -> anyhow::Result<Vec<u8>> {
        let abs = self.absolute_from_relative(rel)?;
        Ok(tokio::fs::read(abs).await?)
    }

    async fn remove_file(&self, rel: &str) -> anyhow::Result<()> {
        let abs = self.absolute_from_relative(rel)?;
        match tokio::fs::remove_file(&abs).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl ReportFileStore for FsUploadStore {
    async fn save(&self, report_id: Uuid, bytes: &[u8]) -> anyhow::Result<String> {
        self.write(format!("{REPORTS_DIR}/{report_id}.pdf"), bytes).await
    }

    async fn read(&self, path: &str) -> anyhow::Result<Vec<u8>> {
        self.read_file(path).await
    }

    async fn delete(&self, path: &str) -> anyhow::Result<()> {
        self.remove_file(path).await
    }
}

#[async_trait::async_trait]
impl VideoFileStore for FsUploadStore {
    async fn save_video(&self, video_id: Uuid, filename: &str, bytes: &[u8]) -> anyhow::Result<String> {
        self.write(format!("{VIDEOS_DIR}/{video_id}/{filename}"), bytes)
            .await
    }

    async fn read_video(&self, path: &str) -> anyhow::Result<Vec<u8>> {
        self.read_file(path).await
    }

    /// Also drops the per-video directory once it is empty.
    async fn delete_video(&self, path: &str) -> anyhow::Result<()> {
        self.remove_file(path).await?;
        if let Some(parent) = self.absolute_from_relative(path)?.parent() {
            let _ = tokio::fs::remove_dir(parent).await;
        }
        Ok(())
    }
}
