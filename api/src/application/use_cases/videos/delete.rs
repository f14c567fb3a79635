use uuid::Uuid;

use crate::application::access::Actor;
use crate::application::errors::{AppError, AppResult};
use crate::application::ports::video_repository::VideoRepository;
use crate::application::ports::video_store::VideoFileStore;

pub struct DeleteVideo<'a, R, S>
where
    R: VideoRepository + ?Sized,
    S: VideoFileStore + ?Sized,
{
    pub videos: &'a R,
    pub store: &'a S,
}

impl<'a, R, S> DeleteVideo<'a, R, S>
where
    R: VideoRepository + ?Sized,
    S: VideoFileStore + ?Sized,
{
    /// Removing the stored file is best effort.
    pub async fn execute(&self, actor: &Actor, id: Uuid) -> AppResult<()> {
        let video = self
            .videos
            .get(actor.scope(), id)
            .await?
            .ok_or(AppError::NotFound)?;
        if !self.videos.delete(video.id).await? {
            return Err(AppError::NotFound);
        }
        if let Err(err) = self.store.delete_video(&video.file_path).await {
            tracing::warn!(video_id = %video.id, path = %video.file_path, error = ?err, "failed to remove video file");
        }
        tracing::info!(video_id = %video.id, "video_deleted");
        Ok(())
    }
}
