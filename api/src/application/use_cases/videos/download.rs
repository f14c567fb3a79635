use uuid::Uuid;

use crate::application::access::Actor;
use crate::application::errors::{AppError, AppResult};
use crate::application::ports::video_repository::VideoRepository;
use crate::application::ports::video_store::VideoFileStore;
use crate::domain::videos::video::Video;

pub struct DownloadVideo<'a, R, S>
where
    R: VideoRepository + ?Sized,
    S: VideoFileStore + ?Sized,
{
    pub repo: &'a R,
    pub store: &'a S,
}

impl<'a, R, S> DownloadVideo<'a, R, S>
where
    R: VideoRepository + ?Sized,
    S: VideoFileStore + ?Sized,
{
    pub async fn execute(&self, actor: &Actor, id: Uuid) -> AppResult<(Video, Vec<u8>)> {
        let video = self
            .repo
            .get(actor.scope(), id)
            .await?
            .ok_or(AppError::NotFound)?;
        let bytes = self.store.read_video(&video.file_path).await.map_err(|err| {
            tracing::warn!(video_id = %video.id, path = %video.file_path, error = ?err, "video file unreadable");
            AppError::NotFound
        })?;
        Ok((video, bytes))
    }
}
