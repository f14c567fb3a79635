use uuid::Uuid;

use super::{VideoFile, ensure_resident_visible};
use crate::application::access::Actor;
use crate::application::errors::{AppError, AppResult};
use crate::application::ports::resident_repository::ResidentRepository;
use crate::application::ports::video_repository::VideoRepository;
use crate::application::ports::video_store::VideoFileStore;
use crate::domain::videos::video::{Video, sanitize_filename, validate_title, validate_video};

pub struct UpdateVideo<'a, R, P, S>
where
    R: VideoRepository + ?Sized,
    P: ResidentRepository + ?Sized,
    S: VideoFileStore + ?Sized,
{
    pub videos: &'a R,
    pub residents: &'a P,
    pub store: &'a S,
    pub max_bytes: usize,
}

/// `resident: Some(None)` detaches the video from its resident.
#[derive(Debug, Clone, Default)]
pub struct VideoPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub resident: Option<Option<Uuid>>,
    pub file: Option<VideoFile>,
}

impl<'a, R, P, S> UpdateVideo<'a, R, P, S>
where
    R: VideoRepository + ?Sized,
    P: ResidentRepository + ?Sized,
    S: VideoFileStore + ?Sized,
{
    pub async fn execute(&self, actor: &Actor, id: Uuid, patch: VideoPatch) -> AppResult<Video> {
        let mut video = self
            .videos
            .get(actor.scope(), id)
            .await?
            .ok_or(AppError::NotFound)?;
        if let Some(title) = patch.title {
            video.title = validate_title(&title).map_err(AppError::Validation)?;
        }
        if let Some(description) = patch.description {
            video.description = description;
        }
        if let Some(resident) = patch.resident {
            ensure_resident_visible(self.residents, actor, resident).await?;
            video.resident_id = resident;
        }

        let previous_path = video.file_path.clone();
        if let Some(file) = patch.file {
            validate_video(&file.bytes, self.max_bytes).map_err(AppError::Validation)?;
            let filename = sanitize_filename(&file.filename);
            video.file_path = self.store.save_video(video.id, &filename, &file.bytes).await?;
            video.content_type = file.content_type();
            video.file_size = file.bytes.len() as i64;
        }
        let replaced = video.file_path != previous_path;

        let updated = match self.videos.update(&video).await {
            Ok(updated) => updated.ok_or(AppError::NotFound),
            Err(err) => Err(err.into()),
        };
        let stale = match &updated {
            Ok(_) => previous_path,
            Err(_) => video.file_path.clone(),
        };
        if replaced {
            if let Err(err) = self.store.delete_video(&stale).await {
                tracing::warn!(video_id = %video.id, path = %stale, error = ?err, "failed to remove stale video file");
            }
        }
        updated
    }
}
