use uuid::Uuid;

use super::{VideoFile, ensure_resident_visible};
use crate::application::access::Actor;
use crate::application::errors::{AppError, AppResult};
use crate::application::ports::resident_repository::ResidentRepository;
use crate::application::ports::video_repository::{NewVideo, VideoRepository};
use crate::application::ports::video_store::VideoFileStore;
use crate::domain::videos::video::{Video, sanitize_filename, validate_title, validate_video};

pub struct CreateVideo<'a, R, P, S>
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

#[derive(Debug, Clone)]
pub struct VideoUpload {
    pub title: String,
    pub description: String,
    pub resident_id: Option<Uuid>,
    pub file: VideoFile,
}

impl<'a, R, P, S> CreateVideo<'a, R, P, S>
where
    R: VideoRepository + ?Sized,
    P: ResidentRepository + ?Sized,
    S: VideoFileStore + ?Sized,
{
    pub async fn execute(&self, actor: &Actor, upload: VideoUpload) -> AppResult<Video> {
        let title = validate_title(&upload.title).map_err(AppError::Validation)?;
        ensure_resident_visible(self.residents, actor, upload.resident_id).await?;
        validate_video(&upload.file.bytes, self.max_bytes).map_err(AppError::Validation)?;

        let id = Uuid::new_v4();
        let filename = sanitize_filename(&upload.file.filename);
        let file_path = self
            .store
            .save_video(id, &filename, &upload.file.bytes)
            .await?;
        let created = self
            .videos
            .create(NewVideo {
                id,
                title,
                description: upload.description,
                file_path: file_path.clone(),
                content_type: upload.file.content_type(),
                file_size: upload.file.bytes.len() as i64,
                resident_id: upload.resident_id,
            })
            .await;
        match created {
            Ok(video) => {
                tracing::info!(video_id = %video.id, resident_id = ?video.resident_id, bytes = video.file_size, "video_uploaded");
                Ok(video)
            }
            Err(err) => {
                if let Err(cleanup) = self.store.delete_video(&file_path).await {
                    tracing::warn!(video_id = %id, error = ?cleanup, "failed to remove orphaned video file");
                }
                Err(err.into())
            }
        }
    }
}
