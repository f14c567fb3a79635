use uuid::Uuid;

use crate::application::access::Actor;
use crate::application::errors::{AppError, AppResult};
use crate::application::ports::video_repository::VideoRepository;
use crate::domain::videos::video::Video;

pub struct GetVideo<'a, R: VideoRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: VideoRepository + ?Sized> GetVideo<'a, R> {
    pub async fn execute(&self, actor: &Actor, id: Uuid) -> AppResult<Video> {
        self.repo
            .get(actor.scope(), id)
            .await?
            .ok_or(AppError::NotFound)
    }
}
