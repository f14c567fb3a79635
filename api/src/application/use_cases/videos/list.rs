use crate::application::access::Actor;
use crate::application::dto::filters::VideoFilter;
use crate::application::dto::pagination::{Page, PageRequest};
use crate::application::errors::AppResult;
use crate::application::ports::video_repository::VideoRepository;
use crate::domain::videos::video::Video;

pub struct ListVideos<'a, R: VideoRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: VideoRepository + ?Sized> ListVideos<'a, R> {
    pub async fn execute(
        &self,
        actor: &Actor,
        filter: &VideoFilter,
        page: PageRequest,
    ) -> AppResult<Page<Video>> {
        Ok(self.repo.list(actor.scope(), filter, page).await?)
    }
}
