use async_trait::async_trait;
use uuid::Uuid;

use crate::application::access::Scope;
use crate::application::dto::filters::VideoFilter;
use crate::application::dto::pagination::{Page, PageRequest};
use crate::domain::videos::video::Video;

#[derive(Debug, Clone)]
pub struct NewVideo {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub file_path: String,
    pub content_type: String,
    pub file_size: i64,
    pub resident_id: Option<Uuid>,
}

/// Videos without a resident are only visible under `Scope::All`.
#[async_trait]
pub trait VideoRepository: Send + Sync {
    async fn list(
        &self,
        scope: Scope,
        filter: &VideoFilter,
        page: PageRequest,
    ) -> anyhow::Result<Page<Video>>;
    async fn get(&self, scope: Scope, id: Uuid) -> anyhow::Result<Option<Video>>;
    async fn create(&self, video: NewVideo) -> anyhow::Result<Video>;
    /// Persists every mutable column and bumps `updated_at`.
    async fn update(&self, video: &Video) -> anyhow::Result<Option<Video>>;
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
}
