use async_trait::async_trait;
use uuid::Uuid;

use crate::application::access::Scope;
use crate::application::dto::filters::FeedbackFilter;
use crate::application::dto::pagination::{Page, PageRequest};
use crate::domain::feedbacks::feedback::Feedback;

#[async_trait]
pub trait FeedbackRepository: Send + Sync {
    async fn list(
        &self,
        scope: Scope,
        filter: &FeedbackFilter,
        page: PageRequest,
    ) -> anyhow::Result<Page<Feedback>>;
    async fn get(&self, scope: Scope, id: Uuid) -> anyhow::Result<Option<Feedback>>;
    /// Inserts the record; `id` and `created_at` are assigned by the store.
    async fn create(&self, feedback: &Feedback) -> anyhow::Result<Feedback>;
    async fn update(&self, feedback: &Feedback) -> anyhow::Result<Option<Feedback>>;
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
}
