use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::application::access::Scope;
use crate::application::dto::filters::SessionFilter;
use crate::application::dto::pagination::{Page, PageRequest};
use crate::domain::sessions::session::{SessionStatus, TherapySession};

#[derive(Debug, Clone)]
pub struct NewSession {
    pub resident_id: Uuid,
    pub scheduled_date: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub status: SessionStatus,
    pub notes: Option<String>,
    pub feedback_id: Option<Uuid>,
}

#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// `now` anchors the time-relative status categories.
    async fn list(
        &self,
        scope: Scope,
        filter: &SessionFilter,
        now: DateTime<Utc>,
        page: PageRequest,
    ) -> anyhow::Result<Page<TherapySession>>;
    async fn get(&self, scope: Scope, id: Uuid) -> anyhow::Result<Option<TherapySession>>;
    async fn create(&self, session: NewSession) -> anyhow::Result<TherapySession>;
    /// Persists every mutable column, including resident_id.
    async fn update(&self, session: &TherapySession) -> anyhow::Result<Option<TherapySession>>;
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
    /// Whether another session already links this feedback.
    async fn feedback_linked_elsewhere(
        &self,
        feedback_id: Uuid,
        exclude_session: Option<Uuid>,
    ) -> anyhow::Result<bool>;
}
