use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::application::access::Scope;
use crate::application::dto::filters::ResidentFilter;
use crate::application::dto::pagination::{Page, PageRequest};
use crate::domain::residents::resident::Resident;

#[derive(Debug, Clone)]
pub struct NewResident {
    pub name: String,
    pub date_of_birth: NaiveDate,
    pub carehome_id: Uuid,
    pub created_by: Option<Uuid>,
}

#[async_trait]
pub trait ResidentRepository: Send + Sync {
    async fn list(
        &self,
        scope: Scope,
        filter: &ResidentFilter,
        page: PageRequest,
    ) -> anyhow::Result<Page<Resident>>;
    async fn get(&self, scope: Scope, id: Uuid) -> anyhow::Result<Option<Resident>>;
    async fn create(&self, resident: NewResident) -> anyhow::Result<Resident>;
    /// Persists name and date_of_birth. The care home never changes.
    async fn update(&self, resident: &Resident) -> anyhow::Result<Option<Resident>>;
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
}
