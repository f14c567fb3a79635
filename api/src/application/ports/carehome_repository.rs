use async_trait::async_trait;
use uuid::Uuid;

use crate::application::access::Scope;
use crate::domain::carehomes::carehome::CareHome;

#[derive(Debug, Clone)]
pub struct NewCareHome {
    pub name: String,
    pub code: String,
    pub address: String,
    pub admin_id: Option<Uuid>,
}

#[async_trait]
pub trait CareHomeRepository: Send + Sync {
    async fn list(&self, scope: Scope) -> anyhow::Result<Vec<CareHome>>;
    async fn get(&self, scope: Scope, id: Uuid) -> anyhow::Result<Option<CareHome>>;
    async fn name_and_address_taken(
        &self,
        name: &str,
        address: &str,
        exclude: Option<Uuid>,
    ) -> anyhow::Result<bool>;
    async fn create(&self, home: NewCareHome) -> anyhow::Result<CareHome>;
    /// Persists name, address and admin_id.
    async fn update(&self, home: &CareHome) -> anyhow::Result<Option<CareHome>>;
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
    /// Oldest care home administered by `admin_id`.
    async fn first_for_admin(&self, admin_id: Uuid) -> anyhow::Result<Option<CareHome>>;
}
