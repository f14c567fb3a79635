use async_trait::async_trait;
use uuid::Uuid;

use crate::application::access::Scope;
use crate::domain::carehomes::carehome::{CareHome, ManagerAssignment};
use crate::domain::users::user::User;

#[async_trait]
pub trait CareHomeManagerRepository: Send + Sync {
    async fn count_for_carehome(&self, carehome_id: Uuid) -> anyhow::Result<i64>;
    async fn create(&self, carehome_id: Uuid, manager_id: Uuid) -> anyhow::Result<ManagerAssignment>;
    async fn get(&self, scope: Scope, id: Uuid) -> anyhow::Result<Option<ManagerAssignment>>;
    async fn list(&self, scope: Scope) -> anyhow::Result<Vec<ManagerAssignment>>;
    async fn list_for_carehome(
        &self,
        scope: Scope,
        carehome_id: Uuid,
    ) -> anyhow::Result<Vec<ManagerAssignment>>;
    /// Managers created by `created_by` that have no assignment yet.
    async fn list_unassigned_managers(&self, created_by: Uuid) -> anyhow::Result<Vec<User>>;
    /// Oldest assignment's care home for a manager.
    async fn first_carehome_for_manager(&self, manager_id: Uuid) -> anyhow::Result<Option<CareHome>>;
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
}
