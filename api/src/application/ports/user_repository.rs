use async_trait::async_trait;
use uuid::Uuid;

use crate::application::dto::filters::UserFilter;
use crate::domain::users::role::Role;
use crate::domain::users::user::User;

#[derive(Debug, Clone)]
pub struct NewUserRecord {
    pub email: String,
    pub username: String,
    pub name: String,
    pub password_hash: String,
    pub role: Role,
    pub avatar: Option<String>,
    pub created_by: Option<Uuid>,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create_user(&self, record: NewUserRecord) -> anyhow::Result<User>;
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>>;
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    /// The stored password hash for an email, alongside the user.
    async fn find_credentials(&self, email: &str) -> anyhow::Result<Option<(User, String)>>;
    async fn username_exists(&self, username: &str) -> anyhow::Result<bool>;
    async fn list(&self, filter: &UserFilter) -> anyhow::Result<Vec<User>>;
    /// Persists name, email, username, avatar and is_active.
    async fn update_profile(&self, user: &User) -> anyhow::Result<Option<User>>;
    async fn delete_user(&self, id: Uuid) -> anyhow::Result<bool>;
}
