use uuid::Uuid;

use super::{ensure_admin, ensure_unique, validate_fields};
use crate::application::access::Actor;
use crate::application::errors::{AppError, AppResult};
use crate::application::ports::carehome_repository::CareHomeRepository;
use crate::application::ports::user_repository::UserRepository;
use crate::domain::carehomes::carehome::CareHome;
use crate::domain::users::permission::{Action, Permission, Resource};

pub struct UpdateCareHome<'a, C, U>
where
    C: CareHomeRepository + ?Sized,
    U: UserRepository + ?Sized,
{
    pub carehomes: &'a C,
    pub users: &'a U,
}

/// Absent fields are left unchanged. `admin_id: Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct CareHomePatch {
    pub name: Option<String>,
    pub address: Option<String>,
    pub admin_id: Option<Option<Uuid>>,
}

impl<'a, C, U> UpdateCareHome<'a, C, U>
where
    C: CareHomeRepository + ?Sized,
    U: UserRepository + ?Sized,
{
    pub async fn execute(&self, actor: &Actor, id: Uuid, patch: CareHomePatch) -> AppResult<CareHome> {
        actor.require(Permission::new(Action::Change, Resource::CareHome))?;
        let mut home = self
            .carehomes
            .get(actor.scope(), id)
            .await?
            .ok_or(AppError::NotFound)?;

        if let Some(name) = patch.name {
            home.name = name.trim().to_string();
        }
        if let Some(address) = patch.address {
            home.address = address.trim().to_string();
        }
        validate_fields(&home.name, &home.address)?;
        ensure_unique(self.carehomes, &home.name, &home.address, Some(home.id)).await?;
        if let Some(admin_id) = patch.admin_id {
            ensure_admin(self.users, admin_id).await?;
            home.admin_id = admin_id;
        }

        self.carehomes
            .update(&home)
            .await?
            .ok_or(AppError::NotFound)
    }
}
