use uuid::Uuid;

use super::{ensure_admin, ensure_unique, validate_fields};
use crate::application::access::Actor;
use crate::application::errors::AppResult;
use crate::application::ports::carehome_repository::{CareHomeRepository, NewCareHome};
use crate::application::ports::user_repository::UserRepository;
use crate::domain::carehomes::carehome::{CareHome, generate_code};
use crate::domain::users::permission::{Action, Permission, Resource};

pub struct CreateCareHome<'a, C, U>
where
    C: CareHomeRepository + ?Sized,
    U: UserRepository + ?Sized,
{
    pub carehomes: &'a C,
    pub users: &'a U,
}

#[derive(Debug, Clone)]
pub struct CareHomeInput {
    pub name: String,
    pub address: String,
    pub admin_id: Option<Uuid>,
}

impl<'a, C, U> CreateCareHome<'a, C, U>
where
    C: CareHomeRepository + ?Sized,
    U: UserRepository + ?Sized,
{
    pub async fn execute(&self, actor: &Actor, input: CareHomeInput) -> AppResult<CareHome> {
        actor.require(Permission::new(Action::Add, Resource::CareHome))?;
        validate_fields(&input.name, &input.address)?;
        let name = input.name.trim().to_string();
        let address = input.address.trim().to_string();
        ensure_unique(self.carehomes, &name, &address, None).await?;
        ensure_admin(self.users, input.admin_id).await?;

        let home = self
            .carehomes
            .create(NewCareHome {
                code: generate_code(&name),
                name,
                address,
                admin_id: input.admin_id,
            })
            .await?;
        tracing::info!(carehome_id = %home.id, code = ?home.code, "carehome_created");
        Ok(home)
    }
}
