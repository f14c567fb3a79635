use uuid::Uuid;

use crate::application::access::Actor;
use crate::application::errors::{AppError, AppResult};
use crate::application::ports::carehome_manager_repository::CareHomeManagerRepository;
use crate::application::ports::carehome_repository::CareHomeRepository;
use crate::application::ports::user_repository::UserRepository;
use crate::domain::carehomes::carehome::{MAX_MANAGERS_PER_CAREHOME, ManagerAssignment};
use crate::domain::users::permission::{Action, Permission, Resource};

pub struct AssignManager<'a, A, C, U>
where
    A: CareHomeManagerRepository + ?Sized,
    C: CareHomeRepository + ?Sized,
    U: UserRepository + ?Sized,
{
    pub assignments: &'a A,
    pub carehomes: &'a C,
    pub users: &'a U,
}

impl<'a, A, C, U> AssignManager<'a, A, C, U>
where
    A: CareHomeManagerRepository + ?Sized,
    C: CareHomeRepository + ?Sized,
    U: UserRepository + ?Sized,
{
    pub async fn execute(
        &self,
        actor: &Actor,
        carehome_id: Uuid,
        manager_id: Uuid,
    ) -> AppResult<ManagerAssignment> {
        actor.require(Permission::new(Action::Add, Resource::CareHomeManager))?;
        let home = self
            .carehomes
            .get(actor.scope(), carehome_id)
            .await?
            .ok_or_else(|| AppError::validation("Invalid carehome."))?;
        match self.users.find_by_id(manager_id).await? {
            Some(user) if user.is_manager() => {}
            Some(_) => return Err(AppError::validation("Selected user is not a manager.")),
            None => return Err(AppError::validation("Invalid manager.")),
        }
        if self.assignments.count_for_carehome(home.id).await? >= MAX_MANAGERS_PER_CAREHOME {
            return Err(AppError::validation(format!(
                "{} already has {MAX_MANAGERS_PER_CAREHOME} managers.",
                home.name
            )));
        }

        let assignment = self.assignments.create(home.id, manager_id).await?;
        tracing::info!(
            carehome_id = %home.id,
            manager_id = %manager_id,
            "carehome_manager_assigned"
        );
        Ok(assignment)
    }
}
