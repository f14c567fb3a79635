use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::application::access::{Actor, Scope};
use crate::application::errors::{AppError, AppResult};
use crate::application::ports::carehome_manager_repository::CareHomeManagerRepository;
use crate::application::ports::carehome_repository::CareHomeRepository;
use crate::application::ports::resident_repository::{NewResident, ResidentRepository};
use crate::domain::residents::resident::{Resident, validate_date_of_birth, validate_name};
use crate::domain::users::permission::{Action, Permission, Resource};

const NO_CAREHOME: &str =
    "Failed to create resident. Creating user does not have a care home assigned.";

pub struct CreateResident<'a, R, C, A>
where
    R: ResidentRepository + ?Sized,
    C: CareHomeRepository + ?Sized,
    A: CareHomeManagerRepository + ?Sized,
{
    pub residents: &'a R,
    pub carehomes: &'a C,
    pub assignments: &'a A,
}

#[derive(Debug, Clone)]
pub struct ResidentInput {
    pub name: String,
    pub date_of_birth: NaiveDate,
    /// Honoured only for SuperAdmins, who have no care home of their own.
    pub carehome_id: Option<Uuid>,
}

impl<'a, R, C, A> CreateResident<'a, R, C, A>
where
    R: ResidentRepository + ?Sized,
    C: CareHomeRepository + ?Sized,
    A: CareHomeManagerRepository + ?Sized,
{
    pub async fn execute(&self, actor: &Actor, input: ResidentInput) -> AppResult<Resident> {
        actor.require(Permission::new(Action::Add, Resource::Resident))?;
        validate_name(&input.name).map_err(AppError::Validation)?;
        validate_date_of_birth(input.date_of_birth, Utc::now().date_naive())
            .map_err(AppError::Validation)?;

        let carehome = match actor.scope() {
            Scope::Admin(id) => self.carehomes.first_for_admin(id).await?,
            Scope::Manager(id) => self.assignments.first_carehome_for_manager(id).await?,
            Scope::All => match input.carehome_id {
                Some(id) => self.carehomes.get(Scope::All, id).await?,
                None => None,
            },
        };
        let carehome = carehome.ok_or_else(|| AppError::validation(NO_CAREHOME))?;

        let resident = self
            .residents
            .create(NewResident {
                name: input.name.trim().to_string(),
                date_of_birth: input.date_of_birth,
                carehome_id: carehome.id,
                created_by: Some(actor.user_id),
            })
            .await?;
        tracing::info!(
            resident_id = %resident.id,
            carehome_id = %carehome.id,
            "resident_created"
        );
        Ok(resident)
    }
}
