use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::application::access::Actor;
use crate::application::errors::{AppError, AppResult};
use crate::application::ports::resident_repository::ResidentRepository;
use crate::domain::residents::resident::{Resident, validate_date_of_birth, validate_name};
use crate::domain::users::permission::{Action, Permission, Resource};

pub struct UpdateResident<'a, R: ResidentRepository + ?Sized> {
    pub repo: &'a R,
}

#[derive(Debug, Clone, Default)]
pub struct ResidentPatch {
    pub name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

impl<'a, R: ResidentRepository + ?Sized> UpdateResident<'a, R> {
    pub async fn execute(&self, actor: &Actor, id: Uuid, patch: ResidentPatch) -> AppResult<Resident> {
        actor.require(Permission::new(Action::Change, Resource::Resident))?;
        let mut resident = self
            .repo
            .get(actor.scope(), id)
            .await?
            .ok_or(AppError::NotFound)?;
        if let Some(name) = patch.name {
            validate_name(&name).map_err(AppError::Validation)?;
            resident.name = name.trim().to_string();
        }
        if let Some(dob) = patch.date_of_birth {
            validate_date_of_birth(dob, Utc::now().date_naive()).map_err(AppError::Validation)?;
            resident.date_of_birth = dob;
        }
        self.repo
            .update(&resident)
            .await?
            .ok_or(AppError::NotFound)
    }
}
