use uuid::Uuid;

use crate::application::access::Actor;
use crate::application::errors::AppResult;
use crate::application::ports::carehome_manager_repository::CareHomeManagerRepository;
use crate::domain::carehomes::carehome::ManagerAssignment;
use crate::domain::users::permission::{Action, Permission, Resource};
use crate::domain::users::user::User;

pub struct ListAssignments<'a, R: CareHomeManagerRepository + ?Sized> {
    pub repo: &'a R,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentQuery {
    All,
    ForCareHome(Uuid),
    /// Managers created by the actor that are not assigned anywhere.
    Unassigned,
}

#[derive(Debug, Clone)]
pub enum AssignmentListing {
    Assignments(Vec<ManagerAssignment>),
    UnassignedManagers(Vec<User>),
}

impl<'a, R: CareHomeManagerRepository + ?Sized> ListAssignments<'a, R> {
    pub async fn execute(&self, actor: &Actor, query: AssignmentQuery) -> AppResult<AssignmentListing> {
        actor.require(Permission::new(Action::View, Resource::CareHomeManager))?;
        let scope = actor.scope();
        Ok(match query {
            AssignmentQuery::All => AssignmentListing::Assignments(self.repo.list(scope).await?),
            AssignmentQuery::ForCareHome(id) => {
                AssignmentListing::Assignments(self.repo.list_for_carehome(scope, id).await?)
            }
            AssignmentQuery::Unassigned => AssignmentListing::UnassignedManagers(
                self.repo.list_unassigned_managers(actor.user_id).await?,
            ),
        })
    }
}
