use uuid::Uuid;

use crate::application::errors::{AppError, AppResult};
use crate::application::ports::user_repository::UserRepository;
use crate::domain::users::permission::Permission;
use crate::domain::users::role::Role;

/// The authenticated user behind a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: Role,
}

/// Which care homes an actor can see. Every care-home-bound record
/// (residents, feedback, reports, sessions) is filtered through this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    All,
    /// Care homes whose `admin_id` is the given user.
    Admin(Uuid),
    /// Care homes the given user is assigned to as a manager.
    Manager(Uuid),
}

impl Scope {
    pub fn kind(&self) -> &'static str {
        match self {
            Scope::All => "all",
            Scope::Admin(_) => "admin",
            Scope::Manager(_) => "manager",
        }
    }

    pub fn subject(&self) -> Option<Uuid> {
        match self {
            Scope::All => None,
            Scope::Admin(id) | Scope::Manager(id) => Some(*id),
        }
    }
}

impl Actor {
    pub fn scope(&self) -> Scope {
        match self.role {
            Role::SuperAdmin => Scope::All,
            Role::Admin => Scope::Admin(self.user_id),
            Role::Manager => Scope::Manager(self.user_id),
        }
    }

    pub fn require(&self, perm: Permission) -> AppResult<()> {
        if self.role.has_perm(perm) {
            Ok(())
        } else {
            Err(AppError::forbidden(
                "You do not have permission to perform this action.",
            ))
        }
    }
}

/// Loads the actor for a verified token subject. Deleted or deactivated
/// accounts are rejected.
pub async fn resolve_actor<R>(repo: &R, user_id: Uuid) -> AppResult<Actor>
where
    R: UserRepository + ?Sized,
{
    let user = repo
        .find_by_id(user_id)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(|| AppError::unauthorized("User not found or inactive."))?;
    Ok(Actor {
        user_id: user.id,
        role: user.role,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::users::permission::{Action, Resource};

    #[test]
    fn scope_follows_role() {
        let id = Uuid::new_v4();
        let actor = |role| Actor { user_id: id, role };
        assert_eq!(actor(Role::SuperAdmin).scope(), Scope::All);
        assert_eq!(actor(Role::Admin).scope(), Scope::Admin(id));
        assert_eq!(actor(Role::Manager).scope(), Scope::Manager(id));
        assert_eq!(Scope::Manager(id).kind(), "manager");
        assert_eq!(Scope::All.subject(), None);
    }

    #[test]
    fn require_rejects_missing_grants() {
        let manager = Actor {
            user_id: Uuid::new_v4(),
            role: Role::Manager,
        };
        assert!(manager.require(Permission::new(Action::View, Resource::Resident)).is_ok());
        assert!(matches!(
            manager.require(Permission::new(Action::Add, Resource::CareHome)),
            Err(AppError::Forbidden(_))
        ));
    }
}
