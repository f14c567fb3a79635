use super::role::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    User,
    Resident,
    CareHome,
    CareHomeManager,
    Feedback,
    Report,
    Session,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Add,
    Change,
    Delete,
    View,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Permission {
    pub action: Action,
    pub resource: Resource,
}

impl Permission {
    pub const fn new(action: Action, resource: Resource) -> Self {
        Self { action, resource }
    }

    pub fn codename(&self) -> String {
        let action = match self.action {
            Action::Add => "add",
            Action::Change => "change",
            Action::Delete => "delete",
            Action::View => "view",
        };
        let resource = match self.resource {
            Resource::User => "user",
            Resource::Resident => "resident",
            Resource::CareHome => "carehome",
            Resource::CareHomeManager => "carehomemanager",
            Resource::Feedback => "feedback",
            Resource::Report => "report",
            Resource::Session => "session",
        };
        format!("{action}_{resource}")
    }
}

use Action::*;
use Resource::*;

const ADMIN_GRANTS: &[Permission] = &[
    Permission::new(Add, User),
    Permission::new(Change, User),
    Permission::new(View, User),
    Permission::new(Delete, User),
    Permission::new(Add, Resident),
    Permission::new(Change, Resident),
    Permission::new(Delete, Resident),
    Permission::new(View, Resident),
    Permission::new(View, CareHome),
    Permission::new(Add, CareHomeManager),
    Permission::new(Change, CareHomeManager),
    Permission::new(Delete, CareHomeManager),
    Permission::new(View, CareHomeManager),
    Permission::new(Add, Feedback),
    Permission::new(View, Feedback),
    Permission::new(Add, Report),
    Permission::new(View, Report),
    Permission::new(Add, Session),
    Permission::new(Change, Session),
    Permission::new(Delete, Session),
    Permission::new(View, Session),
];

const MANAGER_GRANTS: &[Permission] = &[
    Permission::new(Add, Feedback),
    Permission::new(View, Feedback),
    Permission::new(View, User),
    Permission::new(Change, User),
    Permission::new(Add, Resident),
    Permission::new(Change, Resident),
    Permission::new(Delete, Resident),
    Permission::new(View, Resident),
    Permission::new(View, Report),
    Permission::new(Add, Session),
    Permission::new(Change, Session),
    Permission::new(Delete, Session),
    Permission::new(View, Session),
];

impl Role {
    pub fn has_perm(&self, perm: Permission) -> bool {
        match self {
            Role::SuperAdmin => true,
            Role::Admin => ADMIN_GRANTS.contains(&perm),
            Role::Manager => MANAGER_GRANTS.contains(&perm),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EVERY_RESOURCE: [Resource; 7] = [User, Resident, CareHome, CareHomeManager, Feedback, Report, Session];
    const EVERY_ACTION: [Action; 4] = [Add, Change, Delete, View];

    #[test]
    fn superadmin_holds_every_permission() {
        for resource in EVERY_RESOURCE {
            for action in EVERY_ACTION {
                assert!(Role::SuperAdmin.has_perm(Permission::new(action, resource)));
            }
        }
    }

    #[test]
    fn admin_cannot_manage_carehomes() {
        assert!(Role::Admin.has_perm(Permission::new(View, CareHome)));
        assert!(!Role::Admin.has_perm(Permission::new(Add, CareHome)));
        assert!(!Role::Admin.has_perm(Permission::new(Delete, CareHome)));
        assert!(!Role::Admin.has_perm(Permission::new(Change, Feedback)));
    }

    #[test]
    fn manager_grants() {
        assert!(Role::Manager.has_perm(Permission::new(Add, Resident)));
        assert!(Role::Manager.has_perm(Permission::new(View, Report)));
        assert!(!Role::Manager.has_perm(Permission::new(Add, Report)));
        assert!(!Role::Manager.has_perm(Permission::new(Add, User)));
        assert!(!Role::Manager.has_perm(Permission::new(View, CareHomeManager)));
    }

    #[test]
    fn codenames() {
        assert_eq!(Permission::new(Add, CareHomeManager).codename(), "add_carehomemanager");
        assert_eq!(Permission::new(View, Feedback).codename(), "view_feedback");
    }
}
