//! Project roles and their capability sets.
//!
//! Role IDs must match the seed data in the `roles` migration. All
//! permission checks go through [`Role::can`]; services never compare raw
//! role IDs.

use serde::Serialize;

/// A project-scoped role, identified by its seeded database ID.
#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin = 1,
    Manager = 2,
    Member = 3,
}

/// A single permission a role may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Edit project settings and delete the project.
    ManageProject,
    /// Add and remove project members, change their roles.
    ManageMembers,
    /// Create, update, and delete sprints.
    ManageSprints,
    /// Create tasks and assign them to members.
    CreateTasks,
    /// View summary and productivity reports.
    ViewReports,
}

/// Capability sets per role. Admin is a superset of manager, manager of
/// member.
const ADMIN_CAPABILITIES: &[Capability] = &[
    Capability::ManageProject,
    Capability::ManageMembers,
    Capability::ManageSprints,
    Capability::CreateTasks,
    Capability::ViewReports,
];

const MANAGER_CAPABILITIES: &[Capability] = &[
    Capability::ManageSprints,
    Capability::CreateTasks,
    Capability::ViewReports,
];

const MEMBER_CAPABILITIES: &[Capability] = &[Capability::CreateTasks];

impl Role {
    /// Return the database role ID.
    pub fn id(self) -> i16 {
        self as i16
    }

    /// Resolve a database role ID back to the enum.
    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            1 => Some(Self::Admin),
            2 => Some(Self::Manager),
            3 => Some(Self::Member),
            _ => None,
        }
    }

    /// Lookup-table name for this role.
    pub fn name(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::Member => "member",
        }
    }

    /// The full capability set granted by this role.
    pub fn capabilities(self) -> &'static [Capability] {
        match self {
            Self::Admin => ADMIN_CAPABILITIES,
            Self::Manager => MANAGER_CAPABILITIES,
            Self::Member => MEMBER_CAPABILITIES,
        }
    }

    /// Whether this role holds the given capability.
    pub fn can(self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_ids_match_seed_data() {
        assert_eq!(Role::Admin.id(), 1);
        assert_eq!(Role::Manager.id(), 2);
        assert_eq!(Role::Member.id(), 3);
    }

    #[test]
    fn role_names_match_seed_data() {
        assert_eq!(Role::Admin.name(), "admin");
        assert_eq!(Role::Manager.name(), "manager");
        assert_eq!(Role::Member.name(), "member");
    }

    #[test]
    fn from_id_round_trips() {
        for role in [Role::Admin, Role::Manager, Role::Member] {
            assert_eq!(Role::from_id(role.id()), Some(role));
        }
        assert_eq!(Role::from_id(0), None);
        assert_eq!(Role::from_id(4), None);
    }

    #[test]
    fn manager_can_manage_sprints_but_not_members() {
        assert!(Role::Manager.can(Capability::ManageSprints));
        assert!(!Role::Manager.can(Capability::ManageMembers));
    }

    #[test]
    fn member_can_only_create_tasks() {
        assert!(Role::Member.can(Capability::CreateTasks));
        assert!(!Role::Member.can(Capability::ManageSprints));
        assert!(!Role::Member.can(Capability::ViewReports));
    }

    #[test]
    fn admin_holds_every_capability() {
        for cap in [
            Capability::ManageProject,
            Capability::ManageMembers,
            Capability::ManageSprints,
            Capability::CreateTasks,
            Capability::ViewReports,
        ] {
            assert!(Role::Admin.can(cap));
        }
    }
}
