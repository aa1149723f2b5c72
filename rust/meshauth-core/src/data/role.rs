use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// An authorization label assigned to an administrator, qualified by the
/// resource (or class of resources) it applies to. The label and scope are
/// opaque here; what it means for one role to cover another is decided by a
/// [RoleSemantics] supplied by the deploying system.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScopedRole {
    pub role: String,
    pub scope: String,
}

impl ScopedRole {
    pub fn new(role: &str, scope: &str) -> Self {
        ScopedRole {
            role: role.to_owned(),
            scope: scope.to_owned(),
        }
    }
}

impl Display for ScopedRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.role, self.scope)
    }
}

/// The host-defined comparison rule for [ScopedRole]s
pub trait RoleSemantics: Send + Sync {
    /// True if holding `held` is sufficient for an operation that requires
    /// `required`
    fn satisfies(&self, held: &ScopedRole, required: &ScopedRole) -> bool;
}

/// Roles only satisfy an identical role on an identical scope
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactRoleSemantics;

impl RoleSemantics for ExactRoleSemantics {
    fn satisfies(&self, held: &ScopedRole, required: &ScopedRole) -> bool {
        held == required
    }
}

#[cfg(test)]
mod tests {
    use super::{ExactRoleSemantics, RoleSemantics, ScopedRole};

    struct WildcardScope;

    impl RoleSemantics for WildcardScope {
        fn satisfies(&self, held: &ScopedRole, required: &ScopedRole) -> bool {
            held.role == required.role && (held.scope == "*" || held.scope == required.scope)
        }
    }

    #[test]
    fn it_matches_roles_exactly_by_default() {
        let held = ScopedRole::new("auditor", "wallets");

        assert!(ExactRoleSemantics.satisfies(&held, &ScopedRole::new("auditor", "wallets")));
        assert!(!ExactRoleSemantics.satisfies(&held, &ScopedRole::new("auditor", "tickets")));
        assert!(!ExactRoleSemantics.satisfies(&held, &ScopedRole::new("operator", "wallets")));
    }

    #[test]
    fn it_defers_containment_to_the_host_semantics() {
        let held = ScopedRole::new("auditor", "*");

        assert!(WildcardScope.satisfies(&held, &ScopedRole::new("auditor", "tickets")));
        assert!(!ExactRoleSemantics.satisfies(&held, &ScopedRole::new("auditor", "tickets")));
    }
}
