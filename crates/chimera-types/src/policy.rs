//! Policy value types: roles, bindings, and explicit denies.
//!
//! This module owns the data shape only. Evaluating `authorize()` against a
//! `Policy` is a pure function that lives in the `chimera-policy` crate, kept
//! separate so the gate implementation can evolve (composition, caching)
//! without touching the entity itself.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub type RoleName = String;
pub type SubjectId = String;

/// An action a subject may be authorized to take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Permission {
    Deploy,
    Rollback,
    HealRestart,
    HealRebuild,
    View,
}

/// Roles, subject-to-role bindings, and explicit per-subject denies.
///
/// Denies always win over any grant, regardless of which role supplied it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Policy {
    pub roles: BTreeMap<RoleName, BTreeSet<Permission>>,
    pub bindings: BTreeMap<SubjectId, BTreeSet<RoleName>>,
    pub denies: BTreeSet<(SubjectId, Permission)>,
}

impl Policy {
    /// The built-in role set: `viewer`, `operator`, `admin`.
    pub fn with_builtin_roles() -> Self {
        let mut roles = BTreeMap::new();
        roles.insert("viewer".to_string(), BTreeSet::from([Permission::View]));
        roles.insert(
            "operator".to_string(),
            BTreeSet::from([
                Permission::View,
                Permission::Deploy,
                Permission::HealRestart,
            ]),
        );
        roles.insert(
            "admin".to_string(),
            BTreeSet::from([
                Permission::View,
                Permission::Deploy,
                Permission::Rollback,
                Permission::HealRestart,
                Permission::HealRebuild,
            ]),
        );
        Self {
            roles,
            bindings: BTreeMap::new(),
            denies: BTreeSet::new(),
        }
    }

    pub fn bind(&self, subject: impl Into<SubjectId>, role: impl Into<RoleName>) -> Self {
        let mut next = self.clone();
        next.bindings
            .entry(subject.into())
            .or_default()
            .insert(role.into());
        next
    }

    pub fn deny(&self, subject: impl Into<SubjectId>, permission: Permission) -> Self {
        let mut next = self.clone();
        next.denies.insert((subject.into(), permission));
        next
    }

    /// Permissions granted to `subject` via its bound roles, before denies
    /// are applied.
    pub fn granted_permissions(&self, subject: &str) -> BTreeSet<Permission> {
        let mut granted = BTreeSet::new();
        if let Some(roles) = self.bindings.get(subject) {
            for role in roles {
                if let Some(perms) = self.roles.get(role) {
                    granted.extend(perms.iter().copied());
                }
            }
        }
        granted
    }

    pub fn is_denied(&self, subject: &str, permission: Permission) -> bool {
        self.denies.contains(&(subject.to_string(), permission))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_admin_has_all_permissions() {
        let policy = Policy::with_builtin_roles().bind("root@ops", "admin");
        let granted = policy.granted_permissions("root@ops");
        assert!(granted.contains(&Permission::Rollback));
        assert!(granted.contains(&Permission::HealRebuild));
    }

    #[test]
    fn deny_is_recorded_independent_of_grants() {
        let policy = Policy::with_builtin_roles()
            .bind("alice", "admin")
            .deny("alice", Permission::Rollback);
        assert!(policy.granted_permissions("alice").contains(&Permission::Rollback));
        assert!(policy.is_denied("alice", Permission::Rollback));
    }

    #[test]
    fn unbound_subject_has_no_permissions() {
        let policy = Policy::with_builtin_roles();
        assert!(policy.granted_permissions("nobody").is_empty());
    }
}
