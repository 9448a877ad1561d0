//! Pure authorization evaluation over a [`Policy`].
//!
//! `authorize` has exactly two inputs it reads — the subject's granted
//! permissions via its bound roles, and the subject's explicit denies — and
//! one invariant: a deny always wins, regardless of how many roles grant
//! the permission.

use chimera_types::{Permission, Policy};

/// Returns whether `subject_id` may exercise `permission` under `policy`.
pub fn authorize(policy: &Policy, subject_id: &str, permission: Permission) -> bool {
    if policy.is_denied(subject_id, permission) {
        return false;
    }
    policy.granted_permissions(subject_id).contains(&permission)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ungranted_permission_is_denied() {
        let policy = Policy::with_builtin_roles().bind("bob", "viewer");
        assert!(!authorize(&policy, "bob", Permission::Deploy));
    }

    #[test]
    fn granted_permission_is_allowed() {
        let policy = Policy::with_builtin_roles().bind("bob", "operator");
        assert!(authorize(&policy, "bob", Permission::Deploy));
    }

    #[test]
    fn explicit_deny_overrides_role_grant() {
        let policy = Policy::with_builtin_roles()
            .bind("bob", "admin")
            .deny("bob", Permission::Rollback);
        assert!(!authorize(&policy, "bob", Permission::Rollback));
    }

    #[test]
    fn unbound_subject_is_denied_everything() {
        let policy = Policy::with_builtin_roles();
        assert!(!authorize(&policy, "ghost", Permission::View));
    }
}
