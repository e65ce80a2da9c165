//! RBAC evaluation against an external role store.

use crate::roles::Role;
use gatekeep_types::{ActorId, StoreError};
use std::sync::Arc;
use tracing::debug;

/// Read-only access to role assignments.
///
/// Implementations must be safe to call concurrently. A failed lookup is
/// reported as a [`StoreError`] and is never treated as "no roles".
pub trait RoleRepository: Send + Sync {
    /// Returns every role currently assigned to `actor`.
    fn find_user_roles(&self, actor: &ActorId) -> Result<Vec<Role>, StoreError>;
}

impl<T: RoleRepository + ?Sized> RoleRepository for Arc<T> {
    fn find_user_roles(&self, actor: &ActorId) -> Result<Vec<Role>, StoreError> {
        (**self).find_user_roles(actor)
    }
}

impl<T: RoleRepository + ?Sized> RoleRepository for &T {
    fn find_user_roles(&self, actor: &ActorId) -> Result<Vec<Role>, StoreError> {
        (**self).find_user_roles(actor)
    }
}

/// Checks actor permissions through their assigned roles.
///
/// Holds no mutable state; share freely across threads.
#[derive(Debug, Clone)]
pub struct RoleEvaluator<R> {
    repository: R,
}

impl<R: RoleRepository> RoleEvaluator<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Returns whether any role assigned to `actor` grants `action` on `resource`.
    ///
    /// An actor without roles is denied. Store failures propagate unchanged.
    pub fn check_user_permission(
        &self,
        actor: &ActorId,
        resource: &str,
        action: &str,
    ) -> Result<bool, StoreError> {
        let roles = self.repository.find_user_roles(actor)?;

        let granting_role = roles.iter().find(|role| role.grants(resource, action));

        debug!(
            actor = %actor,
            resource,
            action,
            roles = roles.len(),
            granted_by = granting_role.map(|role| role.name.as_str()),
            "RBAC evaluated"
        );

        Ok(granting_role.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permissions::Permission;
    use proptest::prelude::*;
    use std::collections::HashMap;

    struct FixedRoles(HashMap<String, Vec<Role>>);

    impl RoleRepository for FixedRoles {
        fn find_user_roles(&self, actor: &ActorId) -> Result<Vec<Role>, StoreError> {
            Ok(self.0.get(actor.as_str()).cloned().unwrap_or_default())
        }
    }

    struct Unreachable;

    impl RoleRepository for Unreachable {
        fn find_user_roles(&self, _actor: &ActorId) -> Result<Vec<Role>, StoreError> {
            Err(StoreError::Unavailable("role database offline".to_string()))
        }
    }

    fn evaluator() -> RoleEvaluator<FixedRoles> {
        let mut assignments = HashMap::new();
        assignments.insert(
            "admin".to_string(),
            vec![Role::new("r-admin", "admin").with_permission(Permission::wildcard("users"))],
        );
        assignments.insert(
            "viewer".to_string(),
            vec![
                Role::new("r-view", "viewer").with_permission(Permission::new("content", "view")),
                Role::new("r-report", "reporter")
                    .with_permission(Permission::new("reports", "export")),
            ],
        );
        RoleEvaluator::new(FixedRoles(assignments))
    }

    #[test]
    fn test_wildcard_role_allows_any_action() {
        let rbac = evaluator();
        let admin = ActorId::from("admin");
        assert!(rbac.check_user_permission(&admin, "users", "delete").unwrap());
        assert!(rbac.check_user_permission(&admin, "users", "create").unwrap());
        assert!(!rbac.check_user_permission(&admin, "content", "view").unwrap());
    }

    #[test]
    fn test_any_role_may_grant() {
        let rbac = evaluator();
        let viewer = ActorId::from("viewer");
        assert!(rbac.check_user_permission(&viewer, "content", "view").unwrap());
        assert!(rbac.check_user_permission(&viewer, "reports", "export").unwrap());
        assert!(!rbac.check_user_permission(&viewer, "content", "edit").unwrap());
    }

    #[test]
    fn test_store_failure_is_an_error_not_a_denial() {
        let rbac = RoleEvaluator::new(Unreachable);
        let result = rbac.check_user_permission(&ActorId::from("admin"), "users", "view");
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
    }

    #[test]
    fn test_shared_repository_through_arc() {
        let shared = Arc::new(evaluator().repository);
        let rbac = RoleEvaluator::new(Arc::clone(&shared));
        assert!(rbac.check_user_permission(&ActorId::from("admin"), "users", "x").unwrap());
    }

    proptest! {
        #[test]
        fn prop_actor_without_roles_is_always_denied(
            actor in "[a-z]{1,10}",
            resource in "[a-z]{1,10}",
            action in "[a-z*]{1,10}",
        ) {
            let rbac = RoleEvaluator::new(FixedRoles(HashMap::new()));
            let allowed = rbac
                .check_user_permission(&ActorId::new(actor), &resource, &action)
                .unwrap();
            prop_assert!(!allowed);
        }
    }
}
