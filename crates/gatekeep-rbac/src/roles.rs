//! Role definitions for RBAC.
//!
//! Roles are owned by an external role store and are read-only inputs to the
//! engine. A role grants the union of its permission entries.

use crate::permissions::Permission;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named bundle of permissions assigned to actors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub permissions: Vec<Permission>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Role {
    /// Creates a role with no permissions.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            permissions: Vec::new(),
            description: String::new(),
            created_at: None,
            updated_at: None,
        }
    }

    /// Adds a permission entry (builder pattern).
    pub fn with_permission(mut self, permission: Permission) -> Self {
        self.permissions.push(permission);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Returns whether any permission entry grants `action` on `resource`.
    pub fn grants(&self, resource: &str, action: &str) -> bool {
        self.permissions
            .iter()
            .any(|permission| permission.grants(resource, action))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content_editor() -> Role {
        Role::new("r-1", "content-editor")
            .with_permission(Permission::new("content", "view"))
            .with_permission(Permission::new("content", "edit"))
            .with_permission(Permission::new("complaints", "create"))
    }

    #[test]
    fn test_role_without_permissions_grants_nothing() {
        let role = Role::new("r-0", "empty");
        assert!(!role.grants("content", "view"));
    }

    #[test]
    fn test_role_grants_union_of_entries() {
        let role = content_editor();
        assert!(role.grants("content", "view"));
        assert!(role.grants("content", "edit"));
        assert!(role.grants("complaints", "create"));
        assert!(!role.grants("complaints", "delete"));
    }

    #[test]
    fn test_role_deserializes_with_defaults() {
        let json = r#"{
            "id": "r-admin",
            "name": "admin",
            "permissions": [{"resource": "users", "action": "*"}],
            "created_at": "2024-03-01T12:00:00Z"
        }"#;
        let role: Role = serde_json::from_str(json).unwrap();
        assert_eq!(role.name, "admin");
        assert!(role.description.is_empty());
        assert!(role.created_at.is_some());
        assert!(role.updated_at.is_none());
        assert!(role.grants("users", "delete"));
    }
}
