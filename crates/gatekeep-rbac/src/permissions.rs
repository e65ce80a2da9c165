//! Permission entries attached to roles.

use serde::{Deserialize, Serialize};

/// Action token that matches any requested action for a resource.
pub const WILDCARD_ACTION: &str = "*";

/// A `(resource, action)` grant attached to a role.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Permission {
    pub resource: String,
    /// Granted action, or [`WILDCARD_ACTION`] for every action on `resource`.
    pub action: String,
}

impl Permission {
    pub fn new(resource: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            action: action.into(),
        }
    }

    /// Grants every action on `resource`.
    pub fn wildcard(resource: impl Into<String>) -> Self {
        Self::new(resource, WILDCARD_ACTION)
    }

    pub fn is_wildcard(&self) -> bool {
        self.action == WILDCARD_ACTION
    }

    /// Returns whether this entry grants `action` on `resource`.
    ///
    /// Resource matching is exact; only the action side has a wildcard.
    pub fn grants(&self, resource: &str, action: &str) -> bool {
        self.resource == resource && (self.action == action || self.is_wildcard())
    }
}
