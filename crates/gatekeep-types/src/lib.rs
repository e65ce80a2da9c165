//! # gatekeep-types: shared vocabulary for the gatekeep engine
//!
//! Types used by both access-control models and by the decision facade:
//!
//! - [`ActorId`]: identifies the principal an authorization check is made for
//! - [`Attribute`] / [`AttributeValue`]: key/value pairs evaluated by ABAC conditions
//! - [`StoreError`]: failure reported by an external role or policy store
//! - [`Clock`]: wall-clock source, swappable for deterministic tests

mod attribute;
mod clock;
mod error;

pub use attribute::{Attribute, AttributeValue};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::StoreError;

use serde::{Deserialize, Serialize};
use std::fmt::Display;

// ============================================================================
// Actor ID
// ============================================================================

/// Identifier of the actor (user, service account) an access check is made for.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(String);

impl ActorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ActorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ActorId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ActorId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<ActorId> for String {
    fn from(id: ActorId) -> Self {
        id.0
    }
}

impl AsRef<str> for ActorId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
