//! Fixture documents that hydrate the in-memory repositories.
//!
//! A fixture lists role assignments and policies in TOML or JSON:
//!
//! ```toml
//! [[assignments]]
//! actor = "alice"
//!
//! [[assignments.roles]]
//! id = "r-admin"
//! name = "admin"
//! permissions = [{ resource = "users", action = "*" }]
//!
//! [[policies]]
//! id = "p-hours"
//! name = "deny-after-hours"
//! effect = "DENY"
//!
//! [[policies.rules]]
//! condition = "OR"
//! conditions = [
//!     { attribute = "time.hour", operator = "<", value = 8 },
//!     { attribute = "time.hour", operator = ">", value = 18 },
//! ]
//! ```

use crate::memory::{InMemoryPolicyRepository, InMemoryRoleRepository};
use gatekeep_abac::Policy;
use gatekeep_rbac::Role;
use gatekeep_types::ActorId;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error type for fixture loading.
#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("Failed to read fixture at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse TOML fixture: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Failed to parse JSON fixture: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported fixture format for {0} (expected .toml or .json)")]
    UnsupportedFormat(PathBuf),
}

/// Roles assigned to one actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub actor: ActorId,
    #[serde(default)]
    pub roles: Vec<Role>,
}

/// A complete role/policy data set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Fixture {
    pub assignments: Vec<Assignment>,
    pub policies: Vec<Policy>,
}

impl Fixture {
    pub fn from_toml_str(input: &str) -> Result<Self, FixtureError> {
        Ok(toml::from_str(input)?)
    }

    pub fn from_json_str(input: &str) -> Result<Self, FixtureError> {
        Ok(serde_json::from_str(input)?)
    }

    /// Loads a fixture, picking the format from the file extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FixtureError> {
        let path = path.as_ref();
        let read = || {
            fs::read_to_string(path).map_err(|source| FixtureError::Read {
                path: path.to_path_buf(),
                source,
            })
        };

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&read()?),
            Some("json") => Self::from_json_str(&read()?),
            _ => Err(FixtureError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    /// Unrecognized operator, combinator and effect tokens, per policy id.
    pub fn unknown_tokens(&self) -> Vec<(String, String)> {
        self.policies
            .iter()
            .flat_map(|policy| {
                policy
                    .unknown_tokens()
                    .into_iter()
                    .map(|token| (policy.id.clone(), token))
            })
            .collect()
    }

    pub fn role_count(&self) -> usize {
        self.assignments.iter().map(|a| a.roles.len()).sum()
    }

    /// Moves the data into fresh in-memory repositories.
    pub fn into_repositories(self) -> (InMemoryRoleRepository, InMemoryPolicyRepository) {
        let roles = InMemoryRoleRepository::new();
        for assignment in self.assignments {
            for role in assignment.roles {
                roles.assign(assignment.actor.clone(), role);
            }
        }
        (roles, InMemoryPolicyRepository::new(self.policies))
    }
}
