//! In-memory repositories.
//!
//! Useful for tests, fixtures and embedding. Nothing in the engine falls back
//! to these; callers construct and pass them explicitly. Each repository
//! counts its lookups so tests can observe whether the cache was used.

use gatekeep_abac::{Policy, PolicyRepository};
use gatekeep_rbac::{Role, RoleRepository};
use gatekeep_types::{ActorId, StoreError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};

/// Role assignments held in a map keyed by actor.
#[derive(Debug, Default)]
pub struct InMemoryRoleRepository {
    assignments: RwLock<HashMap<ActorId, Vec<Role>>>,
    calls: AtomicUsize,
}

impl InMemoryRoleRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns `role` to `actor` (builder pattern).
    pub fn with_assignment(self, actor: impl Into<ActorId>, role: Role) -> Self {
        self.assign(actor, role);
        self
    }

    pub fn assign(&self, actor: impl Into<ActorId>, role: Role) {
        self.assignments
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(actor.into())
            .or_default()
            .push(role);
    }

    /// Replaces every role assigned to `actor`.
    pub fn set_roles(&self, actor: impl Into<ActorId>, roles: Vec<Role>) {
        self.assignments
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(actor.into(), roles);
    }

    /// Number of `find_user_roles` calls served so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl RoleRepository for InMemoryRoleRepository {
    fn find_user_roles(&self, actor: &ActorId) -> Result<Vec<Role>, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .assignments
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(actor)
            .cloned()
            .unwrap_or_default())
    }
}

/// A policy set held in a vector.
#[derive(Debug, Default)]
pub struct InMemoryPolicyRepository {
    policies: RwLock<Vec<Policy>>,
    calls: AtomicUsize,
}

impl InMemoryPolicyRepository {
    pub fn new(policies: Vec<Policy>) -> Self {
        Self {
            policies: RwLock::new(policies),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn push(&self, policy: Policy) {
        self.policies
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(policy);
    }

    pub fn replace(&self, policies: Vec<Policy>) {
        *self
            .policies
            .write()
            .unwrap_or_else(PoisonError::into_inner) = policies;
    }

    /// Number of `find_all_policies` calls served so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PolicyRepository for InMemoryPolicyRepository {
    fn find_all_policies(&self) -> Result<Vec<Policy>, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .policies
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }
}
