//! # gatekeep: combined RBAC + ABAC access control
//!
//! Decides whether an actor may perform an action on a resource, given
//! caller-supplied context attributes, and caches the decision for a bounded
//! time.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  has_permission(actor, resource, action, ctx)│
//! └─────────────────┬───────────────────────────┘
//!                   │
//!                   ▼
//! ┌─────────────────────────────────────────────┐
//! │  DecisionCache ── hit ──▶ cached bool        │
//! └─────────────────┬───────────────────────────┘
//!                   │ miss
//!                   ▼
//! ┌─────────────────────────────────────────────┐
//! │  RoleEvaluator (RBAC)   PolicyEvaluator (ABAC)│
//! │        └──────── AND ────────┘               │
//! └─────────────────┬───────────────────────────┘
//!                   │
//!                   ▼
//! ┌─────────────────────────────────────────────┐
//! │  store in cache (TTL) ─▶ return decision     │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Examples
//!
//! ```
//! use gatekeep::AccessControl;
//! use gatekeep::memory::{InMemoryPolicyRepository, InMemoryRoleRepository};
//! use gatekeep_abac::Policy;
//! use gatekeep_rbac::{Permission, Role};
//! use gatekeep_types::ActorId;
//!
//! let roles = InMemoryRoleRepository::new().with_assignment(
//!     "alice",
//!     Role::new("r-admin", "admin").with_permission(Permission::wildcard("users")),
//! );
//! let policies = InMemoryPolicyRepository::new(vec![Policy::allow_all("p-all")]);
//!
//! let engine = AccessControl::new(roles, policies);
//! let alice = ActorId::from("alice");
//!
//! assert!(engine.has_permission(&alice, "users", "delete", &[])?);
//! assert!(!engine.has_permission(&alice, "reports", "view", &[])?);
//! # Ok::<(), gatekeep::AccessError>(())
//! ```

pub mod access;
pub mod cache;
pub mod error;
pub mod fixture;
pub mod key;
pub mod memory;

pub use access::{AccessControl, AccessControlBuilder, DEFAULT_DECISION_TTL, Decision};
pub use cache::{CacheStats, DecisionCache};
pub use error::{AccessError, Result};
pub use fixture::{Fixture, FixtureError};
pub use key::DecisionKey;
