//! # gatekeep-rbac: Role-Based Access Control
//!
//! Decides whether an actor holds a role granting a `(resource, action)` pair.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Access Check (actor, resource, action)      │
//! └─────────────────┬───────────────────────────┘
//!                   │
//!                   ▼
//! ┌─────────────────────────────────────────────┐
//! │  RoleEvaluator                               │
//! │  ├─ RoleRepository::find_user_roles(actor)   │
//! │  └─ Any role with a matching permission?     │
//! └─────────────────┬───────────────────────────┘
//!                   │
//!                   ▼
//! ┌─────────────────────────────────────────────┐
//! │  bool (or StoreError if the lookup failed)   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! A permission matches when its resource equals the requested resource and
//! its action equals the requested action or is the wildcard `*`. An actor
//! with no roles is denied everything.
//!
//! ## Examples
//!
//! ```
//! use gatekeep_rbac::{Permission, Role};
//!
//! let editor = Role::new("r-editor", "editor")
//!     .with_permission(Permission::new("content", "view"))
//!     .with_permission(Permission::wildcard("drafts"));
//!
//! assert!(editor.grants("content", "view"));
//! assert!(!editor.grants("content", "edit"));
//! assert!(editor.grants("drafts", "delete"));
//! ```

pub mod evaluator;
pub mod permissions;
pub mod roles;

pub use evaluator::{RoleEvaluator, RoleRepository};
pub use permissions::{Permission, WILDCARD_ACTION};
pub use roles::Role;
