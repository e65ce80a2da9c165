//! # gatekeep-abac: Attribute-Based Access Control
//!
//! Provides context-aware access decisions from attributes of the actor, the
//! resource, the action, the time of day and caller-supplied context.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Access Request                              │
//! │  (actor, resource, action, context attrs)    │
//! └─────────────────┬───────────────────────────┘
//!                   │
//!                   ▼
//! ┌─────────────────────────────────────────────┐
//! │  Attribute Set                               │
//! │  user.id, resource, action, time.hour, ...   │
//! └─────────────────┬───────────────────────────┘
//!                   │
//!                   ▼
//! ┌─────────────────────────────────────────────┐
//! │  PolicyEvaluator                             │
//! │  ├─ Any matching DENY policy → deny          │
//! │  ├─ Any matching ALLOW policy → allow        │
//! │  └─ Otherwise → deny                         │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Examples
//!
//! ```
//! use gatekeep_abac::attributes::build_attribute_set;
//! use gatekeep_abac::evaluator::decide;
//! use gatekeep_abac::policy::Policy;
//! use gatekeep_types::ActorId;
//!
//! let policies = vec![
//!     Policy::allow_all("p-allow"),
//!     Policy::deny_outside_hours("p-hours", 8, 18),
//! ];
//!
//! let evening = build_attribute_set(&ActorId::from("u-1"), "reports", "view", 20, &[]);
//! assert!(!decide(&policies, &evening));
//!
//! let noon = build_attribute_set(&ActorId::from("u-1"), "reports", "view", 12, &[]);
//! assert!(decide(&policies, &noon));
//! ```

pub mod attributes;
pub mod evaluator;
pub mod policy;

pub use evaluator::{PolicyEvaluator, PolicyRepository, decide, evaluate_policy};
pub use policy::{Combinator, Condition, ConditionValue, Effect, Operator, Policy, PolicyRule};
