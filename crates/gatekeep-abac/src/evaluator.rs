//! ABAC policy evaluation engine.
//!
//! Evaluation happens at three levels:
//!
//! - a **condition** tests one attribute and never fails; a missing attribute,
//!   a type mismatch or an unknown operator all resolve to `false`
//! - a **rule** joins its conditions with `AND` or `OR`
//! - a **policy** matches when all of its rules match
//!
//! Across policies, any matching DENY wins; otherwise any matching ALLOW
//! grants; otherwise access is denied.

use crate::attributes::{build_attribute_set, hour_of_day, lookup};
use crate::policy::{Combinator, Condition, ConditionValue, Effect, Operator, Policy, PolicyRule};
use chrono::{FixedOffset, Offset, Utc};
use gatekeep_types::{ActorId, Attribute, AttributeValue, Clock, StoreError, SystemClock};
use std::sync::Arc;
use tracing::debug;

// ============================================================================
// Policy Repository
// ============================================================================

/// Read-only access to the complete policy set.
///
/// No server-side filtering is assumed; the engine filters in memory.
pub trait PolicyRepository: Send + Sync {
    fn find_all_policies(&self) -> Result<Vec<Policy>, StoreError>;
}

impl<T: PolicyRepository + ?Sized> PolicyRepository for Arc<T> {
    fn find_all_policies(&self) -> Result<Vec<Policy>, StoreError> {
        (**self).find_all_policies()
    }
}

impl<T: PolicyRepository + ?Sized> PolicyRepository for &T {
    fn find_all_policies(&self) -> Result<Vec<Policy>, StoreError> {
        (**self).find_all_policies()
    }
}

// ============================================================================
// Policy Evaluator
// ============================================================================

/// Evaluates the stored policy set for an access request.
#[derive(Debug, Clone)]
pub struct PolicyEvaluator<P, C = SystemClock> {
    repository: P,
    clock: C,
    utc_offset: FixedOffset,
}

impl<P: PolicyRepository> PolicyEvaluator<P> {
    /// Creates an evaluator reading time from the system clock, in UTC.
    pub fn new(repository: P) -> Self {
        Self::with_clock(repository, SystemClock)
    }
}

impl<P: PolicyRepository, C: Clock> PolicyEvaluator<P, C> {
    pub fn with_clock(repository: P, clock: C) -> Self {
        Self {
            repository,
            clock,
            utc_offset: Utc.fix(),
        }
    }

    /// Sets the offset used to derive `time.hour`.
    pub fn with_utc_offset(mut self, offset: FixedOffset) -> Self {
        self.utc_offset = offset;
        self
    }

    pub fn repository(&self) -> &P {
        &self.repository
    }

    /// Decides the ABAC half of an access request.
    ///
    /// Performs one full scan of the policy set. Store failures propagate.
    pub fn check_access(
        &self,
        actor: &ActorId,
        resource: &str,
        action: &str,
        context: &[Attribute],
    ) -> Result<bool, StoreError> {
        let policies = self.repository.find_all_policies()?;
        let hour = hour_of_day(self.clock.now(), self.utc_offset);
        let attributes = build_attribute_set(actor, resource, action, hour, context);

        let allowed = decide(&policies, &attributes);

        debug!(
            actor = %actor,
            resource,
            action,
            hour,
            policies = policies.len(),
            allowed,
            "ABAC evaluated"
        );

        Ok(allowed)
    }
}

// ============================================================================
// Public API
// ============================================================================

/// Combines a policy set into one decision.
///
/// 1. Any matching DENY policy → `false`, regardless of order.
/// 2. Otherwise any matching ALLOW policy → `true`.
/// 3. Otherwise `false` (default-deny).
///
/// Policies with an unrecognized effect are skipped.
pub fn decide(policies: &[Policy], attributes: &[Attribute]) -> bool {
    for policy in policies {
        if let Effect::Unknown(token) = &policy.effect {
            debug!(
                policy = %policy.id,
                effect = %token,
                "Policy has unrecognized effect; ignoring"
            );
        }
    }

    let denied_by = policies
        .iter()
        .filter(|policy| policy.effect == Effect::Deny)
        .find(|policy| evaluate_policy(policy, attributes));

    if let Some(policy) = denied_by {
        debug!(policy = %policy.id, name = %policy.name, "DENY policy matched");
        return false;
    }

    let allowed_by = policies
        .iter()
        .filter(|policy| policy.effect == Effect::Allow)
        .find(|policy| evaluate_policy(policy, attributes));

    match allowed_by {
        Some(policy) => {
            debug!(policy = %policy.id, name = %policy.name, "ALLOW policy matched");
            true
        }
        None => {
            debug!("No policy matched; default deny");
            false
        }
    }
}

/// Returns whether every rule of `policy` holds. No rules → `true`.
pub fn evaluate_policy(policy: &Policy, attributes: &[Attribute]) -> bool {
    policy
        .rules
        .iter()
        .all(|rule| evaluate_rule(rule, attributes))
}

/// Joins the rule's conditions with its combinator.
///
/// An empty condition list is vacuously true for both `AND` and `OR`.
/// An unknown combinator never matches.
pub fn evaluate_rule(rule: &PolicyRule, attributes: &[Attribute]) -> bool {
    if rule.conditions.is_empty() {
        return !matches!(rule.combinator, Combinator::Unknown(_));
    }

    let mut results = rule
        .conditions
        .iter()
        .map(|condition| evaluate_condition(condition, attributes));

    match rule.combinator {
        Combinator::And => results.all(|matched| matched),
        Combinator::Or => results.any(|matched| matched),
        Combinator::Unknown(_) => false,
    }
}

/// Tests one condition against the first attribute carrying its key.
///
/// Never panics; every mismatch resolves to `false`.
pub fn evaluate_condition(condition: &Condition, attributes: &[Attribute]) -> bool {
    let Some(actual) = lookup(attributes, &condition.attribute) else {
        return false;
    };

    match (&condition.operator, &condition.value) {
        (Operator::Eq, ConditionValue::Scalar(expected)) => actual == expected,
        (Operator::Ne, ConditionValue::Scalar(expected)) => actual != expected,
        // A list is never equal to a scalar.
        (Operator::Eq, ConditionValue::List(_)) => false,
        (Operator::Ne, ConditionValue::List(_)) => true,

        (Operator::Gt, expected) => compare_numbers(actual, expected, |a, b| a > b),
        (Operator::Lt, expected) => compare_numbers(actual, expected, |a, b| a < b),
        (Operator::Ge, expected) => compare_numbers(actual, expected, |a, b| a >= b),
        (Operator::Le, expected) => compare_numbers(actual, expected, |a, b| a <= b),

        (Operator::In, ConditionValue::List(members)) => members.contains(actual),
        (Operator::NotIn, ConditionValue::List(members)) => !members.contains(actual),
        (Operator::In | Operator::NotIn, ConditionValue::Scalar(_)) => false,

        (Operator::Contains, ConditionValue::Scalar(AttributeValue::String(needle))) => actual
            .as_str()
            .is_some_and(|haystack| haystack.contains(needle.as_str())),
        (Operator::Contains, _) => false,

        (Operator::Unknown(_), _) => false,
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Applies `cmp` when both sides are numbers; anything else is `false`.
fn compare_numbers(
    actual: &AttributeValue,
    expected: &ConditionValue,
    cmp: impl Fn(f64, f64) -> bool,
) -> bool {
    match (actual, expected) {
        (AttributeValue::Number(a), ConditionValue::Scalar(AttributeValue::Number(b))) => {
            cmp(*a, *b)
        }
        (actual, ConditionValue::Scalar(expected)) => {
            debug!(
                actual = actual.type_name(),
                expected = expected.type_name(),
                "Ordering comparison on non-numbers"
            );
            false
        }
        (actual, ConditionValue::List(_)) => {
            debug!(actual = actual.type_name(), "Ordering comparison against a list");
            false
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
