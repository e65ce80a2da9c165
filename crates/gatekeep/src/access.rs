//! The access-control facade.
//!
//! Orchestrates one decision:
//!
//! ```text
//! CACHE_LOOKUP ──hit──▶ return cached decision
//!      │
//!     miss
//!      ▼
//! EVALUATE_RBAC ─▶ EVALUATE_ABAC ─▶ COMBINE (AND) ─▶ STORE ─▶ return
//! ```
//!
//! A hit performs no RBAC or ABAC work, even if roles or policies changed
//! since the decision was stored; staleness is bounded by the TTL. On a miss
//! both checks always run. A store failure aborts the call and nothing is
//! cached.

use crate::cache::{CacheStats, DecisionCache};
use crate::error::{AccessError, Result};
use crate::key::DecisionKey;
use chrono::{FixedOffset, Offset, Utc};
use gatekeep_abac::{PolicyEvaluator, PolicyRepository};
use gatekeep_config::{ConfigError, GatekeepConfig};
use gatekeep_rbac::{RoleEvaluator, RoleRepository};
use gatekeep_types::{ActorId, Attribute, Clock, SystemClock};
use std::time::Duration;
use tracing::{debug, info, warn};

/// How long a decision stays cached unless configured otherwise.
pub const DEFAULT_DECISION_TTL: Duration = Duration::from_secs(60);

/// Outcome of one access check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    /// The combined decision: RBAC AND ABAC.
    pub allowed: bool,
    /// RBAC outcome, or `None` when served from cache.
    pub rbac_allowed: Option<bool>,
    /// ABAC outcome, or `None` when served from cache.
    pub abac_allowed: Option<bool>,
    /// Whether the decision came from the cache.
    pub cached: bool,
}

impl Decision {
    fn cached(allowed: bool) -> Self {
        Self {
            allowed,
            rbac_allowed: None,
            abac_allowed: None,
            cached: true,
        }
    }

    fn evaluated(rbac_allowed: bool, abac_allowed: bool) -> Self {
        Self {
            allowed: rbac_allowed && abac_allowed,
            rbac_allowed: Some(rbac_allowed),
            abac_allowed: Some(abac_allowed),
            cached: false,
        }
    }
}

/// Combined RBAC + ABAC decision engine with a TTL decision cache.
///
/// Holds no global state. Construct one per process (or per tenant) and
/// share it by reference or behind an `Arc`.
pub struct AccessControl<R, P, C = SystemClock> {
    roles: RoleEvaluator<R>,
    policies: PolicyEvaluator<P, C>,
    cache: DecisionCache<C>,
    ttl: Duration,
    cache_enabled: bool,
}

impl<R: RoleRepository, P: PolicyRepository> AccessControl<R, P> {
    /// Creates an engine with the system clock, a 60 second TTL and UTC hours.
    pub fn new(roles: R, policies: P) -> Self {
        Self::builder(roles, policies).build()
    }

    pub fn builder(roles: R, policies: P) -> AccessControlBuilder<R, P> {
        AccessControlBuilder {
            roles,
            policies,
            clock: SystemClock,
            ttl: DEFAULT_DECISION_TTL,
            cache_enabled: true,
            max_entries: crate::cache::DEFAULT_MAX_ENTRIES,
            utc_offset: Utc.fix(),
        }
    }
}

impl<R: RoleRepository, P: PolicyRepository, C: Clock> AccessControl<R, P, C> {
    /// Returns whether `actor` may perform `action` on `resource`.
    ///
    /// `Ok(false)` is a denial. `Err` means a store failed and no decision
    /// was made.
    pub fn has_permission(
        &self,
        actor: &ActorId,
        resource: &str,
        action: &str,
        context: &[Attribute],
    ) -> Result<bool> {
        self.evaluate(actor, resource, action, context)
            .map(|decision| decision.allowed)
    }

    /// Like [`has_permission`](Self::has_permission), returning the breakdown.
    pub fn evaluate(
        &self,
        actor: &ActorId,
        resource: &str,
        action: &str,
        context: &[Attribute],
    ) -> Result<Decision> {
        let key = if self.cache_enabled && is_cacheable(context) {
            Some(
                DecisionKey::new(actor, resource, action, context)
                    .map_err(AccessError::KeyEncoding)?,
            )
        } else {
            None
        };

        if let Some(key) = &key {
            if let Some(allowed) = self.cache.get(key) {
                debug!(actor = %actor, resource, action, allowed, "Decision cache hit");
                return Ok(Decision::cached(allowed));
            }
            debug!(actor = %actor, resource, action, "Decision cache miss");
        }

        let rbac_allowed = self
            .roles
            .check_user_permission(actor, resource, action)
            .map_err(|err| {
                warn!(actor = %actor, resource, action, error = %err, "Role store failed");
                AccessError::RoleStore(err)
            })?;

        let abac_allowed = self
            .policies
            .check_access(actor, resource, action, context)
            .map_err(|err| {
                warn!(actor = %actor, resource, action, error = %err, "Policy store failed");
                AccessError::PolicyStore(err)
            })?;

        let decision = Decision::evaluated(rbac_allowed, abac_allowed);

        if let Some(key) = key {
            self.cache.insert(key, actor, decision.allowed, self.ttl);
        }

        info!(
            actor = %actor,
            resource,
            action,
            rbac_allowed,
            abac_allowed,
            allowed = decision.allowed,
            "Access decision"
        );

        Ok(decision)
    }

    /// Drops every cached decision for `actor`, e.g. after a role change.
    pub fn invalidate_actor(&self, actor: &ActorId) -> usize {
        self.cache.invalidate_actor(actor)
    }

    /// Drops every cached decision, e.g. after a policy change.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn cache(&self) -> &DecisionCache<C> {
        &self.cache
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

/// Non-finite numbers share one key encoding, so such requests bypass the cache.
fn is_cacheable(context: &[Attribute]) -> bool {
    context
        .iter()
        .all(|attribute| attribute.value.as_number().is_none_or(f64::is_finite))
}

// ============================================================================
// Builder
// ============================================================================

/// Configures an [`AccessControl`] before construction.
pub struct AccessControlBuilder<R, P, C = SystemClock> {
    roles: R,
    policies: P,
    clock: C,
    ttl: Duration,
    cache_enabled: bool,
    max_entries: usize,
    utc_offset: FixedOffset,
}

impl<R: RoleRepository, P: PolicyRepository, C: Clock + Clone> AccessControlBuilder<R, P, C> {
    /// Replaces the time source for both `time.hour` and cache expiry.
    pub fn clock<C2: Clock + Clone>(self, clock: C2) -> AccessControlBuilder<R, P, C2> {
        AccessControlBuilder {
            roles: self.roles,
            policies: self.policies,
            clock,
            ttl: self.ttl,
            cache_enabled: self.cache_enabled,
            max_entries: self.max_entries,
            utc_offset: self.utc_offset,
        }
    }

    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// With the cache disabled every call evaluates and nothing is stored.
    pub fn cache_enabled(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }

    pub fn max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    /// Offset used to derive the `time.hour` attribute.
    pub fn utc_offset(mut self, offset: FixedOffset) -> Self {
        self.utc_offset = offset;
        self
    }

    /// Applies validated settings from a loaded configuration.
    pub fn config(self, config: &GatekeepConfig) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        let offset = config.clock.utc_offset()?;
        Ok(self
            .ttl(config.cache.ttl())
            .cache_enabled(config.cache.enabled)
            .max_entries(config.cache.max_entries)
            .utc_offset(offset))
    }

    pub fn build(self) -> AccessControl<R, P, C> {
        AccessControl {
            roles: RoleEvaluator::new(self.roles),
            policies: PolicyEvaluator::with_clock(self.policies, self.clock.clone())
                .with_utc_offset(self.utc_offset),
            cache: DecisionCache::with_clock(self.clock).with_max_entries(self.max_entries),
            ttl: self.ttl,
            cache_enabled: self.cache_enabled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{InMemoryPolicyRepository, InMemoryRoleRepository};
    use chrono::TimeZone;
    use gatekeep_abac::Policy;
    use gatekeep_rbac::{Permission, Role};
    use gatekeep_types::ManualClock;

    fn noon() -> ManualClock {
        ManualClock::new(Utc.with_ymd_and_hms(2025, 1, 8, 12, 0, 0).unwrap())
    }

    #[test]
    fn test_decision_breakdown() {
        let roles = InMemoryRoleRepository::new().with_assignment(
            "alice",
            Role::new("r-1", "viewer").with_permission(Permission::new("content", "view")),
        );
        let policies = InMemoryPolicyRepository::new(vec![Policy::allow_all("p-all")]);
        let engine = AccessControl::builder(roles, policies).clock(noon()).build();
        let alice = ActorId::from("alice");

        let first = engine.evaluate(&alice, "content", "edit", &[]).unwrap();
        assert_eq!(
            first,
            Decision {
                allowed: false,
                rbac_allowed: Some(false),
                abac_allowed: Some(true),
                cached: false,
            }
        );

        let second = engine.evaluate(&alice, "content", "edit", &[]).unwrap();
        assert!(second.cached);
        assert!(!second.allowed);
        assert_eq!(second.rbac_allowed, None);
    }

    #[test]
    fn test_non_finite_context_bypasses_cache() {
        let engine = AccessControl::builder(
            InMemoryRoleRepository::new(),
            InMemoryPolicyRepository::new(vec![]),
        )
        .clock(noon())
        .build();
        let alice = ActorId::from("alice");

        for score in [f64::NAN, f64::INFINITY] {
            engine
                .has_permission(&alice, "r", "a", &[Attribute::new("score", score)])
                .unwrap();
        }
        assert!(engine.cache().is_empty());

        engine
            .has_permission(&alice, "r", "a", &[Attribute::new("score", 1.5)])
            .unwrap();
        assert_eq!(engine.cache().len(), 1);
    }

    #[test]
    fn test_config_applies_settings() {
        let mut config = GatekeepConfig::default();
        config.cache.ttl_ms = 1500;
        config.cache.enabled = false;
        config.cache.max_entries = 64;
        config.clock.utc_offset_minutes = 60;

        let engine = AccessControl::builder(
            InMemoryRoleRepository::new(),
            InMemoryPolicyRepository::new(vec![]),
        )
        .config(&config)
        .unwrap()
        .build();

        assert_eq!(engine.ttl(), Duration::from_millis(1500));
        assert_eq!(engine.cache().capacity(), 64);
        engine
            .has_permission(&ActorId::from("x"), "r", "a", &[])
            .unwrap();
        assert!(engine.cache().is_empty(), "disabled cache stores nothing");
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = GatekeepConfig::default();
        config.clock.utc_offset_minutes = 5000;

        let result = AccessControl::builder(
            InMemoryRoleRepository::new(),
            InMemoryPolicyRepository::new(vec![]),
        )
        .config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }
}
