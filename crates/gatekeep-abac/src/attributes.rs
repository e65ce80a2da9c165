//! Evaluation context assembly.
//!
//! Every ABAC check evaluates against one ordered attribute list:
//!
//! ```text
//! [ user.id, resource, action, time.hour, <caller context ...> ]
//! ```
//!
//! The four synthesized entries always come first. Lookups return the first
//! matching key, so a caller-supplied `time.hour` can never shadow the
//! engine's own value.

use chrono::{DateTime, FixedOffset, Timelike, Utc};
use gatekeep_types::{ActorId, Attribute, AttributeValue};

/// Key of the synthesized actor attribute.
pub const USER_ID: &str = "user.id";
/// Key of the synthesized resource attribute.
pub const RESOURCE: &str = "resource";
/// Key of the synthesized action attribute.
pub const ACTION: &str = "action";
/// Key of the synthesized hour-of-day attribute (0-23).
pub const TIME_HOUR: &str = "time.hour";

/// Returns the hour of day (0-23) of `instant` in the given offset.
pub fn hour_of_day(instant: DateTime<Utc>, offset: FixedOffset) -> u32 {
    instant.with_timezone(&offset).hour()
}

/// Builds the attribute list for one evaluation.
///
/// No deduplication is performed; `context` is appended as given.
pub fn build_attribute_set(
    actor: &ActorId,
    resource: &str,
    action: &str,
    hour: u32,
    context: &[Attribute],
) -> Vec<Attribute> {
    let mut attributes = Vec::with_capacity(4 + context.len());
    attributes.push(Attribute::new(USER_ID, actor.as_str()));
    attributes.push(Attribute::new(RESOURCE, resource));
    attributes.push(Attribute::new(ACTION, action));
    attributes.push(Attribute::new(TIME_HOUR, hour));
    attributes.extend_from_slice(context);
    attributes
}

/// Returns the value of the first attribute named `key`.
pub fn lookup<'a>(attributes: &'a [Attribute], key: &str) -> Option<&'a AttributeValue> {
    attributes
        .iter()
        .find(|attribute| attribute.key == key)
        .map(|attribute| &attribute.value)
}

// ============================================================================
// Tests
// ============================================================================
