//! Decision cache keys.
//!
//! A key is the JSON encoding of `(actor, resource, action, context)` as one
//! array, in that field order:
//!
//! ```text
//! ["alice","reports","view",[{"key":"department","value":"finance"},{"key":"level","value":3.0}]]
//! ```
//!
//! `Attribute` serializes its fields in declaration order and the context is
//! a list, so the encoding never depends on map iteration order. JSON string
//! escaping keeps delimiters inside fields from colliding, and the untagged
//! value keeps `"8"` and `8` apart. Context order is significant because it
//! decides first-match precedence.
//!
//! Non-finite numbers all encode as `null`; callers should not cache
//! decisions whose context carries them.

use gatekeep_types::{ActorId, Attribute};
use std::fmt::{self, Display};

/// Deterministic identifier of one authorization outcome.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DecisionKey(String);

impl DecisionKey {
    pub fn new(
        actor: &ActorId,
        resource: &str,
        action: &str,
        context: &[Attribute],
    ) -> Result<Self, serde_json::Error> {
        serde_json::to_string(&(actor, resource, action, context)).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for DecisionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn key(context: &[Attribute]) -> DecisionKey {
        DecisionKey::new(&ActorId::from("alice"), "reports", "view", context).unwrap()
    }

    #[test]
    fn test_encoding_is_stable() {
        let k = key(&[
            Attribute::new("department", "finance"),
            Attribute::new("level", 3),
            Attribute::new("mfa", true),
        ]);
        assert_eq!(
            k.as_str(),
            r#"["alice","reports","view",[{"key":"department","value":"finance"},{"key":"level","value":3.0},{"key":"mfa","value":true}]]"#
        );
    }

    #[test]
    fn test_empty_context() {
        assert_eq!(key(&[]).as_str(), r#"["alice","reports","view",[]]"#);
    }

    #[test]
    fn test_value_types_are_distinguished() {
        assert_ne!(
            key(&[Attribute::new("code", "8")]),
            key(&[Attribute::new("code", 8)])
        );
        assert_ne!(
            key(&[Attribute::new("flag", "true")]),
            key(&[Attribute::new("flag", true)])
        );
    }

    #[test]
    fn test_context_order_and_case_matter() {
        let a = Attribute::new("a", 1);
        let b = Attribute::new("b", 2);
        assert_ne!(key(&[a.clone(), b.clone()]), key(&[b, a]));
        assert_ne!(
            key(&[Attribute::new("Region", "eu")]),
            key(&[Attribute::new("region", "eu")])
        );
    }

    #[test]
    fn test_delimiters_inside_fields_cannot_collide() {
        let left = DecisionKey::new(&ActorId::from("a\",\"b"), "c", "d", &[]).unwrap();
        let right = DecisionKey::new(&ActorId::from("a"), "b\",\"c", "d", &[]).unwrap();
        assert_ne!(left, right);
    }

    proptest! {
        #[test]
        fn prop_any_field_change_changes_key(
            actor in "[a-z]{1,6}",
            resource in "[a-z]{1,6}",
            action in "[a-z]{1,6}",
            value in "[a-z]{0,6}",
        ) {
            let actor = ActorId::new(actor);
            let context = vec![Attribute::new("k", value.clone())];
            let encode = |resource: &str, action: &str, context: &[Attribute]| {
                DecisionKey::new(&actor, resource, action, context).unwrap()
            };
            let base = encode(&resource, &action, &context);

            prop_assert_eq!(&base, &encode(&resource, &action, &context));

            let changed = vec![Attribute::new("k", format!("{value}x"))];
            prop_assert_ne!(&base, &encode(&resource, &action, &changed));
            prop_assert_ne!(&base, &encode(&format!("{resource}x"), &action, &context));
            prop_assert_ne!(&base, &encode(&resource, &format!("{action}x"), &context));
        }
    }
}
