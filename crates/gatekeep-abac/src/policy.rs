//! ABAC policy definitions.
//!
//! A policy carries an effect and an ordered list of rules. The policy
//! matches only when every rule matches. Inside a rule, the `AND`/`OR`
//! combinator decides how its conditions are joined.
//!
//! Tokens read from a store that fall outside the known vocabulary are kept
//! as `Unknown` variants instead of failing deserialization. Evaluation treats
//! them as non-matches.

use chrono::{DateTime, Utc};
use gatekeep_types::AttributeValue;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

// ============================================================================
// Effect
// ============================================================================

/// The outcome a matching policy asserts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Effect {
    /// Grant access (`"ALLOW"`).
    Allow,
    /// Deny access (`"DENY"`). A matching deny overrides every allow.
    Deny,
    /// Unrecognized token; such a policy never affects a decision.
    Unknown(String),
}

impl Effect {
    pub fn as_str(&self) -> &str {
        match self {
            Effect::Allow => "ALLOW",
            Effect::Deny => "DENY",
            Effect::Unknown(token) => token,
        }
    }
}

impl From<String> for Effect {
    fn from(token: String) -> Self {
        match token.as_str() {
            "ALLOW" => Effect::Allow,
            "DENY" => Effect::Deny,
            _ => Effect::Unknown(token),
        }
    }
}

impl From<Effect> for String {
    fn from(effect: Effect) -> Self {
        effect.as_str().to_string()
    }
}

impl Display for Effect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Operator
// ============================================================================

/// Comparison applied by a [`Condition`]. Closed set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Operator {
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `>`
    Gt,
    /// `<`
    Lt,
    /// `>=`
    Ge,
    /// `<=`
    Le,
    /// `IN`
    In,
    /// `NOT_IN`
    NotIn,
    /// `CONTAINS`
    Contains,
    /// Unrecognized token; always evaluates to `false`.
    Unknown(String),
}

impl Operator {
    pub fn as_str(&self) -> &str {
        match self {
            Operator::Eq => "==",
            Operator::Ne => "!=",
            Operator::Gt => ">",
            Operator::Lt => "<",
            Operator::Ge => ">=",
            Operator::Le => "<=",
            Operator::In => "IN",
            Operator::NotIn => "NOT_IN",
            Operator::Contains => "CONTAINS",
            Operator::Unknown(token) => token,
        }
    }
}

impl From<String> for Operator {
    fn from(token: String) -> Self {
        match token.as_str() {
            "==" => Operator::Eq,
            "!=" => Operator::Ne,
            ">" => Operator::Gt,
            "<" => Operator::Lt,
            ">=" => Operator::Ge,
            "<=" => Operator::Le,
            "IN" => Operator::In,
            "NOT_IN" => Operator::NotIn,
            "CONTAINS" => Operator::Contains,
            _ => Operator::Unknown(token),
        }
    }
}

impl From<&str> for Operator {
    fn from(token: &str) -> Self {
        Operator::from(token.to_string())
    }
}

impl From<Operator> for String {
    fn from(operator: Operator) -> Self {
        operator.as_str().to_string()
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Condition
// ============================================================================

/// Right-hand side of a condition: a scalar or a list of scalars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionValue {
    List(Vec<AttributeValue>),
    Scalar(AttributeValue),
}

impl ConditionValue {
    /// Builds a list value from anything convertible to attribute values.
    pub fn list<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<AttributeValue>,
    {
        ConditionValue::List(values.into_iter().map(Into::into).collect())
    }
}

impl From<Vec<AttributeValue>> for ConditionValue {
    fn from(values: Vec<AttributeValue>) -> Self {
        ConditionValue::List(values)
    }
}

macro_rules! scalar_condition_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for ConditionValue {
                fn from(value: $ty) -> Self {
                    ConditionValue::Scalar(AttributeValue::from(value))
                }
            }
        )*
    };
}

scalar_condition_value!(AttributeValue, &str, String, bool, f64, i64, i32, u32);

/// One atomic test against a named attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub attribute: String,
    pub operator: Operator,
    pub value: ConditionValue,
}

impl Condition {
    pub fn new(
        attribute: impl Into<String>,
        operator: impl Into<Operator>,
        value: impl Into<ConditionValue>,
    ) -> Self {
        Self {
            attribute: attribute.into(),
            operator: operator.into(),
            value: value.into(),
        }
    }
}

// ============================================================================
// Rule
// ============================================================================

/// How a rule joins its conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Combinator {
    /// Every condition must hold.
    And,
    /// At least one condition must hold.
    Or,
    /// Unrecognized token; the rule never matches.
    Unknown(String),
}

impl Combinator {
    pub fn as_str(&self) -> &str {
        match self {
            Combinator::And => "AND",
            Combinator::Or => "OR",
            Combinator::Unknown(token) => token,
        }
    }
}

impl From<String> for Combinator {
    fn from(token: String) -> Self {
        match token.as_str() {
            "AND" => Combinator::And,
            "OR" => Combinator::Or,
            _ => Combinator::Unknown(token),
        }
    }
}

impl From<Combinator> for String {
    fn from(combinator: Combinator) -> Self {
        combinator.as_str().to_string()
    }
}

/// A list of conditions joined by one combinator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyRule {
    /// Serialized as `condition` to match the store's document shape.
    #[serde(rename = "condition")]
    pub combinator: Combinator,
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl PolicyRule {
    /// A rule requiring every condition.
    pub fn all(conditions: Vec<Condition>) -> Self {
        Self {
            combinator: Combinator::And,
            conditions,
        }
    }

    /// A rule requiring at least one condition.
    pub fn any(conditions: Vec<Condition>) -> Self {
        Self {
            combinator: Combinator::Or,
            conditions,
        }
    }
}

// ============================================================================
// Policy
// ============================================================================

/// An Attribute-Based Access Control policy.
///
/// Matches the evaluation context iff every rule matches. A policy with no
/// rules matches unconditionally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub effect: Effect,
    #[serde(default)]
    pub rules: Vec<PolicyRule>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Policy {
    pub fn new(id: impl Into<String>, name: impl Into<String>, effect: Effect) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            effect,
            rules: Vec::new(),
            created_at: None,
            updated_at: None,
        }
    }

    pub fn allow(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(id, name, Effect::Allow)
    }

    pub fn deny(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(id, name, Effect::Deny)
    }

    /// Adds a rule to the policy (builder pattern).
    pub fn with_rule(mut self, rule: PolicyRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Returns an ALLOW policy with no rules, granting every request that
    /// RBAC already permits.
    pub fn allow_all(id: impl Into<String>) -> Self {
        Self::allow(id, "allow-all").with_description("Allows every request")
    }

    /// Returns a DENY policy that matches outside `[open_hour, close_hour]`.
    ///
    /// Rules:
    /// 1. `time.hour < open_hour OR time.hour > close_hour`
    pub fn deny_outside_hours(id: impl Into<String>, open_hour: u32, close_hour: u32) -> Self {
        Self::deny(id, "deny-outside-hours")
            .with_description(format!(
                "Denies requests before {open_hour}:00 or after {close_hour}:59"
            ))
            .with_rule(PolicyRule::any(vec![
                Condition::new(crate::attributes::TIME_HOUR, Operator::Lt, open_hour),
                Condition::new(crate::attributes::TIME_HOUR, Operator::Gt, close_hour),
            ]))
    }

    /// Returns the operator, combinator and effect tokens this policy carries
    /// that the engine does not recognize.
    pub fn unknown_tokens(&self) -> Vec<String> {
        let mut tokens = Vec::new();
        if let Effect::Unknown(token) = &self.effect {
            tokens.push(format!("effect {token:?}"));
        }
        for rule in &self.rules {
            if let Combinator::Unknown(token) = &rule.combinator {
                tokens.push(format!("combinator {token:?}"));
            }
            for condition in &rule.conditions {
                if let Operator::Unknown(token) = &condition.operator {
                    tokens.push(format!("operator {token:?}"));
                }
            }
        }
        tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("==" => Operator::Eq)]
    #[test_case("!=" => Operator::Ne)]
    #[test_case(">" => Operator::Gt)]
    #[test_case("<" => Operator::Lt)]
    #[test_case(">=" => Operator::Ge)]
    #[test_case("<=" => Operator::Le)]
    #[test_case("IN" => Operator::In)]
    #[test_case("NOT_IN" => Operator::NotIn)]
    #[test_case("CONTAINS" => Operator::Contains)]
    #[test_case("in" => Operator::Unknown("in".to_string()); "lowercase is unknown")]
    #[test_case("LIKE" => Operator::Unknown("LIKE".to_string()); "unsupported")]
    fn test_operator_tokens(token: &str) -> Operator {
        Operator::from(token)
    }

    #[test]
    fn test_operator_token_roundtrip() {
        for token in ["==", "!=", ">", "<", ">=", "<=", "IN", "NOT_IN", "CONTAINS", "~="] {
            assert_eq!(Operator::from(token).as_str(), token);
        }
    }

    #[test]
    fn test_policy_document_shape() {
        let json = r#"{
            "id": "p-1",
            "name": "after-hours",
            "effect": "DENY",
            "rules": [{
                "condition": "OR",
                "conditions": [
                    {"attribute": "time.hour", "operator": "<", "value": 8},
                    {"attribute": "time.hour", "operator": ">", "value": 18}
                ]
            }]
        }"#;
        let policy: Policy = serde_json::from_str(json).unwrap();
        let preset = Policy::deny_outside_hours("p-1", 8, 18);
        assert_eq!(policy.effect, Effect::Deny);
        assert_eq!(policy.rules, preset.rules);
        assert!(policy.description.is_empty());
        assert!(policy.created_at.is_none());
    }

    #[test]
    fn test_unknown_tokens_survive_deserialization() {
        let json = r#"{
            "id": "p-2",
            "name": "odd",
            "effect": "AUDIT",
            "rules": [{
                "condition": "XOR",
                "conditions": [
                    {"attribute": "department", "operator": "LIKE", "value": "fin%"}
                ]
            }]
        }"#;
        let policy: Policy = serde_json::from_str(json).unwrap();
        assert_eq!(policy.effect, Effect::Unknown("AUDIT".to_string()));
        assert_eq!(policy.unknown_tokens(), vec![
            r#"effect "AUDIT""#.to_string(),
            r#"combinator "XOR""#.to_string(),
            r#"operator "LIKE""#.to_string(),
        ]);
    }

    #[test]
    fn test_list_condition_value() {
        let json = r#"{"attribute": "department", "operator": "IN", "value": ["hr", "legal", 7]}"#;
        let condition: Condition = serde_json::from_str(json).unwrap();
        assert_eq!(
            condition.value,
            ConditionValue::List(vec![
                AttributeValue::from("hr"),
                AttributeValue::from("legal"),
                AttributeValue::from(7),
            ])
        );
    }

    #[test]
    fn test_effect_serializes_as_token() {
        let json = serde_json::to_string(&Effect::Allow).unwrap();
        assert_eq!(json, r#""ALLOW""#);
    }
}
