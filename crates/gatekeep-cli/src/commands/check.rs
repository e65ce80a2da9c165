//! Check command - evaluate one access request.

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use gatekeep::{AccessControl, Decision, Fixture};
use gatekeep_config::GatekeepConfig;
use gatekeep_types::{ActorId, Attribute, AttributeValue, ManualClock};
use std::path::Path;

pub struct CheckArgs<'a> {
    pub config: &'a GatekeepConfig,
    pub fixture: &'a Path,
    pub actor: &'a str,
    pub resource: &'a str,
    pub action: &'a str,
    pub attrs: &'a [String],
    pub at: Option<&'a str>,
}

/// Runs the check and prints the decision. Returns whether access is allowed.
pub fn run(args: &CheckArgs<'_>) -> Result<bool> {
    let fixture = Fixture::load(args.fixture)
        .with_context(|| format!("Failed to load fixture {}", args.fixture.display()))?;

    let context = args
        .attrs
        .iter()
        .map(|raw| parse_attribute(raw))
        .collect::<Result<Vec<_>>>()?;

    let now = match args.at {
        Some(raw) => parse_instant(raw)?,
        None => Utc::now(),
    };

    let (roles, policies) = fixture.into_repositories();
    let engine = AccessControl::builder(roles, policies)
        .config(args.config)?
        .clock(ManualClock::new(now))
        .build();

    let decision = engine.evaluate(
        &ActorId::from(args.actor),
        args.resource,
        args.action,
        &context,
    )?;

    print_decision(&decision);
    Ok(decision.allowed)
}

fn print_decision(decision: &Decision) {
    println!("{}", if decision.allowed { "ALLOW" } else { "DENY" });
    if let Some(rbac) = decision.rbac_allowed {
        println!("  rbac: {}", verdict(rbac));
    }
    if let Some(abac) = decision.abac_allowed {
        println!("  abac: {}", verdict(abac));
    }
}

fn verdict(allowed: bool) -> &'static str {
    if allowed { "allow" } else { "deny" }
}

fn parse_instant(raw: &str) -> Result<DateTime<Utc>> {
    let instant = DateTime::parse_from_rfc3339(raw)
        .with_context(|| format!("Invalid --at timestamp '{raw}' (expected RFC 3339)"))?;
    Ok(instant.with_timezone(&Utc))
}

/// Parses `key=value`. The value is a bool, else a finite number, else a string.
pub fn parse_attribute(raw: &str) -> Result<Attribute> {
    let Some((key, value)) = raw.split_once('=') else {
        bail!("Invalid attribute '{raw}' (expected key=value)");
    };
    let key = key.trim();
    if key.is_empty() {
        bail!("Invalid attribute '{raw}' (empty key)");
    }

    let value = match value {
        "true" => AttributeValue::Bool(true),
        "false" => AttributeValue::Bool(false),
        other => match other.parse::<f64>() {
            Ok(number) if number.is_finite() => AttributeValue::Number(number),
            _ => AttributeValue::String(other.to_string()),
        },
    };

    Ok(Attribute::new(key, value))
}
