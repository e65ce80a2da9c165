//! Validate command - lint a fixture.

use anyhow::{Context, Result};
use gatekeep::Fixture;
use std::path::Path;

/// Prints a summary of the fixture. Returns `false` if it carries tokens the
/// engine does not recognize.
pub fn run(path: &Path) -> Result<bool> {
    let fixture = Fixture::load(path)
        .with_context(|| format!("Failed to load fixture {}", path.display()))?;

    println!("Fixture:     {}", path.display());
    println!("Actors:      {}", fixture.assignments.len());
    println!("Roles:       {}", fixture.role_count());
    println!("Policies:    {}", fixture.policies.len());

    let unknown = fixture.unknown_tokens();
    if unknown.is_empty() {
        println!("Status:      OK");
        return Ok(true);
    }

    println!("Status:      {} unrecognized token(s)", unknown.len());
    for (policy, token) in &unknown {
        println!("  policy {policy}: {token}");
    }
    Ok(false)
}
