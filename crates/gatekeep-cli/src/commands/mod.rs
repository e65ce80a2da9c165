//! CLI command implementations.
//!
//! Each command returns `Ok(true)` for a passing outcome and `Ok(false)` for
//! a failing one; `main` maps these to exit codes.

pub mod check;
pub mod validate;
