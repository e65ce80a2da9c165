//! Errors surfaced by the access-control facade.

use gatekeep_types::StoreError;
use thiserror::Error;

/// An access check that could not be decided.
///
/// Distinct from a denial: `Ok(false)` means "not permitted", `Err` means the
/// engine could not reach a data source and made no decision.
#[derive(Debug, Error)]
pub enum AccessError {
    /// The role store failed during the RBAC check.
    #[error("role lookup failed: {0}")]
    RoleStore(#[source] StoreError),

    /// The policy store failed during the ABAC check.
    #[error("policy lookup failed: {0}")]
    PolicyStore(#[source] StoreError),

    /// The request could not be encoded as a cache key.
    #[error("failed to encode decision key: {0}")]
    KeyEncoding(#[source] serde_json::Error),
}

/// Result type for access checks.
pub type Result<T> = std::result::Result<T, AccessError>;
