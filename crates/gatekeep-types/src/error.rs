//! Errors reported by external role and policy stores.

use thiserror::Error;

/// Failure of a role or policy store.
///
/// Store failures are never converted into a decision. They surface to the
/// caller of the access check unchanged.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The store was reached but the lookup did not complete in time.
    #[error("store lookup timed out: {0}")]
    Timeout(String),

    /// The store returned an error of its own.
    #[error("store backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    /// Wraps a backend-specific error.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        StoreError::Backend(Box::new(err))
    }
}
