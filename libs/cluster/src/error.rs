//! Fetch-error classification.

use thiserror::Error;

use crate::types::ResourceRef;

/// Errors reported by a cluster accessor when fetching a resource.
///
/// Predicates branch on the classification, chiefly [`is_not_found`]:
/// while waiting for a resource to appear, not-found is an ordinary
/// transient miss, but while verifying deletion it is the goal state.
///
/// [`is_not_found`]: FetchError::is_not_found
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The resource does not exist (yet, or any more).
    #[error("{0} not found")]
    NotFound(ResourceRef),

    /// The caller is not allowed to read the resource.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Any other API failure (transport, serialization, server side).
    #[error("api error: {0}")]
    Api(String),
}

impl FetchError {
    /// Returns true if the error means the resource does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
