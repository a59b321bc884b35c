//! Terminal error taxonomy for waits.

use std::fmt;
use std::time::Duration;

use optest_cluster::{FetchError, ResourceRef};
use serde::Serialize;
use thiserror::Error;

use crate::observed::Observed;

/// Unrecoverable outcome reported by a predicate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConditionError {
    /// A fetch error the predicate cannot treat as a transient miss.
    #[error("unexpected fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// The observed state can never converge to the condition.
    #[error("{0}")]
    Invalid(String),
}

/// How a wait ended, short of converging.
///
/// Timeout and fatal condition errors are deliberately distinct kinds:
/// "never reached the state" and "errored while checking the state" are
/// logged and diagnosed differently.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WaitErrorKind {
    /// The deadline elapsed before the condition held.
    #[error("timed out after {elapsed:?}")]
    Timeout { elapsed: Duration },

    /// The predicate reported an unrecoverable condition.
    #[error("condition evaluation failed: {0}")]
    Condition(#[source] ConditionError),

    /// The caller's cancellation token fired.
    #[error("cancelled")]
    Cancelled,
}

/// A failed wait, always carrying the last observation for diagnostics.
#[derive(Debug)]
pub struct WaitError<T> {
    pub resource: ResourceRef,
    pub condition: String,
    pub kind: WaitErrorKind,
    pub last: Observed<T>,
}

impl<T> WaitError<T> {
    pub fn is_timeout(&self) -> bool {
        matches!(self.kind, WaitErrorKind::Timeout { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.kind, WaitErrorKind::Cancelled)
    }
}

impl<T: Serialize> fmt::Display for WaitError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "waiting for {:?} on {} failed: {}; last observed: {}",
            self.condition, self.resource, self.kind, self.last
        )
    }
}

impl<T: fmt::Debug + Serialize> std::error::Error for WaitError<T> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}
