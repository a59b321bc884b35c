//! The last observation of a polled resource.

use std::fmt;
use std::time::Duration;

use optest_cluster::FetchError;
use serde::Serialize;

/// The most recent probe of one in-flight poll.
///
/// Overwritten on every attempt; exactly one exists per poll and it is
/// handed back by value on every terminal path, success or not, so that
/// callers can build diagnostics without re-fetching.
#[derive(Debug, Clone)]
pub struct Observed<T> {
    /// Representation from the last successful fetch, if any.
    pub state: Option<T>,

    /// Fetch error from the last attempt, if it failed.
    pub error: Option<FetchError>,

    /// Number of probes performed so far.
    pub attempts: u32,

    /// Elapsed wait time at the last probe.
    pub elapsed: Duration,
}

impl<T> Observed<T> {
    pub(crate) fn none() -> Self {
        Self {
            state: None,
            error: None,
            attempts: 0,
            elapsed: Duration::ZERO,
        }
    }

    pub(crate) fn from_probe(
        probe: Result<T, FetchError>,
        attempts: u32,
        elapsed: Duration,
    ) -> Self {
        let (state, error) = match probe {
            Ok(state) => (Some(state), None),
            Err(err) => (None, Some(err)),
        };
        Self {
            state,
            error,
            attempts,
            elapsed,
        }
    }

    /// Consume the observation, yielding the last fetched state.
    pub fn into_state(self) -> Option<T> {
        self.state
    }
}

impl<T: Serialize> fmt::Display for Observed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.state, &self.error) {
            (Some(state), _) => match serde_json::to_string(state) {
                Ok(json) => f.write_str(&json),
                Err(_) => f.write_str("<unrenderable state>"),
            },
            (None, Some(err)) => write!(f, "fetch failed: {err}"),
            (None, None) => f.write_str("nothing observed"),
        }
    }
}
