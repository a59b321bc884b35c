//! Test-failure surface.
//!
//! The harness signals scenario failure by panicking with the poller's
//! formatted message; the enclosing test runner records the panic and
//! moves on to the next scenario rather than aborting the run.

use std::fmt;

use optest_poll::{Observed, WaitResult};
use serde::Serialize;

/// Unwrap a wait outcome, failing the scenario on error.
///
/// The panic message is the poller's own: resource, expected condition,
/// and the last observed representation.
#[track_caller]
pub fn converged<T: fmt::Debug + Serialize>(outcome: WaitResult<T>) -> Observed<T> {
    match outcome {
        Ok(observed) => observed,
        Err(err) => panic!("{err}"),
    }
}

/// Fail the scenario when an orchestration step errored.
#[track_caller]
pub fn no_error<T>(result: anyhow::Result<T>, step: &str) -> T {
    match result {
        Ok(value) => value,
        Err(err) => panic!("{step}: {err:#}"),
    }
}
