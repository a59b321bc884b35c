//! Domain predicates, one per resource condition.
//!
//! These are pure functions over a single observation; pairing them with
//! a poll policy happens at the orchestration call sites.

use optest_cluster::{Addon, ClusterServiceVersion, FetchError, Run, RunOutcome, Subscription};
use optest_poll::{ConditionError, Verdict};

/// The subscription references an installed CSV by name (the empty string
/// and the `"<none>"` placeholder do not count).
pub fn installed_csv_present(sub: &Subscription) -> bool {
    sub.installed_csv().is_some()
}

pub fn csv_succeeded(csv: &ClusterServiceVersion) -> bool {
    csv.is_succeeded()
}

pub fn addon_ready(addon: &Addon) -> bool {
    addon.is_ready()
}

pub fn addon_installed(addon: &Addon) -> bool {
    addon.is_installed()
}

/// Condition for a run reaching the `expected` terminal outcome.
///
/// A run that completes with the other outcome is a fatal mismatch: it can
/// never converge any more, so waiting out the timeout would only delay
/// the diagnosis. Fetch errors stay transient, as the run may not have
/// been created yet.
pub fn run_reached(expected: RunOutcome) -> impl FnMut(Result<&Run, &FetchError>) -> Verdict {
    move |probe| match probe {
        Ok(run) => match run.outcome() {
            Some(actual) if actual == expected => Verdict::Converged,
            Some(actual) => Verdict::Fail(ConditionError::Invalid(format!(
                "run {} completed as {actual}, expected {expected}",
                run.meta.name
            ))),
            None => Verdict::Pending,
        },
        Err(_) => Verdict::Pending,
    }
}
