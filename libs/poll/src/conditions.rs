//! Named condition constructors.
//!
//! "Not found" plays two roles in an eventually-consistent cluster: it is
//! an ordinary transient miss while waiting for a resource to appear, and
//! it is the goal state while verifying deletion. Ad-hoc predicates that
//! conflate the two can loop forever on an error they should surface, so
//! the choice is made here, by name: [`present`] and [`when_present`]
//! treat every fetch error as a transient miss, [`absent`] treats
//! not-found as convergence and anything else as fatal.

use optest_cluster::FetchError;

use crate::error::ConditionError;
use crate::wait::Verdict;

/// Converges as soon as the resource can be fetched.
pub fn present<T>() -> impl FnMut(Result<&T, &FetchError>) -> Verdict {
    |probe| match probe {
        Ok(_) => Verdict::Converged,
        Err(_) => Verdict::Pending,
    }
}

/// Converges when the resource can be fetched and `accept` holds for it.
///
/// Every fetch error, not-found included, is a transient miss: the target
/// legitimately does not exist until some point in the loop, so this can
/// express "wait for creation" as well as "wait for a status field".
pub fn when_present<T, F>(mut accept: F) -> impl FnMut(Result<&T, &FetchError>) -> Verdict
where
    F: FnMut(&T) -> bool,
{
    move |probe| match probe {
        Ok(state) if accept(state) => Verdict::Converged,
        Ok(_) | Err(_) => Verdict::Pending,
    }
}

/// Converges once fetching reports not-found.
///
/// Any other fetch error is fatal: the poller cannot tell whether the
/// resource is gone, and looping further would only hide the failure
/// behind a timeout.
pub fn absent<T>() -> impl FnMut(Result<&T, &FetchError>) -> Verdict {
    |probe| match probe {
        Err(err) if err.is_not_found() => Verdict::Converged,
        Err(err) => Verdict::Fail(ConditionError::Fetch(err.clone())),
        Ok(_) => Verdict::Pending,
    }
}
