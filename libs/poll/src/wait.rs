//! The condition poller.

use std::future;

use optest_cluster::{Fetch, FetchError, ResourceRef};
use tokio::sync::watch;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::error::{ConditionError, WaitError, WaitErrorKind};
use crate::observed::Observed;
use crate::policy::PollPolicy;

/// Outcome of one predicate evaluation.
#[derive(Debug)]
pub enum Verdict {
    /// Not converged yet; keep polling. Includes the ordinary
    /// "not found while waiting for creation" case.
    Pending,

    /// The condition holds.
    Converged,

    /// The condition can never hold; stop immediately.
    Fail(ConditionError),
}

/// Result of one wait: the last observation either way.
pub type WaitResult<T> = Result<Observed<T>, WaitError<T>>;

/// Poll `api` until `predicate` reports convergence, a fatal error, or
/// `policy.timeout()` elapses.
///
/// Each probe fetches the resource and hands the outcome, state or fetch
/// error, to the predicate. A [`Verdict::Pending`] keeps the loop alive;
/// [`Verdict::Converged`] returns the observation; [`Verdict::Fail`]
/// terminates at that probe with exactly that error. The deadline yields
/// the distinct [`WaitErrorKind::Timeout`]. On every terminal path the
/// last observation rides along for diagnostics.
///
/// The call blocks its caller for up to the timeout; independent waits on
/// different resources may run concurrently, each with private loop state.
/// `condition` is a human-readable label used in logs and error messages.
pub async fn wait_for<T, A, P>(
    api: &A,
    resource: &ResourceRef,
    condition: &str,
    predicate: P,
    policy: PollPolicy,
) -> WaitResult<T>
where
    A: Fetch<T> + ?Sized,
    P: FnMut(Result<&T, &FetchError>) -> Verdict,
{
    wait_inner(api, resource, condition, predicate, policy, None).await
}

/// Like [`wait_for`], but aborts with [`WaitErrorKind::Cancelled`] as soon
/// as `cancel` observes `true`, so a test runner can reclaim hung polls.
pub async fn wait_for_cancellable<T, A, P>(
    api: &A,
    resource: &ResourceRef,
    condition: &str,
    predicate: P,
    policy: PollPolicy,
    cancel: watch::Receiver<bool>,
) -> WaitResult<T>
where
    A: Fetch<T> + ?Sized,
    P: FnMut(Result<&T, &FetchError>) -> Verdict,
{
    wait_inner(api, resource, condition, predicate, policy, Some(cancel)).await
}

async fn wait_inner<T, A, P>(
    api: &A,
    resource: &ResourceRef,
    condition: &str,
    mut predicate: P,
    policy: PollPolicy,
    mut cancel: Option<watch::Receiver<bool>>,
) -> WaitResult<T>
where
    A: Fetch<T> + ?Sized,
    P: FnMut(Result<&T, &FetchError>) -> Verdict,
{
    let start = Instant::now();
    let deadline = time::sleep(policy.timeout());
    tokio::pin!(deadline);

    let mut ticker = if policy.is_immediate() {
        time::interval(policy.interval())
    } else {
        time::interval_at(start + policy.interval(), policy.interval())
    };
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut last: Observed<T> = Observed::none();

    loop {
        tokio::select! {
            biased;

            // The deadline never preempts the first probe: a delayed
            // policy with timeout == interval still observes the target
            // once before reporting Timeout.
            _ = &mut deadline, if last.attempts > 0 => {
                let elapsed = start.elapsed();
                warn!(resource = %resource, condition, attempts = last.attempts, "wait timed out");
                return Err(fail(resource, condition, WaitErrorKind::Timeout { elapsed }, last));
            }

            _ = cancelled(cancel.as_mut()) => {
                warn!(resource = %resource, condition, attempts = last.attempts, "wait cancelled");
                return Err(fail(resource, condition, WaitErrorKind::Cancelled, last));
            }

            _ = ticker.tick() => {
                let probe = api.fetch(resource).await;
                let verdict = predicate(probe.as_ref());
                last = Observed::from_probe(probe, last.attempts + 1, start.elapsed());

                match verdict {
                    Verdict::Converged => {
                        info!(
                            resource = %resource,
                            condition,
                            attempts = last.attempts,
                            elapsed_ms = last.elapsed.as_millis() as u64,
                            "condition reached"
                        );
                        return Ok(last);
                    }
                    Verdict::Fail(err) => {
                        warn!(resource = %resource, condition, error = %err, "condition can no longer be met");
                        return Err(fail(resource, condition, WaitErrorKind::Condition(err), last));
                    }
                    Verdict::Pending => {
                        debug!(resource = %resource, condition, attempts = last.attempts, "condition not met yet");
                    }
                }
            }
        }
    }
}

fn fail<T>(
    resource: &ResourceRef,
    condition: &str,
    kind: WaitErrorKind,
    last: Observed<T>,
) -> WaitError<T> {
    WaitError {
        resource: resource.clone(),
        condition: condition.to_owned(),
        kind,
        last,
    }
}

/// Resolves once the token observes `true`; never resolves without a token
/// or after the sender side is dropped unsignalled.
async fn cancelled(cancel: Option<&mut watch::Receiver<bool>>) {
    match cancel {
        Some(rx) => loop {
            if *rx.borrow() {
                return;
            }
            if rx.changed().await.is_err() {
                future::pending::<()>().await;
            }
        },
        None => future::pending().await,
    }
}
