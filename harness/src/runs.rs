//! Pipeline run observation in the target namespace.

use std::time::Duration;

use anyhow::{bail, ensure, Context, Result};
use async_trait::async_trait;
use optest_cluster::{
    Cluster, Fetch, FetchError, ResourceClient, ResourceKind, ResourceRef, Run, RunOutcome,
};
use optest_poll::{conditions, wait_for, PollPolicy};
use tracing::info;

use crate::predicates;

/// Adapts the per-resource client into a whole-namespace accessor so that
/// count conditions go through the same poller as everything else.
struct RunCollection<'a> {
    api: &'a dyn ResourceClient<Run>,
}

#[async_trait]
impl Fetch<Vec<Run>> for RunCollection<'_> {
    async fn fetch(&self, resource: &ResourceRef) -> Result<Vec<Run>, FetchError> {
        self.api.list(&resource.namespace).await
    }
}

/// Wait until the named run completes with `expected`.
pub async fn wait_for_run(
    cluster: &dyn Cluster,
    namespace: &str,
    name: &str,
    expected: RunOutcome,
) -> Result<Run> {
    let run_ref = ResourceRef::namespaced(ResourceKind::Run, name, namespace);
    let observed = wait_for(
        cluster.runs(),
        &run_ref,
        &format!("run {expected}"),
        predicates::run_reached(expected),
        PollPolicy::RUN,
    )
    .await?;

    info!(run = name, outcome = %expected, "run completed");
    observed.into_state().context("run converged without state")
}

/// Wait until exactly `count` runs exist in `namespace`.
///
/// Callers pick the pacing: `PollPolicy::RUN` fits runs created by the
/// scenario itself, longer policies fit counts that settle behind an
/// operator reconcile.
pub async fn wait_for_run_count(
    cluster: &dyn Cluster,
    namespace: &str,
    count: usize,
    policy: PollPolicy,
) -> Result<Vec<Run>> {
    let collection = RunCollection {
        api: cluster.runs(),
    };
    let all = ResourceRef::collection(ResourceKind::Run, namespace);
    let observed = wait_for(
        &collection,
        &all,
        &format!("{count} run(s) present"),
        conditions::when_present(move |runs: &Vec<Run>| runs.len() == count),
        policy,
    )
    .await?;
    observed.into_state().context("runs converged without state")
}

/// Verify that no run beyond the current ones appears in `namespace` for
/// `window`.
///
/// The poll is inverted: the "count grew" condition timing out is the
/// desired outcome, and convergence is the failure.
pub async fn ensure_no_new_runs(
    cluster: &dyn Cluster,
    namespace: &str,
    window: Duration,
) -> Result<()> {
    ensure!(!window.is_zero(), "observation window must be non-zero");
    let baseline = cluster
        .runs()
        .list(namespace)
        .await
        .context("listing runs for the baseline")?
        .len();

    let collection = RunCollection {
        api: cluster.runs(),
    };
    let all = ResourceRef::collection(ResourceKind::Run, namespace);
    let interval = Duration::from_secs(1).min(window);
    let policy = PollPolicy::new(interval, window)?;

    match wait_for(
        &collection,
        &all,
        "a new run appears",
        conditions::when_present(move |runs: &Vec<Run>| runs.len() > baseline),
        policy,
    )
    .await
    {
        Ok(observed) => bail!(
            "new run(s) appeared within {window:?}: {} present, baseline {baseline}",
            observed.state.map(|runs| runs.len()).unwrap_or_default()
        ),
        Err(err) if err.is_timeout() => {
            info!(namespace, baseline, "no new runs within the window");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}
