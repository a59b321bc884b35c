//! Addon custom-resource orchestration.
//!
//! The operator under test materializes addon resources in the target
//! namespace; these workflows observe their lifecycle without ever driving
//! the reconciliation themselves.

use anyhow::{ensure, Context, Result};
use optest_cluster::{Addon, Cluster, ResourceClient, ResourceKind, ResourceRef};
use optest_poll::{conditions, wait_for, PollPolicy};
use tracing::info;

use crate::config::HarnessConfig;
use crate::predicates;

fn addon_ref(cfg: &HarnessConfig, name: &str) -> ResourceRef {
    ResourceRef::namespaced(ResourceKind::Addon, name, &cfg.target_namespace)
}

/// Wait until the addon exists and its `Ready` condition is true.
///
/// Existence is a separate stage so a failure distinguishes "never
/// created" from "created but never became ready".
pub async fn wait_for_addon_ready(
    cluster: &dyn Cluster,
    cfg: &HarnessConfig,
    name: &str,
) -> Result<Addon> {
    let addon_ref = addon_ref(cfg, name);
    wait_for(
        cluster.addons(),
        &addon_ref,
        "addon created",
        conditions::present(),
        PollPolicy::SLOW,
    )
    .await?;

    let observed = wait_for(
        cluster.addons(),
        &addon_ref,
        "addon Ready condition true",
        conditions::when_present(predicates::addon_ready),
        PollPolicy::SLOW,
    )
    .await?;

    info!(addon = name, "addon ready");
    observed.into_state().context("addon converged without state")
}

/// Wait until the addon reports `InstallSucceeded`.
pub async fn wait_for_addon_installed(
    cluster: &dyn Cluster,
    cfg: &HarnessConfig,
    name: &str,
) -> Result<Addon> {
    let addon_ref = addon_ref(cfg, name);
    let observed = wait_for(
        cluster.addons(),
        &addon_ref,
        "addon InstallSucceeded condition true",
        conditions::when_present(predicates::addon_installed),
        PollPolicy::SLOW,
    )
    .await?;
    observed.into_state().context("addon converged without state")
}

/// Delete the addon, wait until it is gone, and verify nothing of its
/// kind remains in the target namespace.
pub async fn delete_addon_and_wait(
    cluster: &dyn Cluster,
    cfg: &HarnessConfig,
    name: &str,
) -> Result<()> {
    let addon_ref = addon_ref(cfg, name);
    cluster
        .addons()
        .delete(&addon_ref)
        .await
        .with_context(|| format!("deleting {addon_ref}"))?;

    wait_for(
        cluster.addons(),
        &addon_ref,
        "addon removed",
        conditions::absent(),
        PollPolicy::SLOW,
    )
    .await?;

    let leftovers = cluster
        .addons()
        .list(&cfg.target_namespace)
        .await
        .context("listing addons after delete")?;
    ensure!(
        leftovers.is_empty(),
        "addons remain after delete: {}",
        leftovers
            .iter()
            .map(|a| a.meta.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    info!(addon = name, "addon deleted");
    Ok(())
}
