//! Operator lifecycle orchestration over the subscription mechanism.
//!
//! Install and upgrade are the same two-stage wait: first for the
//! subscription to reference an installed CSV, then for that CSV to reach
//! the `Succeeded` phase. Stages are strictly sequential and a failing
//! stage aborts the workflow with its own error.

use anyhow::{Context, Result};
use optest_cluster::{
    Cluster, Fetch, InstallApproval, ObjectMeta, ResourceClient, ResourceKind, ResourceRef,
    Subscription, SubscriptionSpec, SubscriptionStatus,
};
use optest_poll::{conditions, wait_for, PollPolicy};
use tracing::info;

use crate::config::HarnessConfig;
use crate::predicates;

/// Build the subscription that installs the operator under test.
pub fn subscription(cfg: &HarnessConfig) -> Subscription {
    Subscription {
        meta: ObjectMeta::new(&cfg.subscription, &cfg.operators_namespace),
        spec: SubscriptionSpec {
            package: cfg.subscription.clone(),
            channel: cfg.channel.clone(),
            catalog_source: cfg.catalog_source.clone(),
            catalog_source_namespace: cfg.marketplace_namespace.clone(),
            install_plan_approval: InstallApproval::Automatic,
        },
        status: SubscriptionStatus::default(),
    }
}

fn subscription_ref(cfg: &HarnessConfig) -> ResourceRef {
    ResourceRef::namespaced(
        ResourceKind::Subscription,
        &cfg.subscription,
        &cfg.operators_namespace,
    )
}

/// Install the operator and block until it is fully ready.
pub async fn subscribe_and_wait_ready(
    cluster: &dyn Cluster,
    cfg: &HarnessConfig,
) -> Result<Subscription> {
    cluster
        .subscriptions()
        .create(subscription(cfg))
        .await
        .with_context(|| format!("creating subscription {}", cfg.subscription))?;
    wait_until_operator_ready(cluster, cfg).await
}

/// Switch the subscription to `channel` and block until the upgraded
/// operator is ready.
pub async fn update_channel_and_wait_ready(
    cluster: &dyn Cluster,
    cfg: &HarnessConfig,
    channel: &str,
) -> Result<Subscription> {
    let sub_ref = subscription_ref(cfg);
    let mut sub = cluster
        .subscriptions()
        .fetch(&sub_ref)
        .await
        .with_context(|| format!("fetching {sub_ref}"))?;
    sub.spec.channel = channel.to_owned();
    cluster
        .subscriptions()
        .update(sub)
        .await
        .with_context(|| format!("updating channel on {sub_ref}"))?;
    wait_until_operator_ready(cluster, cfg).await
}

async fn wait_until_operator_ready(
    cluster: &dyn Cluster,
    cfg: &HarnessConfig,
) -> Result<Subscription> {
    let sub_ref = subscription_ref(cfg);
    let observed = wait_for(
        cluster.subscriptions(),
        &sub_ref,
        "installed CSV reference present",
        conditions::when_present(predicates::installed_csv_present),
        PollPolicy::SUBSCRIPTION,
    )
    .await?;

    let sub = observed
        .into_state()
        .context("subscription converged without state")?;
    let csv_name = sub
        .installed_csv()
        .context("installed CSV name missing after convergence")?
        .to_owned();

    let csv_ref = ResourceRef::namespaced(
        ResourceKind::ClusterServiceVersion,
        &csv_name,
        &cfg.operators_namespace,
    );
    wait_for(
        cluster.cluster_service_versions(),
        &csv_ref,
        "CSV phase Succeeded",
        conditions::when_present(predicates::csv_succeeded),
        PollPolicy::SLOW,
    )
    .await?;

    info!(subscription = %cfg.subscription, csv = %csv_name, "operator ready");
    Ok(sub)
}

/// Remove the operator install: every CSV and subscription in the
/// operators namespace, then wait until the subscription is really gone.
///
/// Never runs implicitly; scenarios invoke it when they are done.
pub async fn uninstall(cluster: &dyn Cluster, cfg: &HarnessConfig) -> Result<()> {
    let sub_ref = subscription_ref(cfg);
    cluster
        .cluster_service_versions()
        .delete_all(&cfg.operators_namespace)
        .await
        .context("deleting cluster service versions")?;
    cluster
        .subscriptions()
        .delete_all(&cfg.operators_namespace)
        .await
        .context("deleting subscriptions")?;

    wait_for(
        cluster.subscriptions(),
        &sub_ref,
        "subscription removed",
        conditions::absent(),
        PollPolicy::SUBSCRIPTION,
    )
    .await?;

    info!(subscription = %cfg.subscription, "operator uninstalled");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use optest_cluster::{ClusterServiceVersion, CsvPhase, CsvStatus};
    use optest_testing::FakeCluster;

    use super::*;

    const CSV_NAME: &str = "pipelines-operator.v1.2.0";

    /// Drive the fake the way the operator-lifecycle machinery would:
    /// resolve the subscription to a CSV, then let the CSV install.
    fn simulate_install(cluster: Arc<FakeCluster>, cfg: HarnessConfig, phase: CsvPhase) {
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(15)).await;
            cluster
                .subscriptions
                .mutate(&cfg.subscription, &cfg.operators_namespace, |sub| {
                    sub.status.installed_csv = Some(CSV_NAME.to_owned());
                });
            cluster.csvs.insert(ClusterServiceVersion {
                meta: ObjectMeta::new(CSV_NAME, &cfg.operators_namespace),
                status: CsvStatus::default(),
            });

            tokio::time::sleep(Duration::from_secs(30)).await;
            cluster.csvs.mutate(CSV_NAME, &cfg.operators_namespace, |csv| {
                csv.status.phase = phase;
            });
        });
    }

    #[tokio::test(start_paused = true)]
    async fn subscribe_waits_through_both_stages() {
        let cluster = Arc::new(FakeCluster::new());
        let cfg = HarnessConfig::defaults();
        simulate_install(cluster.clone(), cfg.clone(), CsvPhase::Succeeded);

        let sub = subscribe_and_wait_ready(cluster.as_ref(), &cfg)
            .await
            .unwrap();
        assert_eq!(sub.installed_csv(), Some(CSV_NAME));
    }

    #[tokio::test(start_paused = true)]
    async fn upgrade_reuses_the_install_waits() {
        let cluster = Arc::new(FakeCluster::new());
        let cfg = HarnessConfig::defaults();

        // Installed operator from a previous scenario.
        let mut sub = subscription(&cfg);
        sub.status.installed_csv = Some(CSV_NAME.to_owned());
        cluster.subscriptions.insert(sub);
        cluster.csvs.insert(ClusterServiceVersion {
            meta: ObjectMeta::new(CSV_NAME, &cfg.operators_namespace),
            status: CsvStatus {
                phase: CsvPhase::Succeeded,
                reason: None,
            },
        });

        let sub = update_channel_and_wait_ready(cluster.as_ref(), &cfg, "preview")
            .await
            .unwrap();
        assert_eq!(sub.spec.channel, "preview");
        // One update write; the waits themselves never mutate.
        assert_eq!(cluster.subscriptions.writes(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn uninstall_waits_for_subscription_absence() {
        let cluster = Arc::new(FakeCluster::new());
        let cfg = HarnessConfig::defaults();
        cluster.subscriptions.insert(subscription(&cfg));
        cluster.csvs.insert(ClusterServiceVersion {
            meta: ObjectMeta::new(CSV_NAME, &cfg.operators_namespace),
            status: CsvStatus {
                phase: CsvPhase::Succeeded,
                reason: None,
            },
        });

        uninstall(cluster.as_ref(), &cfg).await.unwrap();
        assert!(cluster.subscriptions.is_empty());
        assert!(cluster.csvs.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_waits_against_a_converged_cluster_are_idempotent() {
        let cluster = Arc::new(FakeCluster::new());
        let cfg = HarnessConfig::defaults();
        let mut sub = subscription(&cfg);
        sub.status.installed_csv = Some(CSV_NAME.to_owned());
        cluster.subscriptions.insert(sub);

        let sub_ref = subscription_ref(&cfg);
        for _ in 0..2 {
            let observed = wait_for(
                cluster.subscriptions(),
                &sub_ref,
                "installed CSV reference present",
                conditions::when_present(predicates::installed_csv_present),
                PollPolicy::SUBSCRIPTION,
            )
            .await
            .unwrap();
            assert_eq!(observed.attempts, 1);
        }
        assert_eq!(cluster.subscriptions.writes(), 0);
    }
}
