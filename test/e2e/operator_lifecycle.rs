//! End-to-end operator lifecycle test.
//!
//! This test validates the complete harness flow against the in-memory
//! fake cluster, with a background task standing in for the operator
//! lifecycle machinery:
//!
//! 1. Subscribe and wait for the operator to install
//! 2. Wait for the derived addon to become ready
//! 3. Observe pipeline runs converging in the target namespace
//! 4. Upgrade through a channel switch
//! 5. Uninstall and verify nothing is left behind
//!
//! ## Running
//!
//! ```bash
//! cargo test -p optest-e2e --test operator_lifecycle
//! ```

use std::sync::Arc;
use std::time::Duration;

use optest_cluster::{
    Addon, AddonStatus, Cluster, ClusterServiceVersion, ConditionStatus, CsvPhase, CsvStatus,
    ObjectMeta, ResourceKind, ResourceRef, Run, RunOutcome, RunStatus, StatusCondition,
};
use optest_harness::config::HarnessConfig;
use optest_harness::{assertions, olm, operator, runs};
use optest_poll::{conditions, wait_for, PollPolicy};
use optest_testing::{init_logging, FakeCluster};

const CSV_NAME: &str = "pipelines-operator.v1.2.0";
const ADDON_NAME: &str = "pipeline";

/// Stand-in for the operator lifecycle machinery: resolve the
/// subscription to a CSV, let the CSV install, then materialize a ready
/// addon in the target namespace.
fn spawn_operator(cluster: Arc<FakeCluster>, cfg: HarnessConfig) {
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(20)).await;
        cluster
            .subscriptions
            .mutate(&cfg.subscription, &cfg.operators_namespace, |sub| {
                sub.status.installed_csv = Some(CSV_NAME.to_owned());
            });
        cluster.csvs.insert(ClusterServiceVersion {
            meta: ObjectMeta::new(CSV_NAME, &cfg.operators_namespace),
            status: CsvStatus::default(),
        });

        tokio::time::sleep(Duration::from_secs(40)).await;
        cluster
            .csvs
            .mutate(CSV_NAME, &cfg.operators_namespace, |csv| {
                csv.status.phase = CsvPhase::Succeeded;
            });

        tokio::time::sleep(Duration::from_secs(10)).await;
        cluster.addons.insert(Addon {
            meta: ObjectMeta::new(ADDON_NAME, &cfg.target_namespace),
            status: AddonStatus::default(),
        });

        tokio::time::sleep(Duration::from_secs(15)).await;
        cluster
            .addons
            .mutate(ADDON_NAME, &cfg.target_namespace, |addon| {
                addon.status.conditions = vec![
                    StatusCondition::new("InstallSucceeded", ConditionStatus::True),
                    StatusCondition::new("Ready", ConditionStatus::True),
                ];
            });
    });
}

/// Stand-in for the pipeline controller: complete a run some time after
/// it appears.
fn spawn_run_controller(cluster: Arc<FakeCluster>, cfg: HarnessConfig, name: &'static str) {
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(3)).await;
        cluster.runs.insert(Run {
            meta: ObjectMeta::new(name, &cfg.target_namespace),
            status: RunStatus::default(),
        });

        tokio::time::sleep(Duration::from_secs(5)).await;
        cluster.runs.mutate(name, &cfg.target_namespace, |run| {
            run.status.conditions =
                vec![StatusCondition::new("Succeeded", ConditionStatus::True)];
        });
    });
}

#[tokio::test(start_paused = true)]
async fn install_observe_upgrade_uninstall() {
    init_logging();
    let cluster = Arc::new(FakeCluster::new());
    let cfg = HarnessConfig::defaults();

    // Install.
    spawn_operator(cluster.clone(), cfg.clone());
    let sub = assertions::no_error(
        olm::subscribe_and_wait_ready(cluster.as_ref(), &cfg).await,
        "subscribing to the operator",
    );
    assert_eq!(sub.installed_csv(), Some(CSV_NAME));

    // Derived addon converges.
    let addon = assertions::no_error(
        operator::wait_for_addon_ready(cluster.as_ref(), &cfg, ADDON_NAME).await,
        "waiting for the addon",
    );
    assert!(addon.is_installed());

    // Pipeline runs converge in the target namespace.
    spawn_run_controller(cluster.clone(), cfg.clone(), "build-1");
    let run = assertions::no_error(
        runs::wait_for_run(cluster.as_ref(), &cfg.target_namespace, "build-1", RunOutcome::Succeeded)
            .await,
        "waiting for the run",
    );
    assert!(run.is_succeeded());
    assertions::no_error(
        runs::wait_for_run_count(cluster.as_ref(), &cfg.target_namespace, 1, PollPolicy::RUN)
            .await,
        "counting runs",
    );
    assertions::no_error(
        runs::ensure_no_new_runs(cluster.as_ref(), &cfg.target_namespace, Duration::from_secs(30))
            .await,
        "verifying run quiescence",
    );

    // Upgrade: the same two waits as install, driven by a channel switch.
    {
        let cluster = cluster.clone();
        let cfg = cfg.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(25)).await;
            cluster
                .csvs
                .mutate(CSV_NAME, &cfg.operators_namespace, |csv| {
                    csv.status.phase = CsvPhase::Succeeded;
                });
        });
    }
    let upgraded = assertions::no_error(
        olm::update_channel_and_wait_ready(cluster.as_ref(), &cfg, "preview").await,
        "upgrading the operator",
    );
    assert_eq!(upgraded.spec.channel, "preview");

    // Explicit cleanup; nothing rolls back on its own.
    assertions::no_error(
        olm::uninstall(cluster.as_ref(), &cfg).await,
        "uninstalling the operator",
    );
    assert!(cluster.subscriptions.is_empty());
    assert!(cluster.csvs.is_empty());
}

#[tokio::test(start_paused = true)]
async fn stage_failure_carries_the_last_observation() {
    init_logging();
    let cluster = Arc::new(FakeCluster::new());
    let cfg = HarnessConfig::defaults();

    // Subscription resolves, but the CSV sticks in Installing; drive the
    // CSV wait directly with a short policy so the test stays brisk.
    let mut sub = olm::subscription(&cfg);
    sub.status.installed_csv = Some(CSV_NAME.to_owned());
    cluster.subscriptions.insert(sub);
    cluster.csvs.insert(ClusterServiceVersion {
        meta: ObjectMeta::new(CSV_NAME, &cfg.operators_namespace),
        status: CsvStatus {
            phase: CsvPhase::Installing,
            reason: None,
        },
    });

    let csv_ref = ResourceRef::namespaced(
        ResourceKind::ClusterServiceVersion,
        CSV_NAME,
        &cfg.operators_namespace,
    );
    let err = wait_for(
        cluster.cluster_service_versions(),
        &csv_ref,
        "CSV phase Succeeded",
        conditions::when_present(|csv: &ClusterServiceVersion| csv.is_succeeded()),
        PollPolicy::new(Duration::from_secs(1), Duration::from_secs(5)).unwrap(),
    )
    .await
    .unwrap_err();

    assert!(err.is_timeout());
    let message = err.to_string();
    assert!(message.contains(CSV_NAME), "{message}");
    assert!(message.contains("Installing"), "{message}");
}

#[tokio::test(start_paused = true)]
async fn run_that_fails_aborts_the_scenario_quickly() {
    init_logging();
    let cluster = Arc::new(FakeCluster::new());
    let cfg = HarnessConfig::defaults();

    cluster.runs.insert(Run {
        meta: ObjectMeta::new("build-1", &cfg.target_namespace),
        status: RunStatus {
            conditions: vec![StatusCondition::new("Succeeded", ConditionStatus::False)],
            completion_time: None,
        },
    });

    let started = tokio::time::Instant::now();
    let err = runs::wait_for_run(
        cluster.as_ref(),
        &cfg.target_namespace,
        "build-1",
        RunOutcome::Succeeded,
    )
    .await
    .unwrap_err();

    // Fatal mismatch, detected on the first probe rather than timed out.
    assert_eq!(started.elapsed(), Duration::ZERO);
    assert!(format!("{err:#}").contains("completed as Failed"), "{err:#}");
}
