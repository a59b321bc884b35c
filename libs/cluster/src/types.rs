//! Typed representations of the resources the harness observes.
//!
//! These mirror the shapes served by the cluster API, trimmed to the
//! fields the predicates and orchestrators read. All of them are plain
//! data: status interpretation lives in small helpers here, polling
//! mechanics live in `optest-poll`.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Resource kinds the harness knows how to watch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    Subscription,
    ClusterServiceVersion,
    Addon,
    Run,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Subscription => "subscription",
            Self::ClusterServiceVersion => "clusterserviceversion",
            Self::Addon => "addon",
            Self::Run => "run",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies one resource, or a whole collection, to watch.
///
/// Immutable for the duration of a poll. The collection form (empty name)
/// is used for list-based waits such as "N runs present".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceRef {
    pub kind: ResourceKind,
    pub name: String,
    pub namespace: String,
}

impl ResourceRef {
    /// Reference to a single named resource.
    pub fn namespaced(
        kind: ResourceKind,
        name: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            name: name.into(),
            namespace: namespace.into(),
        }
    }

    /// Reference to every resource of `kind` in `namespace`.
    pub fn collection(kind: ResourceKind, namespace: impl Into<String>) -> Self {
        Self {
            kind,
            name: String::new(),
            namespace: namespace.into(),
        }
    }

    pub fn is_collection(&self) -> bool {
        self.name.is_empty()
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_collection() {
            write!(f, "all {}s in {}", self.kind, self.namespace)
        } else {
            write!(f, "{} {}/{}", self.kind, self.namespace, self.name)
        }
    }
}

/// Minimal object metadata the harness reads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectMeta {
    pub name: String,
    pub namespace: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_timestamp: Option<DateTime<Utc>>,
}

impl ObjectMeta {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            ..Default::default()
        }
    }
}

/// Access to the metadata shared by every representation.
pub trait ResourceMeta {
    const KIND: ResourceKind;

    fn meta(&self) -> &ObjectMeta;

    fn resource_ref(&self) -> ResourceRef {
        ResourceRef::namespaced(Self::KIND, &self.meta().name, &self.meta().namespace)
    }
}

/// Install plan approval mode on a subscription.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstallApproval {
    #[default]
    Automatic,
    Manual,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionSpec {
    pub package: String,
    pub channel: String,
    pub catalog_source: String,
    pub catalog_source_namespace: String,
    #[serde(default)]
    pub install_plan_approval: InstallApproval,
}

/// Placeholder the API serves before an installed CSV reference exists.
pub const INSTALLED_CSV_NONE: &str = "<none>";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installed_csv: Option<String>,
}

/// Subscribes the cluster to an operator package from a catalog source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub meta: ObjectMeta,
    pub spec: SubscriptionSpec,
    #[serde(default)]
    pub status: SubscriptionStatus,
}

impl Subscription {
    /// Name of the installed CSV, treating the empty string and the
    /// `"<none>"` placeholder as absent.
    pub fn installed_csv(&self) -> Option<&str> {
        match self.status.installed_csv.as_deref() {
            None | Some("") | Some(INSTALLED_CSV_NONE) => None,
            Some(name) => Some(name),
        }
    }
}

impl ResourceMeta for Subscription {
    const KIND: ResourceKind = ResourceKind::Subscription;

    fn meta(&self) -> &ObjectMeta {
        &self.meta
    }
}

/// Install phase of a cluster service version.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CsvPhase {
    #[default]
    Pending,
    Installing,
    Succeeded,
    Failed,
}

impl fmt::Display for CsvPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "Pending",
            Self::Installing => "Installing",
            Self::Succeeded => "Succeeded",
            Self::Failed => "Failed",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CsvStatus {
    #[serde(default)]
    pub phase: CsvPhase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Versioned install unit the subscription resolves to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterServiceVersion {
    pub meta: ObjectMeta,
    #[serde(default)]
    pub status: CsvStatus,
}

impl ClusterServiceVersion {
    pub fn is_succeeded(&self) -> bool {
        self.status.phase == CsvPhase::Succeeded
    }
}

impl ResourceMeta for ClusterServiceVersion {
    const KIND: ResourceKind = ResourceKind::ClusterServiceVersion;

    fn meta(&self) -> &ObjectMeta {
        &self.meta
    }
}

/// Tri-state value of a status condition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionStatus {
    True,
    False,
    #[default]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusCondition {
    #[serde(rename = "type")]
    pub condition_type: String,
    pub status: ConditionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl StatusCondition {
    pub fn new(condition_type: impl Into<String>, status: ConditionStatus) -> Self {
        Self {
            condition_type: condition_type.into(),
            status,
            reason: None,
        }
    }
}

fn condition<'a>(conditions: &'a [StatusCondition], kind: &str) -> Option<&'a StatusCondition> {
    conditions.iter().find(|c| c.condition_type == kind)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddonStatus {
    #[serde(default)]
    pub conditions: Vec<StatusCondition>,
}

/// Operator-managed addon custom resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Addon {
    pub meta: ObjectMeta,
    #[serde(default)]
    pub status: AddonStatus,
}

impl Addon {
    /// Aggregate readiness: the `Ready` condition is `True`.
    pub fn is_ready(&self) -> bool {
        condition(&self.status.conditions, "Ready")
            .is_some_and(|c| c.status == ConditionStatus::True)
    }

    /// The `InstallSucceeded` condition is `True`.
    pub fn is_installed(&self) -> bool {
        condition(&self.status.conditions, "InstallSucceeded")
            .is_some_and(|c| c.status == ConditionStatus::True)
    }
}

impl ResourceMeta for Addon {
    const KIND: ResourceKind = ResourceKind::Addon;

    fn meta(&self) -> &ObjectMeta {
        &self.meta
    }
}

/// Terminal outcome of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunOutcome {
    Succeeded,
    Failed,
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Succeeded => f.write_str("Succeeded"),
            Self::Failed => f.write_str("Failed"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStatus {
    #[serde(default)]
    pub conditions: Vec<StatusCondition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_time: Option<DateTime<Utc>>,
}

/// A pipeline or task run created in the target namespace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub meta: ObjectMeta,
    #[serde(default)]
    pub status: RunStatus,
}

impl Run {
    /// Terminal outcome, if the run has completed.
    ///
    /// The `Succeeded` condition is tri-state: `True` and `False` are
    /// terminal, `Unknown` (or no condition at all) means still running.
    pub fn outcome(&self) -> Option<RunOutcome> {
        match condition(&self.status.conditions, "Succeeded")?.status {
            ConditionStatus::True => Some(RunOutcome::Succeeded),
            ConditionStatus::False => Some(RunOutcome::Failed),
            ConditionStatus::Unknown => None,
        }
    }

    pub fn is_done(&self) -> bool {
        self.outcome().is_some()
    }

    pub fn is_succeeded(&self) -> bool {
        self.outcome() == Some(RunOutcome::Succeeded)
    }
}

impl ResourceMeta for Run {
    const KIND: ResourceKind = ResourceKind::Run;

    fn meta(&self) -> &ObjectMeta {
        &self.meta
    }
}
