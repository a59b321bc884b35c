//! Harness configuration.
//!
//! Read once at scenario start and passed by reference into orchestrators.

/// Names and namespaces of everything the harness touches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Subscription (and package) name of the operator under test.
    pub subscription: String,

    /// Channel to subscribe to.
    pub channel: String,

    /// Catalog source serving the operator package.
    pub catalog_source: String,

    /// Namespace where subscriptions and CSVs live.
    pub operators_namespace: String,

    /// Namespace of the catalog source.
    pub marketplace_namespace: String,

    /// Namespace the operator manages, where addons and runs appear.
    pub target_namespace: String,
}

impl HarnessConfig {
    /// Baseline values, independent of the environment.
    pub fn defaults() -> Self {
        Self {
            subscription: "pipelines-operator".to_owned(),
            channel: "stable".to_owned(),
            catalog_source: "operator-catalog".to_owned(),
            operators_namespace: "openshift-operators".to_owned(),
            marketplace_namespace: "openshift-marketplace".to_owned(),
            target_namespace: "openshift-pipelines".to_owned(),
        }
    }

    /// Defaults overlaid with `OPTEST_*` environment variables.
    pub fn from_env() -> Self {
        let mut cfg = Self::defaults();
        let overlay = |target: &mut String, var: &str| {
            if let Ok(value) = std::env::var(var) {
                if !value.is_empty() {
                    *target = value;
                }
            }
        };
        overlay(&mut cfg.subscription, "OPTEST_SUBSCRIPTION");
        overlay(&mut cfg.channel, "OPTEST_CHANNEL");
        overlay(&mut cfg.catalog_source, "OPTEST_CATALOG_SOURCE");
        overlay(&mut cfg.operators_namespace, "OPTEST_OPERATORS_NAMESPACE");
        overlay(&mut cfg.marketplace_namespace, "OPTEST_MARKETPLACE_NAMESPACE");
        overlay(&mut cfg.target_namespace, "OPTEST_TARGET_NAMESPACE");
        cfg
    }
}
