//! Capability traits over the cluster API.

use async_trait::async_trait;

use crate::error::FetchError;
use crate::types::{Addon, ClusterServiceVersion, ResourceRef, Run, Subscription};

/// Read-only accessor for one resource kind.
///
/// This is the only capability the condition poller consumes; a fetch
/// must never mutate the target.
#[async_trait]
pub trait Fetch<T>: Send + Sync {
    async fn fetch(&self, resource: &ResourceRef) -> Result<T, FetchError>;
}

/// Full client surface for one resource kind.
///
/// Mutations live here, separate from [`Fetch`], so they can only be
/// reached from orchestration code; the poller is read-only by
/// construction.
#[async_trait]
pub trait ResourceClient<T>: Fetch<T> {
    async fn create(&self, object: T) -> Result<T, FetchError>;

    async fn update(&self, object: T) -> Result<T, FetchError>;

    async fn delete(&self, resource: &ResourceRef) -> Result<(), FetchError>;

    /// Delete every object of this kind in `namespace`.
    async fn delete_all(&self, namespace: &str) -> Result<(), FetchError>;

    async fn list(&self, namespace: &str) -> Result<Vec<T>, FetchError>;
}

/// Typed client bundle for everything the harness touches.
///
/// A production implementation wraps a real cluster API client; tests use
/// the in-memory fake from `optest-testing`.
pub trait Cluster: Send + Sync {
    fn subscriptions(&self) -> &dyn ResourceClient<Subscription>;

    fn cluster_service_versions(&self) -> &dyn ResourceClient<ClusterServiceVersion>;

    fn addons(&self) -> &dyn ResourceClient<Addon>;

    fn runs(&self) -> &dyn ResourceClient<Run>;
}
