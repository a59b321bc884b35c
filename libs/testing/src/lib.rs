//! # optest-testing
//!
//! In-memory cluster fakes for exercising the harness without a cluster.
//!
//! Two accessors are provided:
//!
//! - [`ScriptedFetch`]: replays a fixed sequence of fetch outcomes,
//!   repeating the final one; used for precise probe-by-probe engine tests
//! - [`FakeCluster`]: a mutable in-memory store implementing the full
//!   client surface; tests drive convergence by flipping object status
//!   from a simulated-operator task
//!
//! Panics are acceptable throughout: this crate only ever runs inside
//! tests, where a panic is the failure signal.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use optest_cluster::{
    Addon, Cluster, ClusterServiceVersion, Fetch, FetchError, ResourceClient, ResourceMeta,
    ResourceRef, Run, Subscription,
};

/// Initialize test logging once; safe to call from every test.
pub fn init_logging() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Replays a scripted sequence of fetch outcomes.
///
/// Each probe consumes the next entry; the final entry repeats forever so
/// a script can express "not found three times, then ready". The probe
/// count is tracked for "exactly k probes" assertions.
pub struct ScriptedFetch<T> {
    script: Mutex<VecDeque<Result<T, FetchError>>>,
    calls: AtomicU32,
}

impl<T> ScriptedFetch<T> {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            calls: AtomicU32::new(0),
        }
    }

    pub fn then_ok(self, state: T) -> Self {
        self.script.lock().unwrap().push_back(Ok(state));
        self
    }

    pub fn then_err(self, err: FetchError) -> Self {
        self.script.lock().unwrap().push_back(Err(err));
        self
    }

    /// Number of probes performed so far.
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<T: Clone + Send + Sync> Fetch<T> for ScriptedFetch<T> {
    async fn fetch(&self, _resource: &ResourceRef) -> Result<T, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut script = self.script.lock().unwrap();
        if script.len() > 1 {
            script.pop_front().expect("script is non-empty")
        } else {
            script.front().cloned().expect("script must not be empty")
        }
    }
}

type Key = (String, String);

/// In-memory store for one resource kind.
///
/// Client mutations (`create`/`update`/`delete`/`delete_all`) are counted
/// in [`writes`](FakeStore::writes); the test-setup helpers [`insert`] and
/// [`mutate`] are not, so tests can assert that a read-only wait performed
/// no writes.
///
/// [`insert`]: FakeStore::insert
/// [`mutate`]: FakeStore::mutate
pub struct FakeStore<T> {
    objects: Mutex<HashMap<Key, T>>,
    writes: AtomicU32,
}

impl<T: ResourceMeta + Clone> FakeStore<T> {
    pub fn new() -> Self {
        Self {
            objects: Mutex::new(HashMap::new()),
            writes: AtomicU32::new(0),
        }
    }

    fn key(meta_name: &str, namespace: &str) -> Key {
        (namespace.to_owned(), meta_name.to_owned())
    }

    /// Put an object in place without counting a write (test setup, or a
    /// simulated operator creating derived resources).
    pub fn insert(&self, object: T) {
        let key = Self::key(&object.meta().name, &object.meta().namespace);
        self.objects.lock().unwrap().insert(key, object);
    }

    /// Mutate an object in place, as an operator updating status would.
    /// Returns false if the object does not exist.
    pub fn mutate(&self, name: &str, namespace: &str, apply: impl FnOnce(&mut T)) -> bool {
        let mut objects = self.objects.lock().unwrap();
        match objects.get_mut(&Self::key(name, namespace)) {
            Some(object) => {
                apply(object);
                true
            }
            None => false,
        }
    }

    /// Remove an object without counting a write.
    pub fn remove(&self, name: &str, namespace: &str) -> bool {
        self.objects
            .lock()
            .unwrap()
            .remove(&Self::key(name, namespace))
            .is_some()
    }

    /// Number of client-side mutations performed against this store.
    pub fn writes(&self) -> u32 {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: ResourceMeta + Clone> Default for FakeStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: ResourceMeta + Clone + Send + Sync> Fetch<T> for FakeStore<T> {
    async fn fetch(&self, resource: &ResourceRef) -> Result<T, FetchError> {
        self.objects
            .lock()
            .unwrap()
            .get(&Self::key(&resource.name, &resource.namespace))
            .cloned()
            .ok_or_else(|| FetchError::NotFound(resource.clone()))
    }
}

#[async_trait]
impl<T: ResourceMeta + Clone + Send + Sync> ResourceClient<T> for FakeStore<T> {
    async fn create(&self, object: T) -> Result<T, FetchError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let key = Self::key(&object.meta().name, &object.meta().namespace);
        let mut objects = self.objects.lock().unwrap();
        if objects.contains_key(&key) {
            return Err(FetchError::Api(format!(
                "{} already exists",
                object.resource_ref()
            )));
        }
        objects.insert(key, object.clone());
        Ok(object)
    }

    async fn update(&self, object: T) -> Result<T, FetchError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let key = Self::key(&object.meta().name, &object.meta().namespace);
        let mut objects = self.objects.lock().unwrap();
        if !objects.contains_key(&key) {
            return Err(FetchError::NotFound(object.resource_ref()));
        }
        objects.insert(key, object.clone());
        Ok(object)
    }

    async fn delete(&self, resource: &ResourceRef) -> Result<(), FetchError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.objects
            .lock()
            .unwrap()
            .remove(&Self::key(&resource.name, &resource.namespace))
            .map(|_| ())
            .ok_or_else(|| FetchError::NotFound(resource.clone()))
    }

    async fn delete_all(&self, namespace: &str) -> Result<(), FetchError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.objects
            .lock()
            .unwrap()
            .retain(|(ns, _), _| ns != namespace);
        Ok(())
    }

    async fn list(&self, namespace: &str) -> Result<Vec<T>, FetchError> {
        let mut items: Vec<T> = self
            .objects
            .lock()
            .unwrap()
            .iter()
            .filter(|((ns, _), _)| ns == namespace)
            .map(|(_, object)| object.clone())
            .collect();
        items.sort_by(|a, b| a.meta().name.cmp(&b.meta().name));
        Ok(items)
    }
}

/// The whole fake cluster: one store per resource kind.
#[derive(Default)]
pub struct FakeCluster {
    pub subscriptions: FakeStore<Subscription>,
    pub csvs: FakeStore<ClusterServiceVersion>,
    pub addons: FakeStore<Addon>,
    pub runs: FakeStore<Run>,
}

impl FakeCluster {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Cluster for FakeCluster {
    fn subscriptions(&self) -> &dyn ResourceClient<Subscription> {
        &self.subscriptions
    }

    fn cluster_service_versions(&self) -> &dyn ResourceClient<ClusterServiceVersion> {
        &self.csvs
    }

    fn addons(&self) -> &dyn ResourceClient<Addon> {
        &self.addons
    }

    fn runs(&self) -> &dyn ResourceClient<Run> {
        &self.runs
    }
}
