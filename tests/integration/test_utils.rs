//! Shared test utilities for integration tests
//!
//! Fixture loading, a scriptable backend wrapper, and serialized access to the
//! environment variables the configuration loader reads.

use async_trait::async_trait;
use drilldown::backend::{
    ElementQuery, InventoryBackend, LiteElement, LiteService, ProtocolParameter, ServiceDefinition,
    ServiceQuery, SnapshotBackend, ViewInfo,
};
use drilldown::{BackendError, CompoundId, HierarchyResolver, NativeSeverity, ResolverConfig, Row, ViewId};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Global mutex to serialize environment variable access across all tests
static ENV_MUTEX: Mutex<()> = Mutex::new(());

const ISOLATED_VARS: [&str; 4] = [
    "XDG_CONFIG_HOME",
    "DRILLDOWN_ENV",
    "DRILLDOWN__BACKEND__KIND",
    "DRILLDOWN__RESOLVER__SEVERITY_CONCURRENCY",
];

/// Holds the environment lock and restores captured variables on drop
pub struct IsolatedEnv {
    saved: Vec<(&'static str, Option<String>)>,
    _guard: MutexGuard<'static, ()>,
}

impl IsolatedEnv {
    /// Lock the environment, point XDG_CONFIG_HOME at `xdg_config_home`, clear the rest.
    pub fn new(xdg_config_home: &std::path::Path) -> Self {
        let guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        let saved = ISOLATED_VARS
            .iter()
            .map(|key| (*key, std::env::var(key).ok()))
            .collect();
        for key in ISOLATED_VARS {
            std::env::remove_var(key);
        }
        std::env::set_var("XDG_CONFIG_HOME", xdg_config_home);
        Self {
            saved,
            _guard: guard,
        }
    }

    pub fn set(&self, key: &'static str, value: &str) {
        assert!(ISOLATED_VARS.contains(&key), "{} is not restored on drop", key);
        std::env::set_var(key, value);
    }
}

impl Drop for IsolatedEnv {
    fn drop(&mut self) {
        for (key, value) in &self.saved {
            match value {
                Some(v) => std::env::set_var(key, v),
                None => std::env::remove_var(key),
            }
        }
    }
}

pub fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("inventory.json")
}

pub fn fixture_backend() -> Arc<SnapshotBackend> {
    Arc::new(SnapshotBackend::load(&fixture_path()).unwrap())
}

pub fn resolver(backend: Arc<dyn InventoryBackend>) -> HierarchyResolver {
    HierarchyResolver::new(backend, ResolverConfig::default())
}

pub fn keys(rows: &[Row]) -> Vec<Option<&str>> {
    rows.iter().map(|r| r.key()).collect()
}

pub fn names(rows: &[Row]) -> Vec<Option<&str>> {
    rows.iter().map(|r| r.name()).collect()
}

/// Wraps a snapshot backend with injectable latency, failures and dangling child views.
/// Severity lookups are counted so tests can observe fan-out.
pub struct ScriptedBackend {
    inner: Arc<SnapshotBackend>,
    /// Per-element latency for `element_state`
    element_delays: HashMap<CompoundId, Duration>,
    failing_element_state: Option<CompoundId>,
    extra_children: HashMap<ViewId, Vec<ViewId>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    state_calls: AtomicUsize,
}

impl ScriptedBackend {
    pub fn new(inner: Arc<SnapshotBackend>) -> Self {
        Self {
            inner,
            element_delays: HashMap::new(),
            failing_element_state: None,
            extra_children: HashMap::new(),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            state_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_element_delay(mut self, element: CompoundId, delay: Duration) -> Self {
        self.element_delays.insert(element, delay);
        self
    }

    pub fn failing_element_state(mut self, element: CompoundId) -> Self {
        self.failing_element_state = Some(element);
        self
    }

    pub fn with_extra_child(mut self, parent: ViewId, child: ViewId) -> Self {
        self.extra_children.entry(parent).or_default().push(child);
        self
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn state_calls(&self) -> usize {
        self.state_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InventoryBackend for ScriptedBackend {
    async fn views(&self) -> Result<HashMap<ViewId, ViewInfo>, BackendError> {
        let mut views = self.inner.views().await?;
        for (parent, children) in &self.extra_children {
            if let Some(view) = views.get_mut(parent) {
                view.child_view_ids.extend(children.iter().copied());
            }
        }
        Ok(views)
    }

    async fn views_for_service(&self, service: CompoundId) -> Result<Vec<ViewInfo>, BackendError> {
        self.inner.views_for_service(service).await
    }

    async fn views_for_element(&self, element: CompoundId) -> Result<Vec<ViewInfo>, BackendError> {
        self.inner.views_for_element(element).await
    }

    async fn view_state(&self, view_id: ViewId) -> Result<NativeSeverity, BackendError> {
        self.state_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.view_state(view_id).await
    }

    async fn service_state(&self, service: CompoundId) -> Result<NativeSeverity, BackendError> {
        self.state_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.service_state(service).await
    }

    async fn element_state(&self, element: CompoundId) -> Result<NativeSeverity, BackendError> {
        self.state_calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.element_delays.get(&element) {
            tokio::time::sleep(*delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing_element_state == Some(element) {
            return Err(BackendError::Status {
                status: 503,
                body: "alarm service unavailable".to_string(),
            });
        }
        self.inner.element_state(element).await
    }

    async fn parameter_state(
        &self,
        element: CompoundId,
        parameter_id: i32,
    ) -> Result<NativeSeverity, BackendError> {
        self.state_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.parameter_state(element, parameter_id).await
    }

    async fn service_definition(
        &self,
        service: CompoundId,
    ) -> Result<Option<ServiceDefinition>, BackendError> {
        self.inner.service_definition(service).await
    }

    async fn lite_service(&self, service: CompoundId) -> Result<Option<LiteService>, BackendError> {
        self.inner.lite_service(service).await
    }

    async fn lite_element(&self, element: CompoundId) -> Result<Option<LiteElement>, BackendError> {
        self.inner.lite_element(element).await
    }

    async fn element_protocol(
        &self,
        element: CompoundId,
    ) -> Result<Option<Vec<ProtocolParameter>>, BackendError> {
        self.inner.element_protocol(element).await
    }

    async fn elements_in_view(
        &self,
        view_id: ViewId,
        query: &ElementQuery,
    ) -> Result<Vec<LiteElement>, BackendError> {
        self.inner.elements_in_view(view_id, query).await
    }

    async fn services_in_view(
        &self,
        view_id: ViewId,
        query: &ServiceQuery,
    ) -> Result<Vec<LiteService>, BackendError> {
        self.inner.services_in_view(view_id, query).await
    }

    fn backend_name(&self) -> &str {
        "scripted"
    }
}
