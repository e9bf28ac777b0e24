//! Inventory Backend Abstraction
//!
//! Request/response interface to the remote inventory and alarm-state system. The resolver
//! only talks to [`InventoryBackend`]; concrete adapters live in submodules:
//! an in-memory [`SnapshotBackend`] and a JSON-over-HTTP [`HttpBackend`].

use crate::error::{BackendError, QueryError};
use crate::severity::NativeSeverity;
use crate::types::{CompoundId, ViewId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

pub mod http;
pub mod snapshot;

pub use http::HttpBackend;
pub use snapshot::{InventorySnapshot, SnapshotBackend};

/// A grouping view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewInfo {
    pub id: ViewId,
    pub name: String,
    pub parent_id: ViewId,
    #[serde(default)]
    pub child_view_ids: Vec<ViewId>,
}

/// Run state of an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ElementState {
    #[default]
    Active,
    Paused,
    Stopped,
    Error,
}

/// Lightweight element description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiteElement {
    pub id: CompoundId,
    pub name: String,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub state: ElementState,
    /// Views the element is placed in directly
    #[serde(default)]
    pub views: Vec<ViewId>,
}

/// Lightweight service description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiteService {
    pub id: CompoundId,
    pub name: String,
    #[serde(default)]
    pub views: Vec<ViewId>,
}

/// Reference from a service to one of its members
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceMember {
    pub id: CompoundId,
    #[serde(default)]
    pub is_service: bool,
    #[serde(default)]
    pub excluded: bool,
}

/// Full service definition with its ordered member list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDefinition {
    pub id: CompoundId,
    pub name: String,
    #[serde(default)]
    pub members: Vec<ServiceMember>,
}

/// Where a parameter is placed on an element's display pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayPosition {
    pub page: String,
    pub row: i32,
    pub column: i32,
}

/// One parameter of an element's protocol
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolParameter {
    pub id: i32,
    pub name: String,
    #[serde(default)]
    pub write_type: bool,
    #[serde(default)]
    pub is_table: bool,
    #[serde(default)]
    pub is_table_column: bool,
    #[serde(default)]
    pub positions: Vec<DisplayPosition>,
    #[serde(default)]
    pub has_trending_average: bool,
}

/// Element listing request for a single view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementQuery {
    pub include_sub_views: bool,
    pub include_hidden: bool,
    pub include_paused: bool,
    pub include_stopped: bool,
}

impl ElementQuery {
    /// Elements placed directly in the view: visible, whatever their run state.
    pub fn direct_children() -> Self {
        Self {
            include_sub_views: false,
            include_hidden: false,
            include_paused: true,
            include_stopped: true,
        }
    }

    pub fn admits(&self, element: &LiteElement) -> bool {
        if element.hidden && !self.include_hidden {
            return false;
        }
        match element.state {
            ElementState::Paused => self.include_paused,
            ElementState::Stopped => self.include_stopped,
            ElementState::Active | ElementState::Error => true,
        }
    }
}

/// Service listing request for a single view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceQuery {
    pub include_sub_views: bool,
}

impl ServiceQuery {
    pub fn direct_children() -> Self {
        Self {
            include_sub_views: false,
        }
    }
}

/// Inventory backend client trait
///
/// Every method is one request/response round trip. Single-entity lookups return `Ok(None)`
/// when the entity does not exist so callers decide what "missing" means.
#[async_trait]
pub trait InventoryBackend: Send + Sync {
    /// All views, keyed by id
    async fn views(&self) -> Result<HashMap<ViewId, ViewInfo>, BackendError>;

    /// Views that directly contain the service
    async fn views_for_service(&self, service: CompoundId) -> Result<Vec<ViewInfo>, BackendError>;

    /// Views that directly contain the element
    async fn views_for_element(&self, element: CompoundId) -> Result<Vec<ViewInfo>, BackendError>;

    async fn view_state(&self, view_id: ViewId) -> Result<NativeSeverity, BackendError>;

    async fn service_state(&self, service: CompoundId) -> Result<NativeSeverity, BackendError>;

    async fn element_state(&self, element: CompoundId) -> Result<NativeSeverity, BackendError>;

    async fn parameter_state(
        &self,
        element: CompoundId,
        parameter_id: i32,
    ) -> Result<NativeSeverity, BackendError>;

    async fn service_definition(
        &self,
        service: CompoundId,
    ) -> Result<Option<ServiceDefinition>, BackendError>;

    async fn lite_service(&self, service: CompoundId) -> Result<Option<LiteService>, BackendError>;

    async fn lite_element(&self, element: CompoundId) -> Result<Option<LiteElement>, BackendError>;

    /// Protocol parameters of the element, in protocol order
    async fn element_protocol(
        &self,
        element: CompoundId,
    ) -> Result<Option<Vec<ProtocolParameter>>, BackendError>;

    async fn elements_in_view(
        &self,
        view_id: ViewId,
        query: &ElementQuery,
    ) -> Result<Vec<LiteElement>, BackendError>;

    async fn services_in_view(
        &self,
        view_id: ViewId,
        query: &ServiceQuery,
    ) -> Result<Vec<LiteService>, BackendError>;

    /// Short name for logs
    fn backend_name(&self) -> &str;
}

/// Backend adapter selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Snapshot,
    Http,
}

/// Backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default)]
    pub kind: BackendKind,

    /// Snapshot file (JSON or TOML) for the snapshot backend
    #[serde(default)]
    pub snapshot_path: Option<PathBuf>,

    /// Base URL for the HTTP backend
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Bearer token for the HTTP backend
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: BackendKind::default(),
            snapshot_path: None,
            endpoint: None,
            api_key: None,
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl BackendConfig {
    pub fn validate(&self) -> Result<(), String> {
        match self.kind {
            BackendKind::Snapshot => {
                if self.snapshot_path.is_none() {
                    return Err("Snapshot backend requires snapshot_path".to_string());
                }
            }
            BackendKind::Http => {
                let endpoint = self.endpoint.as_deref().unwrap_or("");
                if endpoint.is_empty() {
                    return Err("HTTP backend requires endpoint".to_string());
                }
                if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                    return Err(format!("Endpoint must be an http(s) URL: {}", endpoint));
                }
            }
        }
        if self.connect_timeout_secs == 0 || self.request_timeout_secs == 0 {
            return Err("Timeouts must be greater than zero".to_string());
        }
        Ok(())
    }
}

/// Builds a backend client from configuration
pub struct BackendFactory;

impl BackendFactory {
    pub fn create(config: &BackendConfig) -> Result<Arc<dyn InventoryBackend>, QueryError> {
        config.validate().map_err(QueryError::ConfigError)?;
        match config.kind {
            BackendKind::Snapshot => {
                let path = config.snapshot_path.as_ref().ok_or_else(|| {
                    QueryError::ConfigError("Snapshot backend requires snapshot_path".to_string())
                })?;
                Ok(Arc::new(SnapshotBackend::load(path)?))
            }
            BackendKind::Http => Ok(Arc::new(HttpBackend::from_config(config)?)),
        }
    }
}
