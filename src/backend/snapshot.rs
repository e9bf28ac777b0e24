//! Snapshot backend: answers every backend request from an in-memory inventory snapshot.
//!
//! Snapshots are loaded from JSON or TOML. View children are derived from `parent_id`
//! in file order; severities default to `Undefined` when a record carries none.

use super::{
    DisplayPosition, ElementQuery, ElementState, InventoryBackend, LiteElement, LiteService,
    ProtocolParameter, ServiceDefinition, ServiceMember, ServiceQuery, ViewInfo,
};
use crate::error::BackendError;
use crate::severity::NativeSeverity;
use crate::types::{CompoundId, ViewId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::Path;
use tracing::debug;

/// Serialized inventory snapshot
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InventorySnapshot {
    #[serde(default)]
    pub views: Vec<SnapshotView>,
    #[serde(default)]
    pub elements: Vec<SnapshotElement>,
    #[serde(default)]
    pub services: Vec<SnapshotService>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotView {
    pub id: ViewId,
    pub name: String,
    pub parent_id: ViewId,
    #[serde(default)]
    pub severity: NativeSeverity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotElement {
    pub id: CompoundId,
    pub name: String,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub state: ElementState,
    #[serde(default)]
    pub views: Vec<ViewId>,
    #[serde(default)]
    pub severity: NativeSeverity,
    #[serde(default)]
    pub parameters: Vec<SnapshotParameter>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotParameter {
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
    #[serde(default)]
    pub severity: NativeSeverity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotService {
    pub id: CompoundId,
    pub name: String,
    #[serde(default)]
    pub views: Vec<ViewId>,
    #[serde(default)]
    pub severity: NativeSeverity,
    #[serde(default)]
    pub members: Vec<ServiceMember>,
}

impl InventorySnapshot {
    pub fn from_json_str(s: &str) -> Result<Self, BackendError> {
        serde_json::from_str(s)
            .map_err(|e| BackendError::Snapshot(format!("Invalid JSON snapshot: {}", e)))
    }

    pub fn from_toml_str(s: &str) -> Result<Self, BackendError> {
        toml::from_str(s)
            .map_err(|e| BackendError::Snapshot(format!("Invalid TOML snapshot: {}", e)))
    }
}

impl From<&SnapshotElement> for LiteElement {
    fn from(e: &SnapshotElement) -> Self {
        LiteElement {
            id: e.id,
            name: e.name.clone(),
            hidden: e.hidden,
            state: e.state,
            views: e.views.clone(),
        }
    }
}

impl From<&SnapshotParameter> for ProtocolParameter {
    fn from(p: &SnapshotParameter) -> Self {
        ProtocolParameter {
            id: p.id,
            name: p.name.clone(),
            write_type: p.write_type,
            is_table: p.is_table,
            is_table_column: p.is_table_column,
            positions: p.positions.clone(),
            has_trending_average: p.has_trending_average,
        }
    }
}

impl From<&SnapshotService> for LiteService {
    fn from(s: &SnapshotService) -> Self {
        LiteService {
            id: s.id,
            name: s.name.clone(),
            views: s.views.clone(),
        }
    }
}

/// In-memory inventory backend
#[derive(Debug)]
pub struct SnapshotBackend {
    snapshot: InventorySnapshot,
    view_index: HashMap<ViewId, usize>,
    children: HashMap<ViewId, Vec<ViewId>>,
    element_index: HashMap<CompoundId, usize>,
    service_index: HashMap<CompoundId, usize>,
}

impl SnapshotBackend {
    /// Index a snapshot. Duplicate ids are rejected.
    pub fn new(snapshot: InventorySnapshot) -> Result<Self, BackendError> {
        let mut view_index = HashMap::new();
        let mut children: HashMap<ViewId, Vec<ViewId>> = HashMap::new();
        for (i, view) in snapshot.views.iter().enumerate() {
            if view_index.insert(view.id, i).is_some() {
                return Err(BackendError::Snapshot(format!("Duplicate view id {}", view.id)));
            }
            if view.parent_id != view.id {
                children.entry(view.parent_id).or_default().push(view.id);
            }
        }

        let mut element_index = HashMap::new();
        for (i, element) in snapshot.elements.iter().enumerate() {
            if element_index.insert(element.id, i).is_some() {
                return Err(BackendError::Snapshot(format!(
                    "Duplicate element id {}",
                    element.id
                )));
            }
        }

        let mut service_index = HashMap::new();
        for (i, service) in snapshot.services.iter().enumerate() {
            if service_index.insert(service.id, i).is_some() {
                return Err(BackendError::Snapshot(format!(
                    "Duplicate service id {}",
                    service.id
                )));
            }
        }

        Ok(Self {
            snapshot,
            view_index,
            children,
            element_index,
            service_index,
        })
    }

    /// Load a snapshot file; `.toml` files are parsed as TOML, anything else as JSON.
    pub fn load(path: &Path) -> Result<Self, BackendError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            BackendError::Snapshot(format!("Failed to read snapshot {:?}: {}", path, e))
        })?;
        let snapshot = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => InventorySnapshot::from_toml_str(&content)?,
            _ => InventorySnapshot::from_json_str(&content)?,
        };
        debug!(
            path = %path.display(),
            views = snapshot.views.len(),
            elements = snapshot.elements.len(),
            services = snapshot.services.len(),
            "Loaded inventory snapshot"
        );
        Self::new(snapshot)
    }

    fn view_info(&self, view_id: ViewId) -> Option<ViewInfo> {
        let view = &self.snapshot.views[*self.view_index.get(&view_id)?];
        Some(ViewInfo {
            id: view.id,
            name: view.name.clone(),
            parent_id: view.parent_id,
            child_view_ids: self.children.get(&view.id).cloned().unwrap_or_default(),
        })
    }

    fn element(&self, id: CompoundId) -> Option<&SnapshotElement> {
        self.element_index
            .get(&id)
            .map(|&i| &self.snapshot.elements[i])
    }

    fn service(&self, id: CompoundId) -> Option<&SnapshotService> {
        self.service_index
            .get(&id)
            .map(|&i| &self.snapshot.services[i])
    }

    /// The view itself, plus all descendants when `include_sub_views` is set.
    fn view_scope(&self, view_id: ViewId, include_sub_views: bool) -> HashSet<ViewId> {
        let mut scope = HashSet::from([view_id]);
        if !include_sub_views {
            return scope;
        }
        let mut queue = VecDeque::from([view_id]);
        while let Some(current) = queue.pop_front() {
            for child in self.children.get(&current).into_iter().flatten() {
                if scope.insert(*child) {
                    queue.push_back(*child);
                }
            }
        }
        scope
    }

    fn view_infos(&self, ids: &[ViewId]) -> Vec<ViewInfo> {
        ids.iter().filter_map(|id| self.view_info(*id)).collect()
    }
}

#[async_trait]
impl InventoryBackend for SnapshotBackend {
    async fn views(&self) -> Result<HashMap<ViewId, ViewInfo>, BackendError> {
        Ok(self
            .snapshot
            .views
            .iter()
            .filter_map(|v| self.view_info(v.id).map(|info| (v.id, info)))
            .collect())
    }

    async fn views_for_service(&self, service: CompoundId) -> Result<Vec<ViewInfo>, BackendError> {
        Ok(self
            .service(service)
            .map(|s| self.view_infos(&s.views))
            .unwrap_or_default())
    }

    async fn views_for_element(&self, element: CompoundId) -> Result<Vec<ViewInfo>, BackendError> {
        Ok(self
            .element(element)
            .map(|e| self.view_infos(&e.views))
            .unwrap_or_default())
    }

    async fn view_state(&self, view_id: ViewId) -> Result<NativeSeverity, BackendError> {
        Ok(self
            .view_index
            .get(&view_id)
            .map(|&i| self.snapshot.views[i].severity)
            .unwrap_or_default())
    }

    async fn service_state(&self, service: CompoundId) -> Result<NativeSeverity, BackendError> {
        Ok(self.service(service).map(|s| s.severity).unwrap_or_default())
    }

    async fn element_state(&self, element: CompoundId) -> Result<NativeSeverity, BackendError> {
        Ok(self.element(element).map(|e| e.severity).unwrap_or_default())
    }

    async fn parameter_state(
        &self,
        element: CompoundId,
        parameter_id: i32,
    ) -> Result<NativeSeverity, BackendError> {
        Ok(self
            .element(element)
            .and_then(|e| e.parameters.iter().find(|p| p.id == parameter_id))
            .map(|p| p.severity)
            .unwrap_or_default())
    }

    async fn service_definition(
        &self,
        service: CompoundId,
    ) -> Result<Option<ServiceDefinition>, BackendError> {
        Ok(self.service(service).map(|s| ServiceDefinition {
            id: s.id,
            name: s.name.clone(),
            members: s.members.clone(),
        }))
    }

    async fn lite_service(&self, service: CompoundId) -> Result<Option<LiteService>, BackendError> {
        Ok(self.service(service).map(LiteService::from))
    }

    async fn lite_element(&self, element: CompoundId) -> Result<Option<LiteElement>, BackendError> {
        Ok(self.element(element).map(LiteElement::from))
    }

    async fn element_protocol(
        &self,
        element: CompoundId,
    ) -> Result<Option<Vec<ProtocolParameter>>, BackendError> {
        Ok(self
            .element(element)
            .map(|e| e.parameters.iter().map(ProtocolParameter::from).collect()))
    }

    async fn elements_in_view(
        &self,
        view_id: ViewId,
        query: &ElementQuery,
    ) -> Result<Vec<LiteElement>, BackendError> {
        let scope = self.view_scope(view_id, query.include_sub_views);
        Ok(self
            .snapshot
            .elements
            .iter()
            .filter(|e| e.views.iter().any(|v| scope.contains(v)))
            .map(LiteElement::from)
            .filter(|e| query.admits(e))
            .collect())
    }

    async fn services_in_view(
        &self,
        view_id: ViewId,
        query: &ServiceQuery,
    ) -> Result<Vec<LiteService>, BackendError> {
        let scope = self.view_scope(view_id, query.include_sub_views);
        Ok(self
            .snapshot
            .services
            .iter()
            .filter(|s| s.views.iter().any(|v| scope.contains(v)))
            .map(LiteService::from)
            .collect())
    }

    fn backend_name(&self) -> &str {
        "snapshot"
    }
}
