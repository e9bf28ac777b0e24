//! Hierarchy resolution
//!
//! Turns a [`NavigationTarget`] into its ordered row set:
//! breadcrumb rows, one separator row, then the target's children.
//!
//! - Root / view: parent breadcrumb (none at the root), then child views, elements and
//!   services, each group sorted by name (ordinal, case-sensitive, stable).
//! - Service: containing views as breadcrumbs, then non-excluded members in definition order.
//! - Element / parameter: containing views as breadcrumbs, then displayable protocol
//!   parameters in protocol order.
//!
//! Severity lookups for a group run with bounded concurrency and are re-joined in group order.
//! Any backend failure fails the whole resolution; no partial rows are returned.

use crate::backend::{
    ElementQuery, InventoryBackend, LiteElement, LiteService, ServiceQuery, ViewInfo,
};
use crate::error::{BackendError, QueryError};
use crate::navigation::{parse_filter, NavigationTarget};
use crate::parameters;
use crate::rows::Row;
use crate::severity::{map_severity, NativeSeverity, Severity};
use crate::types::{CompoundId, ViewId, ROOT_VIEW_ID};
use futures::future::BoxFuture;
use futures::{stream, StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Resolver tuning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Upper bound on severity lookups in flight at once. 1 means strictly sequential.
    #[serde(default = "default_severity_concurrency")]
    pub severity_concurrency: usize,
}

fn default_severity_concurrency() -> usize {
    8
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            severity_concurrency: default_severity_concurrency(),
        }
    }
}

impl ResolverConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.severity_concurrency == 0 {
            return Err("severity_concurrency must be at least 1".to_string());
        }
        Ok(())
    }
}

enum Member {
    Service(LiteService),
    Element(LiteElement),
}

/// Resolves navigation targets against an inventory backend
pub struct HierarchyResolver {
    backend: Arc<dyn InventoryBackend>,
    config: ResolverConfig,
}

impl HierarchyResolver {
    pub fn new(backend: Arc<dyn InventoryBackend>, config: ResolverConfig) -> Self {
        Self { backend, config }
    }

    /// Parse the raw filter token and resolve it.
    pub async fn resolve_filter(&self, raw_filter: Option<&str>) -> Result<Vec<Row>, QueryError> {
        let target = parse_filter(raw_filter)?;
        self.resolve(&target, raw_filter).await
    }

    /// Resolve a parsed target. `raw_filter` is echoed as the separator row's key.
    pub async fn resolve(
        &self,
        target: &NavigationTarget,
        raw_filter: Option<&str>,
    ) -> Result<Vec<Row>, QueryError> {
        debug!(
            target = target.kind(),
            backend = self.backend.backend_name(),
            "Resolving navigation target"
        );
        let rows = match target {
            NavigationTarget::Root => self.resolve_view(ROOT_VIEW_ID, raw_filter).await?,
            NavigationTarget::View { view_id } => self.resolve_view(*view_id, raw_filter).await?,
            NavigationTarget::Service { service } => {
                self.resolve_service(*service, raw_filter).await?
            }
            NavigationTarget::Element { element }
            | NavigationTarget::Parameter { element, .. } => {
                self.resolve_element(*element, raw_filter).await?
            }
        };
        debug!(target = target.kind(), rows = rows.len(), "Resolved navigation target");
        Ok(rows)
    }

    async fn resolve_view(
        &self,
        view_id: ViewId,
        raw_filter: Option<&str>,
    ) -> Result<Vec<Row>, QueryError> {
        let views = self.backend.views().await?;
        let view = views.get(&view_id).ok_or(QueryError::ViewNotFound(view_id))?;

        let mut rows = Vec::new();
        if view_id != ROOT_VIEW_ID {
            let parent = views
                .get(&view.parent_id)
                .ok_or(QueryError::ViewNotFound(view.parent_id))?;
            rows.extend(self.view_rows(&[parent]).await?);
        }
        rows.push(Row::separator(raw_filter));

        let mut child_views: Vec<&ViewInfo> = view
            .child_view_ids
            .iter()
            .filter_map(|id| {
                let child = views.get(id);
                if child.is_none() {
                    warn!(view_id, child_id = *id, "Child view missing from view set, skipping");
                }
                child
            })
            .collect();
        child_views.sort_by(|a, b| a.name.cmp(&b.name));
        rows.extend(self.view_rows(&child_views).await?);

        let mut elements = self
            .backend
            .elements_in_view(view_id, &ElementQuery::direct_children())
            .await?;
        elements.sort_by(|a, b| a.name.cmp(&b.name));
        let lookups = elements
            .iter()
            .map(|e| self.backend.element_state(e.id))
            .collect();
        let states = self.join_states(lookups).await?;
        rows.extend(
            elements
                .iter()
                .zip(states)
                .map(|(element, severity)| Row::element(element, severity)),
        );

        let mut services = self
            .backend
            .services_in_view(view_id, &ServiceQuery::direct_children())
            .await?;
        services.sort_by(|a, b| a.name.cmp(&b.name));
        let lookups = services
            .iter()
            .map(|s| self.backend.service_state(s.id))
            .collect();
        let states = self.join_states(lookups).await?;
        rows.extend(
            services
                .iter()
                .zip(states)
                .map(|(service, severity)| Row::service(service, severity)),
        );

        debug!(
            view_id,
            child_views = child_views.len(),
            elements = elements.len(),
            services = services.len(),
            "Resolved view children"
        );
        Ok(rows)
    }

    async fn resolve_service(
        &self,
        service: CompoundId,
        raw_filter: Option<&str>,
    ) -> Result<Vec<Row>, QueryError> {
        let containing = self.backend.views_for_service(service).await?;
        let mut rows = self.breadcrumbs(&containing).await?;
        rows.push(Row::separator(raw_filter));

        let definition = self
            .backend
            .service_definition(service)
            .await?
            .ok_or(QueryError::ServiceNotFound(service))?;

        let mut members = Vec::new();
        for member in definition.members.iter().filter(|m| !m.excluded) {
            if member.is_service {
                let lite = self
                    .backend
                    .lite_service(member.id)
                    .await?
                    .ok_or(QueryError::ServiceNotFound(member.id))?;
                members.push(Member::Service(lite));
            } else {
                let lite = self
                    .backend
                    .lite_element(member.id)
                    .await?
                    .ok_or(QueryError::ElementNotFound(member.id))?;
                members.push(Member::Element(lite));
            }
        }

        let lookups = members
            .iter()
            .map(|member| match member {
                Member::Service(s) => self.backend.service_state(s.id),
                Member::Element(e) => self.backend.element_state(e.id),
            })
            .collect();
        let states = self.join_states(lookups).await?;
        rows.extend(
            members
                .iter()
                .zip(states)
                .map(|(member, severity)| match member {
                    Member::Service(s) => Row::service(s, severity),
                    Member::Element(e) => Row::element(e, severity),
                }),
        );

        debug!(
            service = %service,
            members = members.len(),
            excluded = definition.members.len() - members.len(),
            "Resolved service members"
        );
        Ok(rows)
    }

    async fn resolve_element(
        &self,
        element: CompoundId,
        raw_filter: Option<&str>,
    ) -> Result<Vec<Row>, QueryError> {
        let containing = self.backend.views_for_element(element).await?;
        let mut rows = self.breadcrumbs(&containing).await?;
        rows.push(Row::separator(raw_filter));

        let protocol = self
            .backend
            .element_protocol(element)
            .await?
            .ok_or(QueryError::ElementNotFound(element))?;
        let shown: Vec<_> = parameters::displayable(&protocol).collect();
        let lookups = shown
            .iter()
            .map(|p| self.backend.parameter_state(element, p.id))
            .collect();
        let states = self.join_states(lookups).await?;
        rows.extend(
            shown
                .iter()
                .zip(states)
                .map(|(parameter, severity)| Row::parameter(element, parameter, severity)),
        );

        debug!(
            element = %element,
            parameters = protocol.len(),
            shown = shown.len(),
            "Resolved element parameters"
        );
        Ok(rows)
    }

    /// Breadcrumb rows for containing views, in backend order.
    async fn breadcrumbs(&self, containing: &[ViewInfo]) -> Result<Vec<Row>, QueryError> {
        let views: Vec<&ViewInfo> = containing.iter().collect();
        self.view_rows(&views).await
    }

    async fn view_rows(&self, views: &[&ViewInfo]) -> Result<Vec<Row>, QueryError> {
        let lookups = views
            .iter()
            .map(|v| self.backend.view_state(v.id))
            .collect();
        let states = self.join_states(lookups).await?;
        Ok(views
            .iter()
            .zip(states)
            .map(|(view, severity)| Row::view(view, severity))
            .collect())
    }

    /// Run lookups with bounded concurrency; output order matches input order.
    ///
    /// Lookups arrive already collected so the pending future holds no borrowing closures.
    async fn join_states(
        &self,
        lookups: Vec<BoxFuture<'_, Result<NativeSeverity, BackendError>>>,
    ) -> Result<Vec<Severity>, QueryError> {
        let native: Vec<NativeSeverity> = stream::iter(lookups)
            .buffered(self.config.severity_concurrency.max(1))
            .try_collect()
            .await?;
        Ok(native.into_iter().map(map_severity).collect())
    }
}
