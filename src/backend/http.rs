//! HTTP backend: JSON-over-HTTP adapter for a remote inventory service.
//!
//! Resource layout under the configured base URL:
//!
//! | Request                                   | Response                  |
//! |-------------------------------------------|---------------------------|
//! | `GET views`                               | `[ViewInfo]`              |
//! | `GET views/{id}/state`                    | `{ "severity": .. }`      |
//! | `GET views/{id}/elements?..`              | `[LiteElement]`           |
//! | `GET views/{id}/services?..`              | `[LiteService]`           |
//! | `GET services/{dma}/{sid}`                | `LiteService`             |
//! | `GET services/{dma}/{sid}/definition`     | `ServiceDefinition`       |
//! | `GET services/{dma}/{sid}/views`          | `[ViewInfo]`              |
//! | `GET services/{dma}/{sid}/state`          | `{ "severity": .. }`      |
//! | `GET elements/{dma}/{eid}`                | `LiteElement`             |
//! | `GET elements/{dma}/{eid}/protocol`       | `[ProtocolParameter]`     |
//! | `GET elements/{dma}/{eid}/views`          | `[ViewInfo]`              |
//! | `GET elements/{dma}/{eid}/state`          | `{ "severity": .. }`      |
//! | `GET elements/{dma}/{eid}/parameters/{pid}/state` | `{ "severity": .. }` |
//!
//! A 404 on a single-entity lookup is `Ok(None)` and a 404 on a containing-view lookup is an
//! empty list, so the definition or protocol lookup decides whether the target exists.
//! A 404 on a view listing is an error: the view vanished after the view set was read.

use super::{
    BackendConfig, ElementQuery, InventoryBackend, LiteElement, LiteService, ProtocolParameter,
    ServiceDefinition, ServiceQuery, ViewInfo,
};
use crate::error::BackendError;
use crate::severity::NativeSeverity;
use crate::types::{CompoundId, ViewId};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

#[derive(Deserialize)]
struct StateResponse {
    severity: NativeSeverity,
}

fn map_http_error(error: reqwest::Error) -> BackendError {
    if error.is_timeout() {
        BackendError::Timeout(error.to_string())
    } else if let Some(status) = error.status() {
        BackendError::Status {
            status: status.as_u16(),
            body: error.to_string(),
        }
    } else if error.is_decode() {
        BackendError::MalformedResponse(error.to_string())
    } else {
        BackendError::Transport(error.to_string())
    }
}

/// HTTP inventory backend client
pub struct HttpBackend {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpBackend {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        connect_timeout: Duration,
        request_timeout: Duration,
    ) -> Result<Self, BackendError> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(request_timeout)
            .build()
            .map_err(|e| BackendError::Transport(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }

    pub fn from_config(config: &BackendConfig) -> Result<Self, BackendError> {
        let endpoint = config
            .endpoint
            .clone()
            .ok_or_else(|| BackendError::Transport("No endpoint configured".to_string()))?;
        Self::new(
            endpoint,
            config.api_key.clone(),
            Duration::from_secs(config.connect_timeout_secs),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn get(&self, path: &str) -> RequestBuilder {
        let request = self.client.get(self.url(path));
        match &self.api_key {
            Some(key) => request.header("Authorization", format!("Bearer {}", key)),
            None => request,
        }
    }

    /// Send and decode; `Ok(None)` on 404.
    async fn fetch_optional<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<Option<T>, BackendError> {
        let response = request.send().await.map_err(map_http_error)?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }
        response
            .json::<T>()
            .await
            .map(Some)
            .map_err(|e| BackendError::MalformedResponse(e.to_string()))
    }

    /// Send and decode; a 404 is a status error naming `path`.
    async fn fetch_required<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        path: &str,
    ) -> Result<T, BackendError> {
        self.fetch_optional(request)
            .await?
            .ok_or_else(|| BackendError::Status {
                status: StatusCode::NOT_FOUND.as_u16(),
                body: format!("{} not found", path),
            })
    }

    async fn fetch<T: DeserializeOwned>(&self, path: &str) -> Result<T, BackendError> {
        self.fetch_required(self.get(path), path).await
    }

    async fn fetch_state(&self, path: &str) -> Result<NativeSeverity, BackendError> {
        let state: StateResponse = self.fetch(path).await?;
        Ok(state.severity)
    }
}

fn service_path(service: CompoundId) -> String {
    format!("services/{}/{}", service.dma_id, service.local_id)
}

fn element_path(element: CompoundId) -> String {
    format!("elements/{}/{}", element.dma_id, element.local_id)
}

#[async_trait]
impl InventoryBackend for HttpBackend {
    async fn views(&self) -> Result<HashMap<ViewId, ViewInfo>, BackendError> {
        let views: Vec<ViewInfo> = self.fetch("views").await?;
        debug!(count = views.len(), "Fetched views");
        Ok(views.into_iter().map(|v| (v.id, v)).collect())
    }

    async fn views_for_service(&self, service: CompoundId) -> Result<Vec<ViewInfo>, BackendError> {
        let request = self.get(&format!("{}/views", service_path(service)));
        Ok(self.fetch_optional(request).await?.unwrap_or_default())
    }

    async fn views_for_element(&self, element: CompoundId) -> Result<Vec<ViewInfo>, BackendError> {
        let request = self.get(&format!("{}/views", element_path(element)));
        Ok(self.fetch_optional(request).await?.unwrap_or_default())
    }

    async fn view_state(&self, view_id: ViewId) -> Result<NativeSeverity, BackendError> {
        self.fetch_state(&format!("views/{}/state", view_id)).await
    }

    async fn service_state(&self, service: CompoundId) -> Result<NativeSeverity, BackendError> {
        self.fetch_state(&format!("{}/state", service_path(service)))
            .await
    }

    async fn element_state(&self, element: CompoundId) -> Result<NativeSeverity, BackendError> {
        self.fetch_state(&format!("{}/state", element_path(element)))
            .await
    }

    async fn parameter_state(
        &self,
        element: CompoundId,
        parameter_id: i32,
    ) -> Result<NativeSeverity, BackendError> {
        self.fetch_state(&format!(
            "{}/parameters/{}/state",
            element_path(element),
            parameter_id
        ))
        .await
    }

    async fn service_definition(
        &self,
        service: CompoundId,
    ) -> Result<Option<ServiceDefinition>, BackendError> {
        self.fetch_optional(self.get(&format!("{}/definition", service_path(service))))
            .await
    }

    async fn lite_service(&self, service: CompoundId) -> Result<Option<LiteService>, BackendError> {
        self.fetch_optional(self.get(&service_path(service))).await
    }

    async fn lite_element(&self, element: CompoundId) -> Result<Option<LiteElement>, BackendError> {
        self.fetch_optional(self.get(&element_path(element))).await
    }

    async fn element_protocol(
        &self,
        element: CompoundId,
    ) -> Result<Option<Vec<ProtocolParameter>>, BackendError> {
        self.fetch_optional(self.get(&format!("{}/protocol", element_path(element))))
            .await
    }

    async fn elements_in_view(
        &self,
        view_id: ViewId,
        query: &ElementQuery,
    ) -> Result<Vec<LiteElement>, BackendError> {
        let path = format!("views/{}/elements", view_id);
        let request = self.get(&path).query(&[
            ("includeSubViews", query.include_sub_views),
            ("includeHidden", query.include_hidden),
            ("includePaused", query.include_paused),
            ("includeStopped", query.include_stopped),
        ]);
        self.fetch_required(request, &path).await
    }

    async fn services_in_view(
        &self,
        view_id: ViewId,
        query: &ServiceQuery,
    ) -> Result<Vec<LiteService>, BackendError> {
        let path = format!("views/{}/services", view_id);
        let request = self
            .get(&path)
            .query(&[("includeSubViews", query.include_sub_views)]);
        self.fetch_required(request, &path).await
    }

    fn backend_name(&self) -> &str {
        "http"
    }
}
