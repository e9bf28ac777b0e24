//! Error types for the drilldown inventory query engine.

use crate::types::{CompoundId, ViewId};
use thiserror::Error;

/// Filter token parse errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("Unknown filter kind: '{0}'")]
    UnknownKind(String),

    #[error("Filter '{0}' has no payload after ':'")]
    MissingPayload(String),

    #[error("Invalid {kind} id: '{value}'")]
    InvalidId { kind: &'static str, value: String },

    #[error("{kind} filter expects {expected} path segments, got {found}")]
    SegmentCount {
        kind: &'static str,
        expected: &'static str,
        found: usize,
    },
}

/// Inventory backend errors
///
/// Retry and backoff belong to the backend client; the resolver propagates these unchanged.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Backend transport error: {0}")]
    Transport(String),

    #[error("Backend request timed out: {0}")]
    Timeout(String),

    #[error("Backend returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed backend response: {0}")]
    MalformedResponse(String),

    #[error("Snapshot error: {0}")]
    Snapshot(String),
}

/// Query errors surfaced to the host
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Unknown filter: {0}")]
    UnknownFilter(#[from] FilterError),

    #[error("View not found: {0}")]
    ViewNotFound(ViewId),

    #[error("Service not found: {0}")]
    ServiceNotFound(CompoundId),

    #[error("Element not found: {0}")]
    ElementNotFound(CompoundId),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl QueryError {
    /// True for the not-found family, regardless of entity kind.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            QueryError::ViewNotFound(_)
                | QueryError::ServiceNotFound(_)
                | QueryError::ElementNotFound(_)
        )
    }
}

impl From<config::ConfigError> for QueryError {
    fn from(err: config::ConfigError) -> Self {
        QueryError::ConfigError(err.to_string())
    }
}
