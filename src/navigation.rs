//! Navigation targets
//!
//! Parses the opaque filter token a host passes in into a typed [`NavigationTarget`].
//!
//! Grammar:
//! - `""` or no token: root
//! - `View:<id>`
//! - `Service:<dma>/<sid>`
//! - `Element:<dma>/<eid>`
//! - `Parameter:<dma>/<eid>[/<pid>]`

use crate::error::FilterError;
use crate::types::{parse_id, CompoundId, ViewId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What a single query navigates to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NavigationTarget {
    Root,
    View { view_id: ViewId },
    Service { service: CompoundId },
    Element { element: CompoundId },
    /// Resolves exactly like the owning element. `parameter_id` is kept so row keys
    /// render back to the same token, but it does not narrow the result.
    Parameter {
        element: CompoundId,
        parameter_id: Option<i32>,
    },
}

impl NavigationTarget {
    pub fn kind(&self) -> &'static str {
        match self {
            NavigationTarget::Root => "Root",
            NavigationTarget::View { .. } => "View",
            NavigationTarget::Service { .. } => "Service",
            NavigationTarget::Element { .. } => "Element",
            NavigationTarget::Parameter { .. } => "Parameter",
        }
    }
}

/// Parse an optional filter token. Absent and empty tokens are the root.
pub fn parse_filter(token: Option<&str>) -> Result<NavigationTarget, FilterError> {
    match token {
        None => Ok(NavigationTarget::Root),
        Some(t) => t.parse(),
    }
}

impl FromStr for NavigationTarget {
    type Err = FilterError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        if token.is_empty() {
            return Ok(NavigationTarget::Root);
        }

        let (kind, payload) = match token.split_once(':') {
            Some((kind, payload)) => (kind, payload),
            None => (token, ""),
        };

        if !matches!(kind, "View" | "Service" | "Element" | "Parameter") {
            return Err(FilterError::UnknownKind(kind.to_string()));
        }
        if payload.is_empty() {
            return Err(FilterError::MissingPayload(token.to_string()));
        }

        match kind {
            "View" => Ok(NavigationTarget::View {
                view_id: parse_id("view", payload)?,
            }),
            "Service" => Ok(NavigationTarget::Service {
                service: payload.parse()?,
            }),
            "Element" => Ok(NavigationTarget::Element {
                element: payload.parse()?,
            }),
            _ => parse_parameter(payload),
        }
    }
}

fn parse_parameter(payload: &str) -> Result<NavigationTarget, FilterError> {
    let segments: Vec<&str> = payload.split('/').collect();
    if segments.len() != 2 && segments.len() != 3 {
        return Err(FilterError::SegmentCount {
            kind: "Parameter",
            expected: "2 or 3",
            found: segments.len(),
        });
    }

    let element = CompoundId::new(
        parse_id("DMA", segments[0])?,
        parse_id("element", segments[1])?,
    );
    let parameter_id = match segments.get(2) {
        Some(pid) => Some(parse_id("parameter", pid)?),
        None => None,
    };

    Ok(NavigationTarget::Parameter {
        element,
        parameter_id,
    })
}

impl fmt::Display for NavigationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavigationTarget::Root => Ok(()),
            NavigationTarget::View { view_id } => write!(f, "View:{}", view_id),
            NavigationTarget::Service { service } => write!(f, "Service:{}", service),
            NavigationTarget::Element { element } => write!(f, "Element:{}", element),
            NavigationTarget::Parameter {
                element,
                parameter_id: Some(pid),
            } => write!(f, "Parameter:{}/{}", element, pid),
            NavigationTarget::Parameter {
                element,
                parameter_id: None,
            } => write!(f, "Parameter:{}", element),
        }
    }
}
