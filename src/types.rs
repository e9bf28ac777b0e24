//! Identifier types shared across the engine.

use crate::error::FilterError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// View identifier. The hierarchy root is the view with id [`ROOT_VIEW_ID`].
pub type ViewId = i32;

/// Sentinel id of the root view.
pub const ROOT_VIEW_ID: ViewId = -1;

/// Compound identity of an element or service: the agent (DMA) id plus the local id.
///
/// The text form is `"{dma_id}/{local_id}"` and round-trips through [`FromStr`].
/// Serialized in that text form as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CompoundId {
    pub dma_id: i32,
    pub local_id: i32,
}

impl CompoundId {
    pub fn new(dma_id: i32, local_id: i32) -> Self {
        Self { dma_id, local_id }
    }
}

impl fmt::Display for CompoundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.dma_id, self.local_id)
    }
}

impl FromStr for CompoundId {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('/').collect();
        if parts.len() != 2 {
            return Err(FilterError::SegmentCount {
                kind: "compound id",
                expected: "2",
                found: parts.len(),
            });
        }
        Ok(Self {
            dma_id: parse_id("DMA", parts[0])?,
            local_id: parse_id("local", parts[1])?,
        })
    }
}

impl TryFrom<String> for CompoundId {
    type Error = FilterError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CompoundId> for String {
    fn from(id: CompoundId) -> Self {
        id.to_string()
    }
}

/// Parse one numeric id segment. Surrounding whitespace is not trimmed.
pub(crate) fn parse_id(kind: &'static str, value: &str) -> Result<i32, FilterError> {
    value.parse::<i32>().map_err(|_| FilterError::InvalidId {
        kind,
        value: value.to_string(),
    })
}
