//! Result rows
//!
//! Every row has the same five cells: Id, Type, Name, Severity, Key. Data rows key
//! themselves as `"{Type}:{Id}"`; the separator row echoes the raw filter token instead.

use crate::backend::{LiteElement, LiteService, ProtocolParameter, ViewInfo};
use crate::severity::Severity;
use crate::types::CompoundId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of entity a row represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RowType {
    View,
    Service,
    Element,
    Parameter,
    Separator,
}

impl RowType {
    pub fn label(&self) -> &'static str {
        match self {
            RowType::View => "View",
            RowType::Service => "Service",
            RowType::Element => "Element",
            RowType::Parameter => "Parameter",
            RowType::Separator => "Separator",
        }
    }
}

impl fmt::Display for RowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One output row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    #[serde(rename = "Id")]
    id: Option<String>,
    #[serde(rename = "Type")]
    row_type: RowType,
    #[serde(rename = "Name")]
    name: Option<String>,
    #[serde(rename = "Severity")]
    severity: Severity,
    #[serde(rename = "Key")]
    key: Option<String>,
}

impl Row {
    pub fn create(
        id: Option<String>,
        row_type: RowType,
        name: Option<String>,
        severity: Severity,
        key: Option<String>,
    ) -> Self {
        Self {
            id,
            row_type,
            name,
            severity,
            key,
        }
    }

    /// Data row keyed `"{Type}:{Id}"`.
    pub fn keyed(id: String, row_type: RowType, name: impl Into<String>, severity: Severity) -> Self {
        let key = format!("{}:{}", row_type, id);
        Self::create(Some(id), row_type, Some(name.into()), severity, Some(key))
    }

    /// Marker between breadcrumbs and children; its key is the filter token exactly as given.
    pub fn separator(raw_filter: Option<&str>) -> Self {
        Self::create(
            None,
            RowType::Separator,
            None,
            Severity::Undefined,
            raw_filter.map(str::to_string),
        )
    }

    pub fn view(view: &ViewInfo, severity: Severity) -> Self {
        Self::keyed(view.id.to_string(), RowType::View, &view.name, severity)
    }

    pub fn service(service: &LiteService, severity: Severity) -> Self {
        Self::keyed(service.id.to_string(), RowType::Service, &service.name, severity)
    }

    pub fn element(element: &LiteElement, severity: Severity) -> Self {
        Self::keyed(element.id.to_string(), RowType::Element, &element.name, severity)
    }

    pub fn parameter(element: CompoundId, parameter: &ProtocolParameter, severity: Severity) -> Self {
        Self::keyed(
            format!("{}/{}", element, parameter.id),
            RowType::Parameter,
            &parameter.name,
            severity,
        )
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn row_type(&self) -> RowType {
        self.row_type
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn is_separator(&self) -> bool {
        self.row_type == RowType::Separator
    }

    /// Cells in column order: Id, Type, Name, Severity, Key.
    pub fn cells(&self) -> [Option<&str>; 5] {
        [
            self.id(),
            Some(self.row_type.label()),
            self.name(),
            Some(self.severity.label()),
            self.key(),
        ]
    }
}
