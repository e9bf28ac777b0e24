//! Host data-source surface
//!
//! The query host drives a data source through four calls: declare columns, declare
//! input arguments, hand over the argument values, then pull pages. Results are never
//! split: the first page carries every row and reports no further pages.

use crate::backend::InventoryBackend;
use crate::error::QueryError;
use crate::resolver::{HierarchyResolver, ResolverConfig};
use crate::rows::Row;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// Value type of a column or argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ValueKind {
    String,
}

/// Declared output column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Column {
    pub name: &'static str,
    pub kind: ValueKind,
}

/// Declared input argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InputArgument {
    pub name: &'static str,
    pub kind: ValueKind,
    pub required: bool,
}

/// Fixed output schema, in row cell order.
pub const COLUMNS: [Column; 5] = [
    Column {
        name: "Id",
        kind: ValueKind::String,
    },
    Column {
        name: "Type",
        kind: ValueKind::String,
    },
    Column {
        name: "Name",
        kind: ValueKind::String,
    },
    Column {
        name: "Severity",
        kind: ValueKind::String,
    },
    Column {
        name: "Key",
        kind: ValueKind::String,
    },
];

pub const FILTER_ARGUMENT: InputArgument = InputArgument {
    name: "Filter",
    kind: ValueKind::String,
    required: false,
};

const INPUT_ARGUMENTS: [InputArgument; 1] = [FILTER_ARGUMENT];

/// One page of results
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    pub rows: Vec<Row>,
    pub has_next_page: bool,
}

/// Query-host data source protocol
#[async_trait]
pub trait DataSource: Send + Sync {
    fn columns(&self) -> &[Column];

    fn input_arguments(&self) -> &[InputArgument];

    /// Receive the argument values for the next query.
    fn on_arguments_processed(&mut self, filter: Option<String>);

    async fn next_page(&self) -> Result<Page, QueryError>;
}

/// Inventory browser data source
pub struct InventoryDataSource {
    resolver: HierarchyResolver,
    filter: Option<String>,
}

impl InventoryDataSource {
    pub fn new(backend: Arc<dyn InventoryBackend>, config: ResolverConfig) -> Self {
        Self {
            resolver: HierarchyResolver::new(backend, config),
            filter: None,
        }
    }

    /// The raw filter token as received, unparsed.
    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }
}

#[async_trait]
impl DataSource for InventoryDataSource {
    fn columns(&self) -> &[Column] {
        &COLUMNS
    }

    fn input_arguments(&self) -> &[InputArgument] {
        &INPUT_ARGUMENTS
    }

    fn on_arguments_processed(&mut self, filter: Option<String>) {
        self.filter = filter;
    }

    async fn next_page(&self) -> Result<Page, QueryError> {
        let rows = self.resolver.resolve_filter(self.filter.as_deref()).await?;
        info!(
            filter = self.filter.as_deref().unwrap_or(""),
            rows = rows.len(),
            "Served inventory page"
        );
        Ok(Page {
            rows,
            has_next_page: false,
        })
    }
}
