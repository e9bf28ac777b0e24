//! drilldown: Drill-Down Inventory Browser
//!
//! Query engine that lets an operator navigate a monitored-infrastructure inventory one
//! level at a time. Each query takes one opaque navigation token and returns one flat row
//! set: breadcrumbs to the parent level, a separator row, then the children of the
//! current node, each annotated with an alarm severity.

pub mod backend;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod navigation;
pub mod parameters;
pub mod resolver;
pub mod rows;
pub mod severity;
pub mod source;
pub mod types;

pub use error::{BackendError, FilterError, QueryError};
pub use navigation::{parse_filter, NavigationTarget};
pub use resolver::{HierarchyResolver, ResolverConfig};
pub use rows::{Row, RowType};
pub use severity::{map_severity, NativeSeverity, Severity};
pub use source::{DataSource, InventoryDataSource, Page};
pub use types::{CompoundId, ViewId, ROOT_VIEW_ID};
