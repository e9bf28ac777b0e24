//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::QueryError;

/// Map a query error to the line printed on stderr.
pub fn map_error(e: &QueryError) -> String {
    match e {
        QueryError::UnknownFilter(_) => format!("{} (see `drilldown parse --help`)", e),
        _ => e.to_string(),
    }
}
