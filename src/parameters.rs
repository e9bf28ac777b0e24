//! Which protocol parameters are shown as children of an element.

use crate::backend::ProtocolParameter;

/// A parameter is listed only when it is a read, non-table value that is placed on a
/// display page and trends with averaging.
pub fn include(parameter: &ProtocolParameter) -> bool {
    !parameter.write_type
        && !parameter.is_table
        && !parameter.is_table_column
        && !parameter.positions.is_empty()
        && parameter.has_trending_average
}

/// Displayable parameters, in protocol order.
pub fn displayable(parameters: &[ProtocolParameter]) -> impl Iterator<Item = &ProtocolParameter> {
    parameters.iter().filter(|p| include(p))
}
