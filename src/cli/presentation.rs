//! CLI presentation: text and json formatters per command.

use crate::config::ValidationError;
use crate::error::QueryError;
use crate::navigation::NavigationTarget;
use crate::severity::Severity;
use crate::source::{Column, InputArgument, Page};
use comfy_table::{Cell, Color, Table};
use owo_colors::OwoColorize;

fn severity_color(severity: Severity) -> Option<Color> {
    match severity {
        Severity::Critical => Some(Color::Red),
        Severity::Major => Some(Color::DarkRed),
        Severity::Minor => Some(Color::Yellow),
        Severity::Warning => Some(Color::DarkYellow),
        Severity::Normal => Some(Color::Green),
        Severity::Timeout | Severity::Error => Some(Color::Magenta),
        Severity::Notice | Severity::Information | Severity::Suggestion => Some(Color::Cyan),
        Severity::Undefined => None,
    }
}

fn render_cell(value: Option<&str>) -> String {
    value.unwrap_or("-").to_string()
}

/// Render a page as a table. The separator row is drawn dimmed; `color` toggles severity colors.
pub fn format_page_text(page: &Page, color: bool) -> String {
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(vec!["Id", "Type", "Name", "Severity", "Key"]);

    for row in &page.rows {
        let cells = row.cells();
        if row.is_separator() {
            let text: Vec<Cell> = cells
                .iter()
                .map(|c| {
                    let cell = Cell::new(render_cell(*c));
                    if color {
                        cell.fg(Color::DarkGrey)
                    } else {
                        cell
                    }
                })
                .collect();
            table.add_row(text);
            continue;
        }
        let mut row_cells: Vec<Cell> = cells.iter().map(|c| Cell::new(render_cell(*c))).collect();
        if color {
            if let Some(fg) = severity_color(row.severity()) {
                row_cells[3] = Cell::new(row.severity().label()).fg(fg);
            }
        }
        table.add_row(row_cells);
    }

    let mut output = table.to_string();
    output.push_str(&format!("\n{} rows", page.rows.len()));
    output
}

pub fn format_page_json(page: &Page) -> Result<String, QueryError> {
    serde_json::to_string_pretty(page)
        .map_err(|e| QueryError::ConfigError(format!("Failed to serialize page: {}", e)))
}

pub fn format_columns_text(columns: &[Column], arguments: &[InputArgument]) -> String {
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(vec!["Column", "Type"]);
    for column in columns {
        table.add_row(vec![column.name.to_string(), format!("{:?}", column.kind)]);
    }

    let mut args = Table::new();
    args.load_preset(comfy_table::presets::UTF8_FULL);
    args.set_header(vec!["Argument", "Type", "Required"]);
    for argument in arguments {
        args.add_row(vec![
            argument.name.to_string(),
            format!("{:?}", argument.kind),
            if argument.required { "yes" } else { "no" }.to_string(),
        ]);
    }
    format!("{}\n{}", table, args)
}

pub fn format_columns_json(
    columns: &[Column],
    arguments: &[InputArgument],
) -> Result<String, QueryError> {
    serde_json::to_string_pretty(&serde_json::json!({
        "columns": columns,
        "input_arguments": arguments,
    }))
    .map_err(|e| QueryError::ConfigError(format!("Failed to serialize schema: {}", e)))
}

/// Describe a parsed target along with the token it renders back to.
pub fn format_target_text(target: &NavigationTarget) -> String {
    let mut lines = vec![format!("Kind:   {}", target.kind())];
    match target {
        NavigationTarget::Root => {}
        NavigationTarget::View { view_id } => lines.push(format!("View:   {}", view_id)),
        NavigationTarget::Service { service } => lines.push(format!("Service: {}", service)),
        NavigationTarget::Element { element } => lines.push(format!("Element: {}", element)),
        NavigationTarget::Parameter {
            element,
            parameter_id,
        } => {
            lines.push(format!("Element: {}", element));
            if let Some(pid) = parameter_id {
                lines.push(format!("Parameter: {} (ignored when resolving)", pid));
            }
        }
    }
    lines.push(format!("Token:  {:?}", target.to_string()));
    lines.join("\n")
}

pub fn format_validation_text(errors: &[ValidationError], color: bool) -> String {
    if errors.is_empty() {
        let ok = "Configuration is valid";
        return if color {
            format!("{}", ok.green())
        } else {
            ok.to_string()
        };
    }
    let mut output = format!("{} configuration error(s):", errors.len());
    for e in errors {
        if color {
            output.push_str(&format!("\n  {} {}", "✗".red(), e));
        } else {
            output.push_str(&format!("\n  ✗ {}", e));
        }
    }
    output
}
