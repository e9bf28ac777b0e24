//! CLI domain: parse, route, output, and presentation only.
//! Route table dispatches to the data source; no resolution logic lives here.

mod output;
mod parse;
mod presentation;
mod route;

pub use output::map_error;
pub use parse::{Cli, Commands, ConfigCommands, OutputFormat};
pub use presentation::{
    format_columns_json, format_columns_text, format_page_json, format_page_text,
    format_target_text, format_validation_text,
};
pub use route::{command_name, RunContext};
