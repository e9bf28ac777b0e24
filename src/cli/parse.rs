//! CLI parse: clap types for drilldown. No behavior; definitions only.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Drill-down inventory browser
#[derive(Parser)]
#[command(name = "drilldown")]
#[command(about = "Browse a view/service/element/parameter inventory one level at a time")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Browse an inventory snapshot file (JSON or TOML) instead of the configured backend
    #[arg(long, conflicts_with = "endpoint")]
    pub snapshot: Option<PathBuf>,

    /// Browse a live inventory over HTTP instead of the configured backend
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Enable verbose logging (debug level)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one query and print its rows
    Browse {
        /// Navigation token, e.g. "View:5", "Service:1/7", "Element:1/20" (omit for the root)
        filter: Option<String>,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Print the column schema and input arguments
    Columns {
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Parse a navigation token and print the result
    Parse {
        /// Navigation token
        filter: String,
    },
    /// Configuration commands
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Load and validate the effective configuration
    Validate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
