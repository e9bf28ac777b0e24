//! CLI route: single route table and run context. Dispatches to the data source and presentation.

use crate::backend::{BackendFactory, BackendKind};
use crate::cli::parse::{Commands, ConfigCommands, OutputFormat};
use crate::cli::presentation::{
    format_columns_json, format_columns_text, format_page_json, format_page_text,
    format_target_text, format_validation_text,
};
use crate::config::{ConfigLoader, DrilldownConfig};
use crate::error::QueryError;
use crate::navigation::parse_filter;
use crate::source::{DataSource, InventoryDataSource, COLUMNS, FILTER_ARGUMENT};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info};

/// Command name for logs (e.g. "browse", "config.validate").
pub fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Browse { .. } => "browse",
        Commands::Columns { .. } => "columns",
        Commands::Parse { .. } => "parse",
        Commands::Config {
            command: ConfigCommands::Validate,
        } => "config.validate",
    }
}

/// Runtime context for CLI execution: workspace, effective configuration, output styling.
/// Built from workspace path and optional config path using ConfigLoader only.
pub struct RunContext {
    workspace_root: PathBuf,
    config: DrilldownConfig,
    color: bool,
}

impl RunContext {
    /// Create run context from workspace root and optional config path.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, QueryError> {
        let config = if let Some(ref cfg_path) = config_path {
            ConfigLoader::load_from_file(cfg_path)?
        } else {
            ConfigLoader::load(&workspace_root)?
        };
        let color = config.logging.color && std::io::stdout().is_terminal();
        Ok(Self {
            workspace_root,
            config,
            color,
        })
    }

    /// Point the backend at a snapshot file or an HTTP endpoint, replacing the configured kind.
    pub fn with_backend_override(
        mut self,
        snapshot: Option<PathBuf>,
        endpoint: Option<String>,
    ) -> Self {
        if let Some(path) = snapshot {
            self.config.backend.kind = BackendKind::Snapshot;
            self.config.backend.snapshot_path = Some(path);
        } else if let Some(url) = endpoint {
            self.config.backend.kind = BackendKind::Http;
            self.config.backend.endpoint = Some(url);
        }
        self
    }

    /// Force colors on or off (tests and non-terminal callers).
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn config(&self) -> &DrilldownConfig {
        &self.config
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String, QueryError> {
        let started = Instant::now();
        let result = self.execute_inner(command);
        info!(
            command = command_name(command),
            ok = result.is_ok(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Command finished"
        );
        result
    }

    fn execute_inner(&self, command: &Commands) -> Result<String, QueryError> {
        match command {
            Commands::Browse { filter, format } => self.handle_browse(filter.clone(), *format),
            Commands::Columns { format } => match format {
                OutputFormat::Text => Ok(format_columns_text(&COLUMNS, &[FILTER_ARGUMENT])),
                OutputFormat::Json => format_columns_json(&COLUMNS, &[FILTER_ARGUMENT]),
            },
            Commands::Parse { filter } => {
                let target = parse_filter(Some(filter))?;
                Ok(format_target_text(&target))
            }
            Commands::Config {
                command: ConfigCommands::Validate,
            } => self.handle_config_validate(),
        }
    }

    fn handle_browse(
        &self,
        filter: Option<String>,
        format: OutputFormat,
    ) -> Result<String, QueryError> {
        let backend = BackendFactory::create(&self.config.backend)?;
        debug!(
            backend = backend.backend_name(),
            workspace = %self.workspace_root.display(),
            "Backend ready"
        );

        let mut source = InventoryDataSource::new(backend, self.config.resolver.clone());
        source.on_arguments_processed(filter);

        let rt = tokio::runtime::Runtime::new()
            .map_err(|e| QueryError::ConfigError(format!("Failed to create runtime: {}", e)))?;
        let page = rt.block_on(source.next_page())?;

        match format {
            OutputFormat::Text => Ok(format_page_text(&page, self.color)),
            OutputFormat::Json => format_page_json(&page),
        }
    }

    fn handle_config_validate(&self) -> Result<String, QueryError> {
        match self.config.validate() {
            Ok(()) => Ok(format_validation_text(&[], self.color)),
            Err(errors) => Err(QueryError::ConfigError(format_validation_text(&errors, false))),
        }
    }
}
