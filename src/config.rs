//! Configuration System
//!
//! Layered configuration for the backend adapter, the resolver and logging. Sources merge
//! in order: built-in defaults, global file, workspace files, then `DRILLDOWN__*`
//! environment variables.

use crate::error::QueryError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use crate::backend::{BackendConfig, BackendKind};
pub use crate::logging::LoggingConfig;
pub use crate::resolver::ResolverConfig;

mod merge_policy;
mod sources;

pub use sources::global_file::global_config_path;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DrilldownConfig {
    /// Inventory backend adapter
    #[serde(default)]
    pub backend: BackendConfig,

    /// Resolver tuning
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Configuration validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    Backend(String),
    Resolver(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Backend(msg) => write!(f, "Backend: {}", msg),
            ValidationError::Resolver(msg) => write!(f, "Resolver: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl DrilldownConfig {
    /// Validate the entire configuration, collecting every problem.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.backend.validate() {
            errors.push(ValidationError::Backend(e));
        }
        if let Err(e) = self.resolver.validate() {
            errors.push(ValidationError::Resolver(e));
        }
        if let Err(e) = self.logging.validate() {
            errors.push(ValidationError::Logging(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate and fold all problems into one error.
    pub fn validated(self) -> Result<Self, QueryError> {
        self.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            QueryError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })?;
        Ok(self)
    }

    /// Anchor a relative snapshot path at the workspace root.
    pub fn resolve_paths(&mut self, workspace_root: &Path) {
        if let Some(path) = &self.backend.snapshot_path {
            if path.is_relative() {
                self.backend.snapshot_path = Some(workspace_root.join(path));
            }
        }
    }
}

/// Loads [`DrilldownConfig`] from the layered sources
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a workspace.
    pub fn load(workspace_root: &Path) -> Result<DrilldownConfig, QueryError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = sources::global_file::add_to_builder(builder)?;
        let builder = sources::workspace_file::add_to_builder(builder, workspace_root)?;
        let builder = sources::environment::add_to_builder(builder);

        let mut config: DrilldownConfig = builder.build()?.try_deserialize()?;
        config.resolve_paths(workspace_root);
        Ok(config)
    }

    /// Load one explicit file over the defaults. Relative paths resolve against the
    /// file's directory.
    pub fn load_from_file(path: &Path) -> Result<DrilldownConfig, QueryError> {
        if !path.exists() {
            return Err(QueryError::ConfigError(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        let builder = merge_policy::builder_with_defaults()?
            .add_source(config::File::from(path.to_path_buf()).required(true));

        let mut config: DrilldownConfig = builder.build()?.try_deserialize()?;
        let base = path.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."));
        config.resolve_paths(&base);
        Ok(config)
    }
}
