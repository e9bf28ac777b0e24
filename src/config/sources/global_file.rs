//! Global config file source: $XDG_CONFIG_HOME/drilldown/config.toml, or the platform
//! config directory when XDG_CONFIG_HOME is unset.

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File};
use std::path::PathBuf;
use tracing::debug;

/// Path to global config file.
pub fn global_config_path() -> Option<PathBuf> {
    let config_home = match std::env::var_os("XDG_CONFIG_HOME") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => directories::BaseDirs::new()?.config_dir().to_path_buf(),
    };
    Some(config_home.join("drilldown").join("config.toml"))
}

/// Add global config file source to builder if it exists.
pub fn add_to_builder(
    mut builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    if let Some(path) = global_config_path() {
        if path.exists() {
            builder = builder.add_source(File::from(path).required(false));
        } else {
            debug!(
                config_path = %path.display(),
                "No global configuration file; using defaults"
            );
        }
    }
    Ok(builder)
}
