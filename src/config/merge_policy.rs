//! Merge rules: defaults first, every later source overrides earlier keys.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("backend.kind", "snapshot")?
        .set_default("backend.connect_timeout_secs", 10)?
        .set_default("backend.request_timeout_secs", 30)?
        .set_default("resolver.severity_concurrency", 8)?
        .set_default("logging.level", "warn")?
        .set_default("logging.format", "text")?
        .set_default("logging.output", "stderr")
}
