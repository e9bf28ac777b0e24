//! drilldown CLI Binary
//!
//! Command-line front end for the drill-down inventory browser.

use anyhow::Context;
use clap::Parser;
use drilldown::cli::{command_name, Cli, RunContext};
use drilldown::config::ConfigLoader;
use drilldown::logging::{init_logging, LoggingConfig};
use std::process;
use tracing::{error, info};

fn main() {
    let cli = Cli::parse();

    // Build logging config from CLI args, env vars, and config file
    let logging_config = build_logging_config(&cli);

    if let Err(e) = init_logging(Some(&logging_config)) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    info!(command = command_name(&cli.command), "drilldown starting");

    let context = match build_context(&cli) {
        Ok(ctx) => ctx,
        Err(e) => {
            error!("Error initializing: {:#}", e);
            eprintln!("{:#}", e);
            process::exit(1);
        }
    };

    match context.execute(&cli.command) {
        Ok(output) => {
            info!("Command completed successfully");
            println!("{}", output);
        }
        Err(e) => {
            error!("Command failed: {}", e);
            eprintln!("{}", drilldown::cli::map_error(&e));
            process::exit(1);
        }
    }
}

fn build_context(cli: &Cli) -> anyhow::Result<RunContext> {
    let context = RunContext::new(cli.workspace.clone(), cli.config.clone()).with_context(|| {
        match &cli.config {
            Some(path) => format!("Failed to load configuration from {}", path.display()),
            None => format!(
                "Failed to load configuration for workspace {}",
                cli.workspace.display()
            ),
        }
    })?;
    Ok(context.with_backend_override(cli.snapshot.clone(), cli.endpoint.clone()))
}

/// Build logging configuration from CLI args, environment, and config file.
/// Precedence: CLI flags override config file override defaults.
fn build_logging_config(cli: &Cli) -> LoggingConfig {
    let mut config = if let Some(ref config_path) = cli.config {
        ConfigLoader::load_from_file(config_path)
            .ok()
            .map(|c| c.logging)
            .unwrap_or_default()
    } else {
        ConfigLoader::load(&cli.workspace)
            .ok()
            .map(|c| c.logging)
            .unwrap_or_default()
    };

    if cli.verbose {
        config.level = "debug".to_string();
    }
    if let Some(ref level) = cli.log_level {
        config.level = level.clone();
    }
    if let Some(ref format) = cli.log_format {
        config.format = format.clone();
    }
    if let Some(ref output) = cli.log_output {
        config.output = output.clone();
    }
    if let Some(ref file) = cli.log_file {
        config.file = Some(file.clone());
    }

    config
}
