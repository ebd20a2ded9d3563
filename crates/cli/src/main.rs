//! post-insights CLI entry point

use anyhow::Result;
use clap::Parser;
use std::path::Path;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod args;
mod commands;
mod config;

use args::{Cli, Commands};
use config::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.log_level.as_deref(), cli.config.as_deref())?;

    // Execute command
    match cli.command {
        Commands::Analyze(args) => commands::analyze::execute(args, cli.config).await,
        Commands::Convert(args) => commands::convert::execute(args, cli.config).await,
        Commands::Competitors(args) => commands::competitors::execute(args, cli.config).await,
        Commands::Config(args) => commands::config::execute(args, cli.config).await,
    }
}

/// Level precedence: `--log-level`, then `RUST_LOG`, then `general.log_level`
fn init_logging(level: Option<&str>, config_path: Option<&Path>) -> Result<()> {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level)?,
        None => EnvFilter::try_from_default_env().or_else(|_| {
            let level = AppConfig::load(config_path)
                .map(|config| config.general.log_level)
                .unwrap_or_else(|_| "info".to_string());
            EnvFilter::try_new(level)
        })?,
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();

    Ok(())
}
