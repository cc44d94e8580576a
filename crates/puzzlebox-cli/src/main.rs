//! `puzzlebox` binary entry point.
//!
//! Loads the deployment configuration, installs logging and dispatches to a
//! subcommand. Everything runs on a single-threaded runtime: the room is
//! driven by one cooperative loop.

mod cli;
mod commands;

use std::path::Path;

use anyhow::Context;
use clap::Parser;
use puzzlebox_core::PuzzleConfig;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Run(args) => {
            let config = load_config(&args.config.config, cli.log_level.as_deref())?;
            commands::run::run(config, args.simulate).await
        }
        Command::Check(args) => {
            let config = load_config(&args.config, cli.log_level.as_deref())?;
            commands::check::check(&config)
        }
        Command::Monitor(args) => {
            let config = load_config(&args.config, cli.log_level.as_deref())?;
            commands::monitor::monitor(config).await
        }
    }
}

/// Load the configuration and install logging at the requested level.
fn load_config(path: &Path, log_level: Option<&str>) -> anyhow::Result<PuzzleConfig> {
    let config = PuzzleConfig::load(path)
        .with_context(|| format!("failed to load configuration from {}", path.display()))?;
    init_logging(log_level.unwrap_or(&config.log_level));
    tracing::debug!(
        "Loaded {} (config version {})",
        path.display(),
        config.config_version
    );
    Ok(config)
}

/// `RUST_LOG` takes precedence over `level`.
fn init_logging(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_target(false)
        .init();
}
