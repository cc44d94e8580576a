//! Command-line interface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Escape room controller: polls the room's boards over serial and plays
/// audio cues in response.
#[derive(Debug, Parser)]
#[command(name = "puzzlebox", version, about)]
pub struct Cli {
    /// Log level used when RUST_LOG is unset (overrides the config file).
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Connect to the boards and run sessions, one per press of Enter.
    Run(RunArgs),

    /// Validate the configuration, including clip files, and print a summary.
    Check(ConfigArgs),

    /// Print every message from every board without reacting to it.
    Monitor(ConfigArgs),
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Deployment configuration file.
    #[arg(short, long, default_value = "puzzlebox.toml")]
    pub config: PathBuf,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Do not open serial ports; read `<device> <code>` lines from stdin
    /// during a session instead.
    #[arg(long)]
    pub simulate: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_with_defaults() {
        let cli = Cli::try_parse_from(["puzzlebox", "run"]).unwrap();
        match cli.command {
            Command::Run(args) => {
                assert_eq!(args.config.config, PathBuf::from("puzzlebox.toml"));
                assert!(!args.simulate);
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert!(cli.log_level.is_none());
    }

    #[test]
    fn test_global_log_level_after_subcommand() {
        let cli = Cli::try_parse_from([
            "puzzlebox",
            "monitor",
            "--config",
            "config/engine-room.toml",
            "--log-level",
            "debug",
        ])
        .unwrap();

        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert!(matches!(
            cli.command,
            Command::Monitor(ConfigArgs { ref config }) if config == &PathBuf::from("config/engine-room.toml")
        ));
    }

    #[test]
    fn test_check_short_config_flag() {
        let cli = Cli::try_parse_from(["puzzlebox", "check", "-c", "room.toml"]).unwrap();
        assert!(matches!(cli.command, Command::Check(_)));
    }

    #[test]
    fn test_simulate_flag() {
        let cli = Cli::try_parse_from(["puzzlebox", "run", "--simulate"]).unwrap();
        assert!(matches!(cli.command, Command::Run(RunArgs { simulate: true, .. })));
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["puzzlebox"]).is_err());
    }
}
