//! Contains the omni CLI.

use crate::commands::NetworkCommand;
use anyhow::Result;
use clap::{Parser, Subcommand};
use omni_cli::{LogArgs, LogConfig, MetricsArgs, cli_styles};

/// Subcommands for the CLI.
#[derive(Debug, PartialEq, Eq, Clone, Subcommand)]
pub enum Commands {
    /// Inspects a network config.
    #[command(subcommand, alias = "net")]
    Network(NetworkCommand),
}

/// Global arguments of every subcommand.
#[derive(Debug, Clone, PartialEq, Eq, clap::Args)]
pub struct GlobalArgs {
    /// Log args.
    #[command(flatten)]
    pub log_args: LogArgs,
    /// Prometheus metrics args.
    #[command(flatten)]
    pub metrics: MetricsArgs,
}

/// The omni CLI.
#[derive(Parser, Clone, Debug)]
#[command(author, version, about, styles = cli_styles(), long_about = None)]
pub struct Cli {
    /// The subcommand to run.
    #[command(subcommand)]
    pub subcommand: Commands,
    /// Global arguments for the CLI.
    #[command(flatten)]
    pub global: GlobalArgs,
}

impl Cli {
    /// Runs the CLI.
    pub fn run(self) -> Result<()> {
        LogConfig::new(self.global.log_args.clone()).init_tracing_subscriber(None)?;
        self.global.metrics.init_metrics()?;

        match self.subcommand {
            Commands::Network(network) => network.run(&self.global),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{StreamsCommand, ValidateCommand};
    use omni_xchain::ConfLevel;
    use rstest::rstest;
    use std::path::PathBuf;

    #[rstest]
    #[case::validate(&["omni", "network", "validate", "-n", "net.json"])]
    #[case::alias(&["omni", "net", "validate", "--network-file", "net.json"])]
    #[case::global_flags_after(&["omni", "network", "validate", "-n", "net.json", "-v"])]
    fn test_parse_validate(#[case] args: &[&str]) {
        let cli = Cli::parse_from(args);
        let expected = ValidateCommand {
            network_file: PathBuf::from("net.json"),
            conf_level: ConfLevel::Latest,
            require_portals: false,
        };
        assert_eq!(cli.subcommand, Commands::Network(NetworkCommand::Validate(expected)));
    }

    #[rstest]
    #[case::latest("latest", ConfLevel::Latest)]
    #[case::safe("safe", ConfLevel::Safe)]
    #[case::finalized("finalized", ConfLevel::Finalized)]
    fn test_parse_conf_level(#[case] value: &str, #[case] expected: ConfLevel) {
        let cli = Cli::parse_from(["omni", "network", "streams", "-n", "x.json", "-c", value]);
        let Commands::Network(NetworkCommand::Streams(StreamsCommand { conf_level, .. })) =
            cli.subcommand
        else {
            panic!("expected streams subcommand");
        };
        assert_eq!(conf_level, expected);
    }

    #[test]
    fn test_invalid_conf_level() {
        let res = Cli::try_parse_from(["omni", "network", "streams", "-n", "x.json", "-c", "soft"]);
        assert!(res.is_err());
    }

    #[test]
    fn test_network_file_required() {
        assert!(Cli::try_parse_from(["omni", "network", "validate"]).is_err());
    }

    #[test]
    fn test_global_args() {
        let cli = Cli::parse_from([
            "omni",
            "-vv",
            "--metrics.enabled",
            "--metrics.port",
            "9100",
            "network",
            "streams",
            "-n",
            "x.json",
        ]);
        assert_eq!(cli.global.log_args.verbosity, 2);
        assert!(cli.global.metrics.enabled);
        assert_eq!(cli.global.metrics.port, 9100);
    }
}
