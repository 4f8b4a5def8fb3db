//! Network Subcommands

use crate::cli::GlobalArgs;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use omni_netconf::{Network, load};
use omni_xchain::{ConfLevel, ConfirmationRule, StreamId, stream_name, verify_conf_levels};
use std::path::{Path, PathBuf};
use tabled::{
    Table, Tabled,
    settings::{Alignment, Style, object::Columns},
};
use tracing::info;

/// The `network` Subcommand
///
/// # Usage
///
/// ```sh
/// omni network <validate|streams> [FLAGS] [OPTIONS]
/// ```
#[derive(Subcommand, PartialEq, Eq, Debug, Clone)]
pub enum NetworkCommand {
    /// Validates a network config and prints its chains.
    #[command(alias = "v")]
    Validate(ValidateCommand),
    /// Lists the streams between the EVM chains of a network.
    #[command(alias = "s")]
    Streams(StreamsCommand),
}

impl NetworkCommand {
    /// Runs the subcommand.
    pub fn run(self, args: &GlobalArgs) -> Result<()> {
        match self {
            Self::Validate(validate) => validate.run(args),
            Self::Streams(streams) => streams.run(args),
        }
    }
}

/// Validates a network config.
#[derive(Parser, PartialEq, Eq, Debug, Clone)]
pub struct ValidateCommand {
    /// Path of the network config file.
    #[arg(long, short = 'n', env = "OMNI_NETWORK_FILE")]
    pub network_file: PathBuf,
    /// Level every EVM chain must be able to stream at.
    #[arg(long, short = 'c', default_value = "latest")]
    pub conf_level: ConfLevel,
    /// Also require a deployed portal on every EVM chain.
    #[arg(long)]
    pub require_portals: bool,
}

impl ValidateCommand {
    /// Runs the subcommand.
    pub fn run(self, _args: &GlobalArgs) -> Result<()> {
        let (network, rules) = self.check()?;
        info!(
            target: "cli",
            network = %network.id,
            chains = network.chains.len(),
            conf_level = %self.conf_level,
            "Network config is valid"
        );

        let mut table = Table::new(chain_rows(&network, &rules));
        table.with(Style::modern());
        table.modify(Columns::first(), Alignment::right());
        println!("{table}");
        Ok(())
    }

    /// Loads and checks the network, returning it with the confirmation rules of its EVM
    /// chains.
    pub fn check(&self) -> Result<(Network, Vec<ConfirmationRule>)> {
        let network = load_network(&self.network_file)?;
        network.validate().context("invalid network config")?;
        if self.require_portals {
            network.ensure_portals_deployed()?;
        }

        let evm_chains = network.evm_chains().map(|chain| chain.id);
        let rules = verify_conf_levels(&network, evm_chains, self.conf_level)?;
        Ok((network, rules))
    }
}

/// Lists the streams of a network.
#[derive(Parser, PartialEq, Eq, Debug, Clone)]
pub struct StreamsCommand {
    /// Path of the network config file.
    #[arg(long, short = 'n', env = "OMNI_NETWORK_FILE")]
    pub network_file: PathBuf,
    /// Level of the streams.
    #[arg(long, short = 'c', default_value = "finalized")]
    pub conf_level: ConfLevel,
}

impl StreamsCommand {
    /// Runs the subcommand.
    pub fn run(self, _args: &GlobalArgs) -> Result<()> {
        let network = load_network(&self.network_file)?;
        for name in stream_names(&network, self.conf_level) {
            println!("{name}");
        }
        Ok(())
    }
}

fn load_network(path: &Path) -> Result<Network> {
    load(path).with_context(|| format!("failed to load network config {}", path.display()))
}

/// Returns the names of the streams between every pair of distinct EVM chains.
pub fn stream_names(network: &Network, conf_level: ConfLevel) -> Vec<String> {
    let chains: Vec<_> = network.evm_chains().map(|chain| chain.id).collect();
    chains
        .iter()
        .flat_map(|src| chains.iter().filter(move |dst| *dst != src).map(move |dst| (*src, *dst)))
        .map(|(src, dst)| stream_name(network, StreamId::new(src, dst, conf_level.shard())))
        .collect()
}

/// A row of the chains table.
#[derive(Debug, Clone, PartialEq, Eq, Tabled)]
pub struct ChainRow {
    /// Chain id.
    #[tabled(rename = "ID")]
    pub id: u64,
    /// Chain name.
    #[tabled(rename = "Name")]
    pub name: String,
    /// Role of the chain in the network.
    #[tabled(rename = "Role")]
    pub role: String,
    /// Portal address, `-` if not deployed.
    #[tabled(rename = "Portal")]
    pub portal: String,
    /// Finalization strategy.
    #[tabled(rename = "Strategy")]
    pub strategy: String,
    /// Head followed at the validated level, `-` for the consensus chain.
    #[tabled(rename = "Head")]
    pub head: String,
    /// Block period.
    #[tabled(rename = "Block Period")]
    pub block_period: String,
}

/// Returns the table rows of the chains of `network`.
pub fn chain_rows(network: &Network, rules: &[ConfirmationRule]) -> Vec<ChainRow> {
    network
        .chains
        .iter()
        .map(|chain| ChainRow {
            id: chain.id,
            name: chain.name.clone(),
            role: network.role(chain.id).to_string(),
            portal: if chain.has_portal() {
                chain.portal_address.to_checksum(None)
            } else {
                "-".to_string()
            },
            strategy: chain.finalization_strat.to_string(),
            head: rules
                .iter()
                .find(|rule| rule.chain_id == chain.id)
                .map_or_else(|| "-".to_string(), |rule| rule.head.to_string()),
            block_period: humantime::format_duration(chain.block_period).to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::Address;
    use omni_netconf::{Chain, FinalizationStrat, NetworkId, save};
    use std::time::Duration;
    use tempfile::TempDir;

    const CONSENSUS: u64 = 1_001_655;

    fn chain(id: u64, name: &str, strat: FinalizationStrat, portal: Address) -> Chain {
        Chain {
            id,
            name: name.to_string(),
            portal_address: portal,
            deploy_height: 0,
            block_period: Duration::from_millis(500),
            finalization_strat: strat,
        }
    }

    fn write_network(dir: &TempDir) -> PathBuf {
        let network = Network::new(
            NetworkId::Simnet,
            vec![
                chain(CONSENSUS, "omni_consensus", FinalizationStrat::Finalized, Address::ZERO),
                chain(2, "rollupA", FinalizationStrat::Finalized, Address::repeat_byte(0x11)),
                chain(3, "rollupB", FinalizationStrat::Latest, Address::ZERO),
            ],
        );
        let path = dir.path().join("network.json");
        save(&network, &path).unwrap();
        path
    }

    fn validate(network_file: PathBuf, conf_level: ConfLevel) -> ValidateCommand {
        ValidateCommand { network_file, conf_level, require_portals: false }
    }

    #[test]
    fn test_validate_latest() {
        let dir = TempDir::new().unwrap();
        let (network, rules) = validate(write_network(&dir), ConfLevel::Latest).check().unwrap();

        let rows = chain_rows(&network, &rules);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].role, "omni_consensus");
        assert_eq!(rows[0].head, "-");
        assert_eq!(rows[1].head, "latest");
        assert_eq!(rows[1].portal, Address::repeat_byte(0x11).to_checksum(None));
        assert_eq!(rows[2].portal, "-");
        assert_eq!(rows[2].block_period, "500ms");
    }

    #[test]
    fn test_validate_unsupported_level() {
        let dir = TempDir::new().unwrap();
        let err = validate(write_network(&dir), ConfLevel::Finalized).check().unwrap_err();
        assert!(err.to_string().contains("rollupB"));
    }

    #[test]
    fn test_validate_requires_portals() {
        let dir = TempDir::new().unwrap();
        let cmd = ValidateCommand {
            require_portals: true,
            ..validate(write_network(&dir), ConfLevel::Latest)
        };
        assert!(cmd.check().is_err());
    }

    #[test]
    fn test_validate_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = validate(dir.path().join("missing.json"), ConfLevel::Latest).check().unwrap_err();
        assert!(err.to_string().contains("failed to load network config"));
    }

    #[test]
    fn test_stream_names() {
        let dir = TempDir::new().unwrap();
        let network = load(write_network(&dir)).unwrap();

        assert_eq!(
            stream_names(&network, ConfLevel::Finalized),
            vec!["rollupA|rollupB|F", "rollupB|rollupA|F"]
        );
    }
}
