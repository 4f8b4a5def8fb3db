//! Monitor configuration.

use alloy_primitives::ChainId;
use omni_netconf::Network;
use omni_xchain::ConfLevel;
use std::time::Duration;

/// Configuration of the [LatencyMonitor](crate::LatencyMonitor).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    /// Chains to subscribe to. All EVM chains of the network when empty.
    pub chain_ids: Vec<ChainId>,
    /// Level the blocks are streamed at.
    pub conf_level: ConfLevel,
    /// Period of the aggregation task.
    pub interval: Duration,
    /// Observations older than this, relative to the latest block, are pruned on every
    /// aggregation tick. Never pruned when `None`.
    pub retention: Option<Duration>,
    /// Resubscription attempts of a chain before giving up on it.
    pub max_retries: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            chain_ids: vec![],
            conf_level: ConfLevel::Latest,
            interval: Duration::from_secs(5),
            retention: None,
            max_retries: usize::MAX,
        }
    }
}

impl MonitorConfig {
    /// Returns the chains to subscribe to in `network`.
    pub fn chains(&self, network: &Network) -> Vec<ChainId> {
        if self.chain_ids.is_empty() {
            network.evm_chains().map(|chain| chain.id).collect()
        } else {
            self.chain_ids.clone()
        }
    }
}
