//! The [Network] type.

use crate::{
    Chain, NetconfError, NetconfResult, is_omni_consensus, is_omni_execution, layer1_chain_id,
};
use alloy_primitives::ChainId;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Identifies a deployment of the Omni cross chain protocol.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NetworkId {
    /// Single-binary network with mocked chains.
    Simnet,
    /// Public test network.
    Testnet,
    /// Ephemeral pre-release network.
    Staging,
    /// Production network.
    Mainnet,
}

impl NetworkId {
    /// Parses a network id, rejecting anything outside the enumerated set.
    pub fn parse(value: &str) -> NetconfResult<Self> {
        value.parse().map_err(|_| NetconfError::InvalidNetworkId(value.to_string()))
    }

    /// Returns true for long-lived public networks whose chain ids are fixed.
    pub const fn is_protected(self) -> bool {
        matches!(self, Self::Mainnet | Self::Testnet)
    }
}

/// The role a chain plays within a [Network].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ChainRole {
    /// The Omni consensus chain.
    #[display("omni_consensus")]
    OmniConsensus,
    /// The Omni execution chain.
    #[display("omni_evm")]
    OmniExecution,
    /// The layer 1 chain.
    #[display("l1")]
    Layer1,
    /// Any other rollup or EVM chain.
    #[display("rollup")]
    Rollup,
}

/// A deployment of the Omni cross chain protocol.
///
/// It spans an Omni chain (both execution and consensus) and a set of supported rollup EVMs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    /// Id of the network.
    #[serde(rename = "name")]
    pub id: NetworkId,
    /// Chains that are part of the network.
    pub chains: Vec<Chain>,
}

impl Network {
    /// Creates a new [Network].
    pub const fn new(id: NetworkId, chains: Vec<Chain>) -> Self {
        Self { id, chains }
    }

    /// Returns an error if the configuration is structurally invalid.
    ///
    /// The network id is checked by construction. At most one Omni consensus and one Omni
    /// execution chain can exist since classification is static per chain id and chain ids are
    /// unique.
    pub fn validate(&self) -> NetconfResult<()> {
        if self.chains.is_empty() {
            return Err(NetconfError::EmptyNetwork(self.id.to_string()));
        }

        let mut seen = HashSet::with_capacity(self.chains.len());
        for chain in &self.chains {
            if !seen.insert(chain.id) {
                return Err(NetconfError::DuplicateChainId(chain.id));
            }
            if chain.id == 0 {
                return Err(NetconfError::invalid_chain(chain.id, "id", "zero chain id"));
            }
            if chain.name.trim().is_empty() {
                return Err(NetconfError::invalid_chain(chain.id, "name", "empty name"));
            }
            if chain.block_period.is_zero() {
                return Err(NetconfError::invalid_chain(chain.id, "block_period", "zero period"));
            }
        }

        Ok(())
    }

    /// Returns an error if any EVM chain has no portal address yet.
    pub fn ensure_portals_deployed(&self) -> NetconfResult<()> {
        match self.evm_chains().find(|chain| !chain.has_portal()) {
            Some(chain) => {
                Err(NetconfError::invalid_chain(chain.id, "portal_address", "not deployed"))
            }
            None => Ok(()),
        }
    }

    /// Returns all EVM chains in the network, i.e. everything except the Omni consensus chain.
    pub fn evm_chains(&self) -> impl Iterator<Item = &Chain> {
        self.chains.iter().filter(|chain| !is_omni_consensus(self.id, chain.id))
    }

    /// Returns all chain ids in the network.
    pub fn chain_ids(&self) -> Vec<ChainId> {
        self.chains.iter().map(|chain| chain.id).collect()
    }

    /// Returns the names of all chains keyed by id.
    pub fn chain_names_by_ids(&self) -> BTreeMap<ChainId, String> {
        self.chains.iter().map(|chain| (chain.id, chain.name.clone())).collect()
    }

    /// Returns the chain config for the given id.
    pub fn chain(&self, id: ChainId) -> Option<&Chain> {
        self.chains.iter().find(|chain| chain.id == id)
    }

    /// Returns the chain name for the given id, or an empty string if it does not exist.
    pub fn chain_name(&self, id: ChainId) -> &str {
        self.chain(id).map(|chain| chain.name.as_str()).unwrap_or_default()
    }

    /// Returns the Omni execution chain config.
    pub fn omni_execution_chain(&self) -> Option<&Chain> {
        self.chains.iter().find(|chain| is_omni_execution(self.id, chain.id))
    }

    /// Returns the Omni consensus chain config.
    pub fn omni_consensus_chain(&self) -> Option<&Chain> {
        self.chains.iter().find(|chain| is_omni_consensus(self.id, chain.id))
    }

    /// Returns the layer 1 chain config.
    ///
    /// Protected networks match the fixed layer 1 chain id. Ad hoc networks fall back to the
    /// first chain whose name contains `l1`.
    pub fn layer1_chain(&self) -> Option<&Chain> {
        match layer1_chain_id(self.id) {
            Some(id) => self.chain(id),
            None => self.chains.iter().find(|chain| chain.name.contains("l1")),
        }
    }

    /// Returns the role of the given chain.
    pub fn role(&self, id: ChainId) -> ChainRole {
        if is_omni_consensus(self.id, id) {
            ChainRole::OmniConsensus
        } else if is_omni_execution(self.id, id) {
            ChainRole::OmniExecution
        } else if self.layer1_chain().is_some_and(|chain| chain.id == id) {
            ChainRole::Layer1
        } else {
            ChainRole::Rollup
        }
    }
}
