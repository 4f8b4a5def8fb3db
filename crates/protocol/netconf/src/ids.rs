//! Static chain classification tables.
//!
//! Whether a chain is the Omni execution or consensus chain is a function of the network it
//! belongs to and its chain id, never a flag stored on the chain itself.

use crate::NetworkId;
use alloy_primitives::ChainId;

/// Ethereum mainnet.
pub const ETHEREUM_CHAIN_ID: ChainId = 1;

/// Ethereum Holesky testnet.
pub const HOLESKY_CHAIN_ID: ChainId = 17_000;

/// Offset added to an Omni execution chain id to obtain its consensus chain id.
pub const CONSENSUS_ID_OFFSET: ChainId = 1_000_000;

/// Returns the Omni execution (EVM) chain id of the given network.
pub const fn omni_execution_chain_id(network: NetworkId) -> ChainId {
    match network {
        NetworkId::Mainnet => 166,
        NetworkId::Testnet => 165,
        NetworkId::Staging => 1654,
        NetworkId::Simnet => 1655,
    }
}

/// Returns the Omni consensus chain id of the given network.
pub const fn omni_consensus_chain_id(network: NetworkId) -> ChainId {
    CONSENSUS_ID_OFFSET + omni_execution_chain_id(network)
}

/// Returns true if `chain_id` is the Omni execution chain of `network`.
pub const fn is_omni_execution(network: NetworkId, chain_id: ChainId) -> bool {
    chain_id == omni_execution_chain_id(network)
}

/// Returns true if `chain_id` is the Omni consensus chain of `network`.
pub const fn is_omni_consensus(network: NetworkId, chain_id: ChainId) -> bool {
    chain_id == omni_consensus_chain_id(network)
}

/// Returns the fixed layer 1 chain id of production networks.
///
/// Ad hoc networks return `None`; their layer 1 is found by name instead, see
/// [`Network::layer1_chain`](crate::Network::layer1_chain).
pub const fn layer1_chain_id(network: NetworkId) -> Option<ChainId> {
    match network {
        NetworkId::Mainnet => Some(ETHEREUM_CHAIN_ID),
        NetworkId::Testnet => Some(HOLESKY_CHAIN_ID),
        NetworkId::Staging | NetworkId::Simnet => None,
    }
}
