//! Error types for the `omni-xchain` crate.

use crate::{ConfLevel, StreamId};
use alloy_primitives::ChainId;
use omni_netconf::FinalizationStrat;
use thiserror::Error;

/// A confirmation level that cannot be honoured.
///
/// Always a configuration error, surfaced at startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfLevelError {
    /// The finalization strategy cannot satisfy the requested level.
    #[error("finalization strategy {strat} cannot satisfy conf level {level}")]
    Unsupported {
        /// Strategy of the chain.
        strat: FinalizationStrat,
        /// Requested level.
        level: ConfLevel,
    },
    /// A specific chain cannot satisfy the requested level.
    #[error("chain {name} ({chain_id}) with strategy {strat} cannot satisfy conf level {level}")]
    UnsupportedChain {
        /// Chain id.
        chain_id: ChainId,
        /// Chain name.
        name: String,
        /// Strategy of the chain.
        strat: FinalizationStrat,
        /// Requested level.
        level: ConfLevel,
    },
    /// The chain is not part of the network.
    #[error("unknown chain: {0}")]
    UnknownChain(ChainId),
}

/// An ordering violation within a stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    /// An offset below the cursor was observed after a later one.
    #[error("stream {stream} regressed: offset {offset} after {latest}")]
    Regressed {
        /// The stream.
        stream: StreamId,
        /// Offset observed.
        offset: u64,
        /// Highest offset observed before.
        latest: u64,
    },
    /// An item belongs to a different stream than the buffer or cursor.
    #[error("wrong stream: expected {expected}, got {actual}")]
    WrongStream {
        /// Stream of the buffer or cursor.
        expected: StreamId,
        /// Stream of the item.
        actual: StreamId,
    },
}

/// An error returned by an [XProvider](crate::XProvider).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum XProviderError {
    /// The chain could not be reached.
    #[error("chain {chain_id} unreachable: {reason}")]
    Unreachable {
        /// Chain id.
        chain_id: ChainId,
        /// Why.
        reason: String,
    },
    /// The provider does not serve this chain.
    #[error("chain {0} not supported by provider")]
    UnsupportedChain(ChainId),
    /// The stream failed after it was opened.
    #[error("stream of chain {chain_id} failed at height {height}: {reason}")]
    Stream {
        /// Chain id.
        chain_id: ChainId,
        /// Height of the failed block.
        height: u64,
        /// Why.
        reason: String,
    },
}
