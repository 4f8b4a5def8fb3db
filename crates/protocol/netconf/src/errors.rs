//! Error types for the `omni-netconf` crate.

use alloy_primitives::ChainId;
use std::path::PathBuf;
use thiserror::Error;

/// An error type for loading, saving and validating a [Network].
///
/// [Network]: crate::Network
#[derive(Debug, Error)]
pub enum NetconfError {
    /// The network id is not one of the supported networks.
    #[error("invalid network id: {0:?}")]
    InvalidNetworkId(String),
    /// The network has no chains.
    #[error("network {0} has no chains")]
    EmptyNetwork(String),
    /// Two chains share the same id.
    #[error("duplicate chain id: {0}")]
    DuplicateChainId(ChainId),
    /// A chain failed a structural check.
    #[error("invalid chain {chain_id}: {field}: {reason}")]
    InvalidChain {
        /// The offending chain.
        chain_id: ChainId,
        /// The offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
    /// Reading or writing the config file failed.
    #[error("network config file {}: {source}", .path.display())]
    Io {
        /// Path of the config file.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The config file is not a valid network document.
    #[error("unmarshal network config file: {0}")]
    Decode(#[source] serde_json::Error),
    /// The network could not be encoded.
    #[error("marshal network config file: {0}")]
    Encode(#[source] serde_json::Error),
}

impl NetconfError {
    /// Shorthand for [`NetconfError::InvalidChain`].
    pub fn invalid_chain(chain_id: ChainId, field: &'static str, reason: impl ToString) -> Self {
        Self::InvalidChain { chain_id, field, reason: reason.to_string() }
    }
}

/// A [Result] alias for the [NetconfError] type.
pub type NetconfResult<T> = Result<T, NetconfError>;
