//! Error types for the `omni-monitor` crate.

use alloy_primitives::ChainId;
use omni_xchain::{ConfLevelError, MsgId, XProviderError};
use thiserror::Error;

/// An error starting the [LatencyMonitor](crate::LatencyMonitor).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MonitorError {
    /// The aggregation interval is zero.
    #[error("aggregation interval must be non-zero")]
    ZeroInterval,
    /// No chain to monitor.
    #[error("no chains to monitor")]
    NoChains,
    /// A monitored chain cannot be followed at the requested level.
    #[error(transparent)]
    ConfLevel(#[from] ConfLevelError),
    /// The first subscription could not be opened.
    #[error("failed to subscribe to chain {chain_id}: {source}")]
    Subscribe {
        /// Chain of the subscription.
        chain_id: ChainId,
        /// The provider error.
        #[source]
        source: XProviderError,
    },
}

/// An error submitting a message for execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    /// The destination chain rejected or never included the submission.
    #[error("failed to submit {msg_id}: {reason}")]
    Submit {
        /// The message.
        msg_id: MsgId,
        /// Why.
        reason: String,
    },
    /// No submitter serves the destination chain.
    #[error("no submitter for chain {0}")]
    UnsupportedChain(ChainId),
}
