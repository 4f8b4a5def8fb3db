//! Settlement requests.

use crate::{SettleError, decode_settle_up};
use alloy_primitives::{Address, ChainId, U256};
use omni_xchain::XMsg;

/// A request to fund `recipient` up to the cumulative `total` owed by `source_chain_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettleRequest {
    /// Chain the request was sent from.
    pub source_chain_id: ChainId,
    /// Sender of the request on the source chain.
    pub sender: Address,
    /// Address receiving the payout.
    pub recipient: Address,
    /// Cumulative amount owed to `recipient`.
    pub total: U256,
}

impl SettleRequest {
    /// Builds a request from a received `settleUp` message.
    pub fn from_xmsg(msg: &XMsg) -> Result<Self, SettleError> {
        let (recipient, total) = decode_settle_up(&msg.data)?;
        Ok(Self { source_chain_id: msg.source_chain_id(), sender: msg.sender, recipient, total })
    }
}
