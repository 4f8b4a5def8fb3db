//! Error types for the `omni-settlement` crate.

use alloy_primitives::{Address, ChainId, U256};
use thiserror::Error;

/// A rejected settlement or admin call. Nothing is mutated when one is returned.
#[derive(Debug, Error)]
pub enum SettleError {
    /// Settlement is paused.
    #[error("GasStation: paused")]
    Paused,
    /// The sender is not the authorised pump of its chain.
    #[error("GasStation: unauthorized sender {sender} on chain {chain_id}")]
    Unauthorized {
        /// Source chain of the request.
        chain_id: ChainId,
        /// Sender of the request.
        sender: Address,
    },
    /// The requested total is below the funded amount.
    #[error("GasStation: total {total} below funded {funded}")]
    Rewind {
        /// Requested cumulative total.
        total: U256,
        /// Amount funded so far.
        funded: U256,
    },
    /// The caller is not the owner.
    #[error("GasStation: caller {0} is not the owner")]
    NotOwner(Address),
    /// The zero address was given where a real one is required.
    #[error("GasStation: zero address")]
    ZeroAddress,
    /// The message is not a `settleUp` call.
    #[error("GasStation: invalid settleUp calldata: {0}")]
    Decode(#[from] alloy_sol_types::Error),
}

impl SettleError {
    /// Returns a short, stable reason of the rejection.
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::Paused => "paused",
            Self::Unauthorized { .. } => "unauthorized",
            Self::Rewind { .. } => "rewind",
            Self::NotOwner(_) => "not owner",
            Self::ZeroAddress => "zero address",
            Self::Decode(_) => "invalid calldata",
        }
    }
}

/// A failed transfer to a recipient.
///
/// Never fatal to the ledger: the outstanding amount stays owed and is retried by a later
/// request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferError {
    /// The station cannot cover the amount.
    #[error("insufficient balance: need {needed}, have {available}")]
    InsufficientBalance {
        /// Amount to transfer.
        needed: U256,
        /// Balance of the station.
        available: U256,
    },
    /// The recipient reverted.
    #[error("recipient reverted: {0}")]
    Reverted(String),
    /// The transfer ran out of gas.
    #[error("out of gas")]
    OutOfGas,
}
