//! Error types for the `omni-economics` crate.

use alloy_primitives::{Address, ChainId, U256};
use thiserror::Error;

/// An error returned by a [FeeOracle](crate::FeeOracle).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OracleError {
    /// No fee parameters are known for the chain.
    #[error("no fee params for chain {0}")]
    NoFeeParams(ChainId),
    /// The conversion rate of the chain is zero.
    #[error("zero conversion rate for chain {0}")]
    ZeroRate(ChainId),
    /// The fee does not fit in 256 bits.
    #[error("fee overflow")]
    Overflow,
}

/// A rejected swap or admin call. Nothing is mutated when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PumpError {
    /// Swaps are paused.
    #[error("GasPump: paused")]
    Paused,
    /// The deposit does not cover the relay fee.
    #[error("GasPump: insufficient fee: value {value}, fee {fee}")]
    InsufficientFee {
        /// Deposited value.
        value: U256,
        /// Required relay fee.
        fee: U256,
    },
    /// The deposit, net of fee and cut, is above the maximum swap.
    #[error("GasPump: over max: {amount} > {max}")]
    OverMax {
        /// Net deposit.
        amount: U256,
        /// Maximum swap.
        max: U256,
    },
    /// The caller is not the owner.
    #[error("GasPump: caller {0} is not the owner")]
    NotOwner(Address),
    /// The cut is not below 100%.
    #[error("GasPump: pct cut {0} not below {denom}", denom = crate::PCT_CUT_DENOM)]
    InvalidPctCut(u64),
    /// The maximum swap is zero.
    #[error("GasPump: zero max swap")]
    ZeroMaxSwap,
    /// The gas station address is zero.
    #[error("GasPump: zero gas station")]
    ZeroGasStation,
    /// An intermediate amount does not fit in 256 bits.
    #[error("GasPump: amount overflow")]
    Overflow,
    /// The configuration lock was poisoned by a panicking writer.
    #[error("GasPump: config lock poisoned")]
    LockPoisoned,
    /// The fee oracle failed.
    #[error("GasPump: oracle: {0}")]
    Oracle(#[from] OracleError),
}

impl PumpError {
    /// Returns a short, stable reason of the rejection.
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::Paused => "paused",
            Self::InsufficientFee { .. } => "insufficient fee",
            Self::OverMax { .. } => "over max",
            Self::NotOwner(_) => "not owner",
            Self::InvalidPctCut(_) => "invalid pct cut",
            Self::ZeroMaxSwap => "zero max swap",
            Self::ZeroGasStation => "zero gas station",
            Self::Overflow => "overflow",
            Self::LockPoisoned => "lock poisoned",
            Self::Oracle(_) => "oracle",
        }
    }
}
