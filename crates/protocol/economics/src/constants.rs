//! Protocol constants of the fee and swap math.

/// Denominator of conversion rates. A rate of `CONVERSION_RATE_DENOM` is 1:1.
pub const CONVERSION_RATE_DENOM: u64 = 1_000_000;

/// Denominator of the swap cut. A cut of `PCT_CUT_DENOM` would be 100%.
pub const PCT_CUT_DENOM: u64 = 1_000;

/// Gas limit of the `settleUp` call on the Omni chain.
pub const SETTLE_GAS: u64 = 100_000;

/// Fixed calldata gas charged per message on top of the calldata itself.
pub const DATA_GAS_BUFFER: u64 = 100;
