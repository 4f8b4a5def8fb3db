//! Worst case quotes of the settlement call.

use crate::{FeeOracle, OracleError, SETTLE_GAS};
use alloy_primitives::{Address, Bytes, ChainId, U256};
use omni_settlement::encode_settle_up;

/// Returns a `settleUp` call with maximal placeholder arguments.
///
/// No byte of the arguments is zero, so the call's calldata gas is at least that of any
/// concrete `(recipient, total)`.
pub fn max_settle_call() -> Bytes {
    encode_settle_up(Address::repeat_byte(0xff), U256::MAX)
}

/// Returns the fee of a settlement on `omni_chain_id`, quoted before the payload is known.
pub fn settle_fee(oracle: &impl FeeOracle, omni_chain_id: ChainId) -> Result<U256, OracleError> {
    oracle.fee_for(omni_chain_id, &max_settle_call(), SETTLE_GAS)
}
