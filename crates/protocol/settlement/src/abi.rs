//! ABI of the gas station settlement call.

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{SolCall, sol};

sol! {
    /// @notice Pays `recipient` the part of `owed` that is not funded yet.
    /// @param recipient Address receiving the payout.
    /// @param owed      Cumulative amount owed to `recipient` by the source chain.
    #[derive(Debug, PartialEq, Eq)]
    function settleUp(address recipient, uint256 owed) external;
}

/// Encodes a `settleUp(recipient, owed)` call.
pub fn encode_settle_up(recipient: Address, owed: U256) -> Bytes {
    settleUpCall { recipient, owed }.abi_encode().into()
}

/// Decodes a `settleUp` call, returning `(recipient, owed)`.
pub fn decode_settle_up(data: &[u8]) -> Result<(Address, U256), alloy_sol_types::Error> {
    let call = settleUpCall::abi_decode(data)?;
    Ok((call.recipient, call.owed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_and_layout() {
        let data = encode_settle_up(Address::repeat_byte(0x11), U256::from(150));

        assert_eq!(&data[..4], &settleUpCall::SELECTOR);
        assert_eq!(data.len(), 4 + 2 * 32);
        assert_eq!(decode_settle_up(&data).unwrap(), (Address::repeat_byte(0x11), U256::from(150)));
    }

    #[test]
    fn test_decode_rejects_other_calls() {
        let mut data = encode_settle_up(Address::ZERO, U256::ZERO).to_vec();
        data[0] ^= 0xff;
        assert!(decode_settle_up(&data).is_err());
        assert!(decode_settle_up(&[]).is_err());
    }
}
