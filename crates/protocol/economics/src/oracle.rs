//! Fee oracle.

use crate::{CONVERSION_RATE_DENOM, DATA_GAS_BUFFER, OracleError};
use alloy_primitives::{ChainId, U256};
use auto_impl::auto_impl;
use dashmap::DashMap;

/// Quotes cross chain fees in the source chain's native asset.
#[auto_impl(&, Arc)]
pub trait FeeOracle: Send + Sync {
    /// Returns the fee to execute a call with `data` and `gas_limit` on `dest_chain_id`.
    fn fee_for(
        &self,
        dest_chain_id: ChainId,
        data: &[u8],
        gas_limit: u64,
    ) -> Result<U256, OracleError>;

    /// Returns the rate converting `chain_id`'s native asset to the source native asset,
    /// scaled by [`Self::conversion_rate_denom`].
    fn to_native_rate(&self, chain_id: ChainId) -> Result<U256, OracleError>;

    /// Returns the denominator of conversion rates.
    fn conversion_rate_denom(&self) -> U256 {
        U256::from(CONVERSION_RATE_DENOM)
    }
}

/// Pricing parameters of one destination chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainFeeParams {
    /// Gas price on the chain, in its native asset.
    pub gas_price: U256,
    /// Rate converting the chain's native asset to the source native asset.
    pub to_native_rate: U256,
    /// Chain whose gas prices the calldata, e.g. the layer 1 a rollup posts to. Zero if the
    /// chain itself.
    pub posts_to: ChainId,
}

/// Returns the calldata gas of `data`: 16 per non-zero byte, 4 per zero byte, plus
/// [DATA_GAS_BUFFER].
pub fn data_gas(data: &[u8]) -> u64 {
    let zeros = data.iter().filter(|byte| **byte == 0).count() as u64;
    let non_zeros = data.len() as u64 - zeros;
    DATA_GAS_BUFFER + zeros * 4 + non_zeros * 16
}

/// In-memory [FeeOracle] priced from per chain gas prices and conversion rates.
///
/// `fee = protocol_fee + (base_gas_limit + gas_limit) * exec_price + data_gas * data_price`,
/// where a price is `gas_price * to_native_rate / CONVERSION_RATE_DENOM`.
#[derive(Debug, Default)]
pub struct FeeOracleV1 {
    protocol_fee: U256,
    base_gas_limit: u64,
    params: DashMap<ChainId, ChainFeeParams>,
}

impl FeeOracleV1 {
    /// Creates an oracle without any chain.
    pub fn new(protocol_fee: U256, base_gas_limit: u64) -> Self {
        Self { protocol_fee, base_gas_limit, params: DashMap::new() }
    }

    /// Sets the parameters of `chain_id`.
    pub fn set_fee_params(
        &self,
        chain_id: ChainId,
        params: ChainFeeParams,
    ) -> Result<(), OracleError> {
        if params.to_native_rate.is_zero() {
            return Err(OracleError::ZeroRate(chain_id));
        }
        self.params.insert(chain_id, params);
        Ok(())
    }

    /// Updates the gas price of `chain_id`.
    pub fn set_gas_price(&self, chain_id: ChainId, gas_price: U256) -> Result<(), OracleError> {
        let mut params = self.params.get_mut(&chain_id).ok_or(OracleError::NoFeeParams(chain_id))?;
        params.gas_price = gas_price;
        Ok(())
    }

    /// Updates the conversion rate of `chain_id`.
    pub fn set_to_native_rate(&self, chain_id: ChainId, rate: U256) -> Result<(), OracleError> {
        if rate.is_zero() {
            return Err(OracleError::ZeroRate(chain_id));
        }
        let mut params = self.params.get_mut(&chain_id).ok_or(OracleError::NoFeeParams(chain_id))?;
        params.to_native_rate = rate;
        Ok(())
    }

    fn params(&self, chain_id: ChainId) -> Result<ChainFeeParams, OracleError> {
        self.params.get(&chain_id).map(|params| *params).ok_or(OracleError::NoFeeParams(chain_id))
    }

    fn price(params: &ChainFeeParams) -> Result<U256, OracleError> {
        let scaled =
            params.gas_price.checked_mul(params.to_native_rate).ok_or(OracleError::Overflow)?;
        Ok(scaled / U256::from(CONVERSION_RATE_DENOM))
    }
}

impl FeeOracle for FeeOracleV1 {
    fn fee_for(
        &self,
        dest_chain_id: ChainId,
        data: &[u8],
        gas_limit: u64,
    ) -> Result<U256, OracleError> {
        let exec = self.params(dest_chain_id)?;
        let data_params = match exec.posts_to {
            0 => exec,
            posts_to => self.params(posts_to)?,
        };

        let exec_gas = U256::from(self.base_gas_limit) + U256::from(gas_limit);
        let exec_fee = exec_gas.checked_mul(Self::price(&exec)?).ok_or(OracleError::Overflow)?;
        let data_fee = U256::from(data_gas(data))
            .checked_mul(Self::price(&data_params)?)
            .ok_or(OracleError::Overflow)?;

        self.protocol_fee
            .checked_add(exec_fee)
            .and_then(|fee| fee.checked_add(data_fee))
            .ok_or(OracleError::Overflow)
    }

    fn to_native_rate(&self, chain_id: ChainId) -> Result<U256, OracleError> {
        Ok(self.params(chain_id)?.to_native_rate)
    }
}
