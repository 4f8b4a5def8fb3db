//! The [GasPump] swap engine.

use crate::{
    CONVERSION_RATE_DENOM, FeeOracle, OracleError, PCT_CUT_DENOM, PumpError, SETTLE_GAS,
    settle_fee,
};
use alloy_primitives::{Address, Bytes, ChainId, U256};
use dashmap::DashMap;
use omni_settlement::encode_settle_up;
use omni_xchain::ConfLevel;
use std::sync::{
    RwLock,
    atomic::{AtomicBool, Ordering},
};
use tracing::info;

/// Configuration of a [GasPump].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PumpConfig {
    /// Chain id of the Omni execution chain.
    pub omni_chain_id: ChainId,
    /// Gas station settling swaps on the Omni chain.
    pub gas_station: Address,
    /// Maximum deposit, net of fee and cut, in source native asset.
    pub max_swap: U256,
    /// Cut taken from the deposit after the fee, out of [PCT_CUT_DENOM].
    pub pct_cut: u64,
}

/// Result of [`GasPump::sim_swap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimSwap {
    /// OMNI the deposit would swap to. Zero if the deposit does not cover the fee.
    pub amount: U256,
    /// Whether the swap would succeed.
    pub ok: bool,
    /// Why the swap would fail, empty if it would not.
    pub reason: &'static str,
}

/// A cross chain call emitted by the pump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XCall {
    /// Chain to execute on.
    pub dest_chain_id: ChainId,
    /// Confirmation level of the call.
    pub conf_level: ConfLevel,
    /// Target contract.
    pub to: Address,
    /// Calldata.
    pub data: Bytes,
    /// Gas limit on the destination chain.
    pub gas_limit: u64,
    /// Fee paid for the call.
    pub fee: U256,
}

/// Result of a successful [`GasPump::swap`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapReceipt {
    /// OMNI added to the recipient's total.
    pub amount: U256,
    /// Cumulative OMNI owed to the recipient.
    pub total_owed: U256,
    /// Settlement call carrying `total_owed`.
    pub call: XCall,
}

/// Outcome of the swap math shared by [`GasPump::sim_swap`] and [`GasPump::swap`].
#[derive(Debug)]
struct Quote {
    fee: U256,
    amount: U256,
    rejection: Option<PumpError>,
}

/// Swaps source native asset for OMNI on the Omni chain.
///
/// Tracks the cumulative OMNI owed to each recipient. Every swap sends the new total to the
/// gas station, which pays out whatever part of it is not funded yet.
///
/// All operations take `&self`, so a pump can be shared behind an `Arc` by swappers and its
/// owner alike. A swap reads the configuration once and quotes against that snapshot.
#[derive(Debug)]
pub struct GasPump<O> {
    owner: Address,
    oracle: O,
    omni_chain_id: ChainId,
    config: RwLock<PumpConfig>,
    paused: AtomicBool,
    owed: DashMap<Address, U256>,
}

impl<O: FeeOracle> GasPump<O> {
    /// Creates an unpaused pump.
    pub fn new(owner: Address, oracle: O, config: PumpConfig) -> Result<Self, PumpError> {
        validate_pct_cut(config.pct_cut)?;
        validate_max_swap(config.max_swap)?;
        validate_gas_station(config.gas_station)?;

        Ok(Self {
            owner,
            oracle,
            omni_chain_id: config.omni_chain_id,
            config: RwLock::new(config),
            paused: AtomicBool::new(false),
            owed: DashMap::new(),
        })
    }

    /// Returns the current configuration.
    pub fn config(&self) -> Result<PumpConfig, PumpError> {
        self.config.read().map(|config| *config).map_err(|_| PumpError::LockPoisoned)
    }

    /// Returns true if swaps are paused.
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    /// Returns the cumulative OMNI owed to `recipient`.
    pub fn owed(&self, recipient: Address) -> U256 {
        self.owed.get(&recipient).map(|owed| *owed).unwrap_or_default()
    }

    /// Returns the relay fee of a swap, read live from the oracle.
    pub fn xfee(&self) -> Result<U256, OracleError> {
        settle_fee(&self.oracle, self.omni_chain_id)
    }

    /// Simulates [`Self::swap`] of `amt`, without side effects.
    pub fn sim_swap(&self, amt: U256) -> Result<SimSwap, PumpError> {
        let quote = self.quote(&self.config()?, amt)?;
        Ok(SimSwap {
            amount: quote.amount,
            ok: quote.rejection.is_none(),
            reason: quote.rejection.as_ref().map_or("", PumpError::reason),
        })
    }

    /// Returns whether a swap of `amt` would succeed, and why not.
    pub fn can_swap(&self, amt: U256) -> Result<(bool, &'static str), PumpError> {
        let sim = self.sim_swap(amt)?;
        Ok((sim.ok, sim.reason))
    }

    /// Swaps the deposited `value` for OMNI owed to `recipient`.
    pub fn swap(&self, recipient: Address, value: U256) -> Result<SwapReceipt, PumpError> {
        if self.is_paused() {
            return Err(PumpError::Paused);
        }

        let config = self.config()?;
        let quote = self.quote(&config, value)?;
        if let Some(err) = quote.rejection {
            return Err(err);
        }

        let total_owed = {
            let mut owed = self.owed.entry(recipient).or_default();
            *owed = owed.checked_add(quote.amount).ok_or(PumpError::Overflow)?;
            *owed
        };

        info!(
            target: "economics::pump",
            %recipient,
            %value,
            fee = %quote.fee,
            amount = %quote.amount,
            %total_owed,
            "Swapped for OMNI"
        );

        Ok(SwapReceipt {
            amount: quote.amount,
            total_owed,
            call: XCall {
                dest_chain_id: self.omni_chain_id,
                conf_level: ConfLevel::Latest,
                to: config.gas_station,
                data: encode_settle_up(recipient, total_owed),
                gas_limit: SETTLE_GAS,
                fee: quote.fee,
            },
        })
    }

    /// Returns the deposit needed to receive `omni` OMNI.
    ///
    /// Undoes the cut before adding the fee. Integer division makes the result round trip
    /// through [`Self::sim_swap`] within one conversion rounding unit, never above `omni`.
    pub fn eth_needed_for(&self, omni: U256) -> Result<U256, PumpError> {
        let eth = self.to_eth(omni)?;
        let keep = U256::from(PCT_CUT_DENOM - self.config()?.pct_cut);
        let pre_cut = mul_div(eth, U256::from(PCT_CUT_DENOM), keep)?;

        pre_cut.checked_add(self.xfee()?).ok_or(PumpError::Overflow)
    }

    /// Sets the cut, out of [PCT_CUT_DENOM].
    pub fn set_pct_cut(&self, caller: Address, pct_cut: u64) -> Result<(), PumpError> {
        self.ensure_owner(caller)?;
        validate_pct_cut(pct_cut)?;
        self.update_config(|config| config.pct_cut = pct_cut)?;
        info!(target: "economics::pump", pct_cut, "Set pct cut");
        Ok(())
    }

    /// Sets the maximum swap.
    pub fn set_max_swap(&self, caller: Address, max_swap: U256) -> Result<(), PumpError> {
        self.ensure_owner(caller)?;
        validate_max_swap(max_swap)?;
        self.update_config(|config| config.max_swap = max_swap)?;
        info!(target: "economics::pump", %max_swap, "Set max swap");
        Ok(())
    }

    /// Sets the gas station.
    pub fn set_gas_station(&self, caller: Address, station: Address) -> Result<(), PumpError> {
        self.ensure_owner(caller)?;
        validate_gas_station(station)?;
        self.update_config(|config| config.gas_station = station)?;
        info!(target: "economics::pump", %station, "Set gas station");
        Ok(())
    }

    /// Rejects swaps until [`Self::unpause`].
    pub fn pause(&self, caller: Address) -> Result<(), PumpError> {
        self.ensure_owner(caller)?;
        self.paused.store(true, Ordering::Release);
        info!(target: "economics::pump", "Paused swaps");
        Ok(())
    }

    /// Resumes swaps.
    pub fn unpause(&self, caller: Address) -> Result<(), PumpError> {
        self.ensure_owner(caller)?;
        self.paused.store(false, Ordering::Release);
        info!(target: "economics::pump", "Unpaused swaps");
        Ok(())
    }

    fn update_config(&self, update: impl FnOnce(&mut PumpConfig)) -> Result<(), PumpError> {
        let mut config = self.config.write().map_err(|_| PumpError::LockPoisoned)?;
        update(&mut config);
        Ok(())
    }

    /// Subtracts the fee, then the cut, then converts to OMNI. All divisions truncate.
    fn quote(&self, config: &PumpConfig, amt: U256) -> Result<Quote, PumpError> {
        let fee = self.xfee()?;
        if amt < fee {
            return Ok(Quote {
                fee,
                amount: U256::ZERO,
                rejection: Some(PumpError::InsufficientFee { value: amt, fee }),
            });
        }

        let mut net = amt - fee;
        net -= mul_div(net, U256::from(config.pct_cut), U256::from(PCT_CUT_DENOM))?;

        let amount = self.to_omni(net)?;
        let rejection = (net > config.max_swap)
            .then_some(PumpError::OverMax { amount: net, max: config.max_swap });

        Ok(Quote { fee, amount, rejection })
    }

    fn omni_rate(&self) -> Result<U256, OracleError> {
        let rate = self.oracle.to_native_rate(self.omni_chain_id)?;
        if rate.is_zero() {
            return Err(OracleError::ZeroRate(self.omni_chain_id));
        }
        Ok(rate)
    }

    fn to_omni(&self, eth: U256) -> Result<U256, PumpError> {
        mul_div(eth, U256::from(CONVERSION_RATE_DENOM), self.omni_rate()?)
    }

    fn to_eth(&self, omni: U256) -> Result<U256, PumpError> {
        mul_div(omni, self.omni_rate()?, U256::from(CONVERSION_RATE_DENOM))
    }

    fn ensure_owner(&self, caller: Address) -> Result<(), PumpError> {
        if caller != self.owner {
            return Err(PumpError::NotOwner(caller));
        }
        Ok(())
    }
}

fn mul_div(a: U256, b: U256, denom: U256) -> Result<U256, PumpError> {
    Ok(a.checked_mul(b).ok_or(PumpError::Overflow)? / denom)
}

const fn validate_pct_cut(pct_cut: u64) -> Result<(), PumpError> {
    if pct_cut >= PCT_CUT_DENOM {
        return Err(PumpError::InvalidPctCut(pct_cut));
    }
    Ok(())
}

fn validate_max_swap(max_swap: U256) -> Result<(), PumpError> {
    if max_swap.is_zero() {
        return Err(PumpError::ZeroMaxSwap);
    }
    Ok(())
}

fn validate_gas_station(station: Address) -> Result<(), PumpError> {
    if station.is_zero() {
        return Err(PumpError::ZeroGasStation);
    }
    Ok(())
}
