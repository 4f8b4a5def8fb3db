//! The [GasStation] ledger.

use crate::{SettleError, SettleRequest, TransferExecutor, metrics::Metrics};
use alloy_primitives::{Address, ChainId, U256};
use dashmap::DashMap;
use omni_xchain::XMsg;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Outcome of an accepted [SettleRequest].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
    /// `delta` was transferred, the recipient is funded up to `total`.
    Funded {
        /// Amount transferred.
        delta: U256,
        /// Funded amount after the transfer.
        total: U256,
    },
    /// The recipient is already funded up to the requested total.
    AlreadyFunded,
    /// The transfer failed. The ledger is unchanged and `outstanding` is still owed.
    TransferFailed {
        /// Amount that failed to transfer.
        outstanding: U256,
        /// Why the transfer failed.
        reason: String,
    },
}

/// Pays out cumulative totals requested by the gas pumps of other chains.
///
/// The funded amount of each `(recipient, source chain)` pair only grows, and only by amounts
/// that were actually transferred. Requests for the same pair are serialised, requests for
/// different pairs run concurrently.
///
/// Pause and pump authorisation are checked again once a request holds its pair's lock, so a
/// request queued behind an in-flight transfer observes admin changes made while it waited.
#[derive(Debug)]
pub struct GasStation<T> {
    owner: Address,
    executor: T,
    #[allow(clippy::type_complexity)]
    fueled: DashMap<(Address, ChainId), Arc<Mutex<U256>>>,
    /// Committed funded amounts, readable while a transfer holds the pair's lock.
    committed: DashMap<(Address, ChainId), U256>,
    pumps: DashMap<ChainId, Address>,
    paused: AtomicBool,
}

impl<T: TransferExecutor> GasStation<T> {
    /// Creates an unpaused station without any authorised pump.
    pub fn new(owner: Address, executor: T) -> Self {
        Metrics::init();
        Self {
            owner,
            executor,
            fueled: DashMap::new(),
            committed: DashMap::new(),
            pumps: DashMap::new(),
            paused: AtomicBool::new(false),
        }
    }

    /// Returns the owner of the station.
    pub const fn owner(&self) -> Address {
        self.owner
    }

    /// Funds `req.recipient` up to `req.total`.
    ///
    /// A failed transfer is not an error: the ledger is left untouched and the outstanding
    /// amount is reported as [`Settlement::TransferFailed`], to be retried by a later request.
    pub async fn settle_up(&self, req: SettleRequest) -> Result<Settlement, SettleError> {
        let res = self.try_settle_up(req).await;
        match &res {
            Ok(settlement) => Metrics::record(match settlement {
                Settlement::Funded { .. } => Metrics::OUTCOME_FUNDED,
                Settlement::AlreadyFunded => Metrics::OUTCOME_ALREADY_FUNDED,
                Settlement::TransferFailed { .. } => Metrics::OUTCOME_TRANSFER_FAILED,
            }),
            Err(err) => {
                debug!(target: "settlement::station", %err, chain_id = req.source_chain_id, "Rejected settlement request");
                Metrics::record_rejected(err.reason());
            }
        }
        res
    }

    /// Decodes a received `settleUp` message and settles it.
    pub async fn settle_xmsg(&self, msg: &XMsg) -> Result<Settlement, SettleError> {
        self.settle_up(SettleRequest::from_xmsg(msg)?).await
    }

    fn ensure_accepted(&self, req: &SettleRequest) -> Result<(), SettleError> {
        if self.is_paused() {
            return Err(SettleError::Paused);
        }
        if !self.is_pump(req.source_chain_id, req.sender) {
            return Err(SettleError::Unauthorized {
                chain_id: req.source_chain_id,
                sender: req.sender,
            });
        }
        Ok(())
    }

    async fn try_settle_up(&self, req: SettleRequest) -> Result<Settlement, SettleError> {
        self.ensure_accepted(&req)?;

        let key = (req.recipient, req.source_chain_id);
        // Clone the `Arc` so the map shard is not locked while transferring.
        let entry = {
            let rm = self.fueled.entry(key).or_insert_with(|| Arc::new(Mutex::new(U256::ZERO)));
            Arc::clone(rm.value())
        };

        let mut funded = entry.lock().await;
        // Admin state may have changed while waiting for the lock.
        self.ensure_accepted(&req)?;

        if req.total < *funded {
            return Err(SettleError::Rewind { total: req.total, funded: *funded });
        }
        if req.total == *funded {
            return Ok(Settlement::AlreadyFunded);
        }

        let delta = req.total - *funded;
        if let Err(err) = self.executor.transfer(req.recipient, delta).await {
            warn!(
                target: "settlement::station",
                recipient = %req.recipient,
                chain_id = req.source_chain_id,
                outstanding = %delta,
                %err,
                "Transfer failed, ledger unchanged"
            );
            return Ok(Settlement::TransferFailed { outstanding: delta, reason: err.to_string() });
        }

        *funded = req.total;
        self.committed.insert(key, req.total);
        debug!(
            target: "settlement::station",
            recipient = %req.recipient,
            chain_id = req.source_chain_id,
            %delta,
            total = %req.total,
            "Funded recipient"
        );

        Ok(Settlement::Funded { delta, total: req.total })
    }

    /// Returns the amount funded to `recipient` on behalf of `chain_id`.
    ///
    /// Never waits for an in-flight settlement: a transfer is only visible once committed.
    pub fn funded(&self, recipient: Address, chain_id: ChainId) -> U256 {
        self.committed.get(&(recipient, chain_id)).map(|funded| *funded).unwrap_or_default()
    }

    /// Returns true if `pump` is the authorised pump of `chain_id`.
    pub fn is_pump(&self, chain_id: ChainId, pump: Address) -> bool {
        self.pumps.get(&chain_id).is_some_and(|authorised| *authorised == pump)
    }

    /// Returns true if settlement is paused.
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    /// Authorises `pump` as the only sender accepted from `chain_id`.
    pub fn set_pump(
        &self,
        caller: Address,
        chain_id: ChainId,
        pump: Address,
    ) -> Result<(), SettleError> {
        self.ensure_owner(caller)?;
        if pump.is_zero() {
            return Err(SettleError::ZeroAddress);
        }

        info!(target: "settlement::station", chain_id, %pump, "Authorised gas pump");
        self.pumps.insert(chain_id, pump);
        Ok(())
    }

    /// Rejects all settlement requests until [`Self::unpause`].
    pub fn pause(&self, caller: Address) -> Result<(), SettleError> {
        self.ensure_owner(caller)?;
        self.paused.store(true, Ordering::Release);
        info!(target: "settlement::station", "Paused settlement");
        Ok(())
    }

    /// Resumes settlement.
    pub fn unpause(&self, caller: Address) -> Result<(), SettleError> {
        self.ensure_owner(caller)?;
        self.paused.store(false, Ordering::Release);
        info!(target: "settlement::station", "Unpaused settlement");
        Ok(())
    }

    fn ensure_owner(&self, caller: Address) -> Result<(), SettleError> {
        if caller != self.owner {
            return Err(SettleError::NotOwner(caller));
        }
        Ok(())
    }
}
