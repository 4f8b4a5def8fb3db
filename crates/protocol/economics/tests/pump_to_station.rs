//! Swaps at a gas pump, settled at the gas station through cross chain messages.

use alloy_primitives::{Address, ChainId, U256};
use async_trait::async_trait;
use omni_economics::{
    CONVERSION_RATE_DENOM, ChainFeeParams, FeeOracleV1, GasPump, PumpConfig, SwapReceipt,
};
use omni_settlement::{GasStation, Settlement, TransferError, TransferExecutor};
use omni_xchain::XMsg;
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, AtomicU64, Ordering},
};

const OWNER: Address = Address::repeat_byte(0xee);
const PUMP: Address = Address::repeat_byte(0x01);
const STATION: Address = Address::repeat_byte(0x5a);
const RECIPIENT: Address = Address::repeat_byte(0x02);
const SOURCE: ChainId = 10;
const OMNI: ChainId = 166;

/// Records transfers, failing all of them while `offline` is set.
#[derive(Debug, Default)]
struct Treasury {
    offline: AtomicBool,
    paid: Mutex<Vec<(Address, U256)>>,
}

#[async_trait]
impl TransferExecutor for Treasury {
    async fn transfer(&self, recipient: Address, amount: U256) -> Result<(), TransferError> {
        if self.offline.load(Ordering::SeqCst) {
            let available = U256::ZERO;
            return Err(TransferError::InsufficientBalance { needed: amount, available });
        }
        self.paid.lock().unwrap().push((recipient, amount));
        Ok(())
    }
}

struct Harness {
    pump: GasPump<Arc<FeeOracleV1>>,
    station: GasStation<Arc<Treasury>>,
    treasury: Arc<Treasury>,
    offset: AtomicU64,
}

impl Harness {
    fn new() -> Self {
        let oracle = Arc::new(FeeOracleV1::new(U256::from(1_000), 0));
        oracle
            .set_fee_params(
                OMNI,
                ChainFeeParams {
                    gas_price: U256::from(1),
                    to_native_rate: U256::from(CONVERSION_RATE_DENOM),
                    posts_to: 0,
                },
            )
            .unwrap();

        let pump = GasPump::new(
            OWNER,
            oracle,
            PumpConfig {
                omni_chain_id: OMNI,
                gas_station: STATION,
                max_swap: U256::from(10u64.pow(18)),
                pct_cut: 50,
            },
        )
        .unwrap();

        let treasury = Arc::new(Treasury::default());
        let station = GasStation::new(OWNER, Arc::clone(&treasury));
        station.set_pump(OWNER, SOURCE, PUMP).unwrap();

        Self { pump, station, treasury, offset: AtomicU64::new(1) }
    }

    /// Emits the receipt's call on the pump's stream to the Omni chain.
    fn deliver(&self, receipt: &SwapReceipt) -> XMsg {
        XMsg::new(
            SOURCE,
            receipt.call.dest_chain_id,
            self.offset.fetch_add(1, Ordering::SeqCst),
            PUMP,
            receipt.call.to,
            receipt.call.data.clone(),
            receipt.call.gas_limit,
            receipt.call.conf_level,
        )
    }
}

#[tokio::test]
async fn test_swaps_settle_cumulatively() {
    let h = Harness::new();
    let deposit = h.pump.eth_needed_for(U256::from(1_000_000)).unwrap();

    let first = h.pump.swap(RECIPIENT, deposit).unwrap();
    let res = h.station.settle_xmsg(&h.deliver(&first)).await.unwrap();
    assert_eq!(res, Settlement::Funded { delta: first.amount, total: first.total_owed });

    // The second transfer fails, its total stays outstanding.
    h.treasury.offline.store(true, Ordering::SeqCst);
    let second = h.pump.swap(RECIPIENT, deposit).unwrap();
    let msg = h.deliver(&second);
    assert!(matches!(
        h.station.settle_xmsg(&msg).await.unwrap(),
        Settlement::TransferFailed { outstanding, .. } if outstanding == second.amount
    ));
    assert_eq!(h.station.funded(RECIPIENT, SOURCE), first.total_owed);

    // A redelivery of the same message settles it once the treasury is back.
    h.treasury.offline.store(false, Ordering::SeqCst);
    let res = h.station.settle_xmsg(&msg).await.unwrap();
    assert_eq!(res, Settlement::Funded { delta: second.amount, total: second.total_owed });
    assert_eq!(h.station.settle_xmsg(&msg).await.unwrap(), Settlement::AlreadyFunded);

    let paid =
        h.treasury.paid.lock().unwrap().iter().fold(U256::ZERO, |acc, (_, amount)| acc + *amount);
    assert_eq!(paid, h.pump.owed(RECIPIENT));
    assert_eq!(h.station.funded(RECIPIENT, SOURCE), h.pump.owed(RECIPIENT));
}

#[tokio::test]
async fn test_lost_message_covered_by_next_swap() {
    let h = Harness::new();
    let deposit = U256::from(100_000_000);

    // The first message is never delivered.
    let lost = h.pump.swap(RECIPIENT, deposit).unwrap();
    let _ = h.deliver(&lost);

    let next = h.pump.swap(RECIPIENT, deposit).unwrap();
    let res = h.station.settle_xmsg(&h.deliver(&next)).await.unwrap();
    let delta = lost.amount + next.amount;
    assert_eq!(res, Settlement::Funded { delta, total: next.total_owed });

    // The stale message arrives late and is rejected without effect.
    let stale = h.station.settle_xmsg(&h.deliver(&lost)).await;
    assert!(stale.is_err());
    assert_eq!(h.station.funded(RECIPIENT, SOURCE), next.total_owed);
}
