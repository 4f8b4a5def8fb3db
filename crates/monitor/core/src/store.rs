//! Concurrent store of observed messages and receipts.

use crate::{LatencyStats, latency};
use alloy_primitives::ChainId;
use dashmap::DashMap;
use omni_xchain::{MsgId, Observation, StreamCursor, StreamId, XBlock, XMsg, XReceipt};
use std::{
    collections::BTreeMap,
    sync::atomic::{AtomicU64, Ordering},
};
use tracing::{debug, warn};

/// An item and the timestamp of the block it was observed in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timed<T> {
    /// The observed item.
    pub item: T,
    /// Block timestamp in unix seconds.
    pub timestamp: u64,
}

/// Counts of what [ObservationStore::record_block] stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Recorded {
    /// Messages stored.
    pub msgs: usize,
    /// Receipts stored.
    pub receipts: usize,
}

/// Messages and receipts keyed by [MsgId], written by many subscriptions at once.
///
/// A message without a receipt stays in the store until the receipt arrives, or until it is
/// pruned. Pruned entries are folded into retired per stream stats so that aggregates survive
/// eviction.
#[derive(Debug, Default)]
pub struct ObservationStore {
    msgs: DashMap<MsgId, Timed<XMsg>>,
    receipts: DashMap<MsgId, Timed<XReceipt>>,
    cursors: DashMap<StreamId, StreamCursor>,
    retired: DashMap<StreamId, LatencyStats>,
    latest_timestamp: AtomicU64,
}

impl ObservationStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the messages and receipts of `block`.
    ///
    /// Messages and receipts whose source is `consensus_chain_id` are skipped, they are
    /// bookkeeping of the protocol itself.
    pub fn record_block(&self, block: &XBlock, consensus_chain_id: ChainId) -> Recorded {
        let mut recorded = Recorded::default();
        self.latest_timestamp.fetch_max(block.timestamp, Ordering::Relaxed);

        for msg in block.msgs.iter().filter(|msg| msg.source_chain_id() != consensus_chain_id) {
            self.observe_offset(msg.id);
            self.msgs.insert(msg.id, Timed { item: msg.clone(), timestamp: block.timestamp });
            recorded.msgs += 1;
        }

        for receipt in
            block.receipts.iter().filter(|receipt| receipt.source_chain_id() != consensus_chain_id)
        {
            let timed = Timed { item: receipt.clone(), timestamp: block.timestamp };
            self.receipts.insert(receipt.msg_id, timed);
            recorded.receipts += 1;
        }

        debug!(
            target: "monitor::store",
            chain_id = block.chain_id,
            height = block.height,
            msgs = recorded.msgs,
            receipts = recorded.receipts,
            "Recorded block"
        );
        recorded
    }

    fn observe_offset(&self, id: MsgId) {
        let mut cursor = self
            .cursors
            .entry(id.stream_id)
            .or_insert_with(|| StreamCursor::new(id.stream_id, id.stream_offset));

        match cursor.observe(id) {
            Ok(Observation::Ahead { pending }) => {
                debug!(target: "monitor::store", %id, ?pending, "Offsets pending on stream");
            }
            Ok(Observation::Next | Observation::Duplicate) => {}
            Err(err) => warn!(target: "monitor::store", %err, "Stream offset out of order"),
        }
    }

    /// Returns the stored message `id`.
    pub fn msg(&self, id: &MsgId) -> Option<Timed<XMsg>> {
        self.msgs.get(id).map(|msg| msg.clone())
    }

    /// Returns the stored receipt of message `id`.
    pub fn receipt(&self, id: &MsgId) -> Option<Timed<XReceipt>> {
        self.receipts.get(id).map(|receipt| receipt.clone())
    }

    /// Returns the number of stored messages.
    pub fn msg_count(&self) -> usize {
        self.msgs.len()
    }

    /// Returns the number of stored receipts.
    pub fn receipt_count(&self) -> usize {
        self.receipts.len()
    }

    /// Returns the number of stored messages without a receipt.
    pub fn pending(&self) -> usize {
        self.msgs.iter().filter(|msg| !self.receipts.contains_key(msg.key())).count()
    }

    /// Returns the next offset expected on `stream`, if any message of it was observed.
    pub fn next_offset(&self, stream: &StreamId) -> Option<u64> {
        self.cursors.get(stream).map(|cursor| cursor.next_offset())
    }

    /// Returns the highest block timestamp recorded.
    pub fn latest_timestamp(&self) -> u64 {
        self.latest_timestamp.load(Ordering::Relaxed)
    }

    /// Evicts messages observed before `cutoff`, with their receipts, and receipts observed
    /// before `cutoff` whose message was never seen. Returns the number of evicted entries.
    ///
    /// Evicted messages still count in [ObservationStore::aggregate].
    pub fn prune(&self, cutoff: u64) -> usize {
        let mut evicted = 0;

        self.msgs.retain(|id, msg| {
            if msg.timestamp >= cutoff {
                return true;
            }

            let mut retired = self.retired.entry(id.stream_id).or_default();
            retired.total_sent += 1;
            if let Some((_, receipt)) = self.receipts.remove(id) {
                retired.record(latency(msg.timestamp, receipt.timestamp));
                evicted += 1;
            }
            evicted += 1;
            false
        });

        self.receipts.retain(|id, receipt| {
            let orphan = receipt.timestamp < cutoff && !self.msgs.contains_key(id);
            if orphan {
                evicted += 1;
            }
            !orphan
        });

        debug!(target: "monitor::store", cutoff, evicted, "Pruned observations");
        evicted
    }

    /// Returns the latency stats of every stream, evicted entries included.
    ///
    /// Latency is the timestamp difference between a message's block and its receipt's block.
    pub fn aggregate(&self) -> BTreeMap<StreamId, LatencyStats> {
        let mut stats: BTreeMap<StreamId, LatencyStats> =
            self.retired.iter().map(|retired| (*retired.key(), *retired.value())).collect();

        for msg in &self.msgs {
            let stream = stats.entry(msg.key().stream_id).or_default();
            stream.total_sent += 1;

            if let Some(receipt) = self.receipts.get(msg.key()) {
                stream.record(latency(msg.timestamp, receipt.timestamp));
            }
        }

        stats
    }
}
