//! Ordered submission of observed messages to their destination chains.
//!
//! Messages of one stream are submitted strictly by stream offset, one at a time. Streams are
//! independent and submitted concurrently.

use crate::{RelayError, metrics::Metrics};
use async_trait::async_trait;
use futures::future::join_all;
use omni_xchain::{MsgId, OrderedBuffer, StreamId, XBlock, XMsg, XReceipt};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Offset of the first message on every stream.
pub const INITIAL_STREAM_OFFSET: u64 = 1;

/// Submits messages for execution on their destination chain.
#[async_trait]
pub trait XSubmitter: Send + Sync {
    /// Submits `msg` and returns the receipt of its execution.
    async fn submit(&self, msg: &XMsg) -> Result<XReceipt, RelayError>;
}

/// Outcome of one [OrderedRelayer::relay] round.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelayReport {
    /// Receipts of the submitted messages, in submission order per stream.
    pub receipts: Vec<XReceipt>,
    /// Messages whose submission failed. Each blocks its stream until the next round.
    pub failed: Vec<(MsgId, RelayError)>,
}

/// Buffers messages per stream and submits each stream's ready run in offset order.
#[derive(Debug)]
pub struct OrderedRelayer<S> {
    submitter: S,
    streams: BTreeMap<StreamId, OrderedBuffer<XMsg>>,
}

impl<S: XSubmitter> OrderedRelayer<S> {
    /// Creates a relayer with every stream starting at [INITIAL_STREAM_OFFSET].
    pub fn new(submitter: S) -> Self {
        Metrics::init();
        Self { submitter, streams: BTreeMap::new() }
    }

    /// Resumes `stream` at `next_offset`, e.g. the offset after the last one executed on the
    /// destination chain. Buffered messages below it are dropped.
    pub fn resume(&mut self, stream: StreamId, next_offset: u64) {
        self.streams
            .entry(stream)
            .or_insert_with(|| OrderedBuffer::new(next_offset))
            .reset(next_offset);
    }

    /// Buffers `msg`. Returns false if its offset was already relayed.
    pub fn push(&mut self, msg: XMsg) -> bool {
        let stream = msg.stream_id();
        let offset = msg.stream_offset();
        let inserted = self
            .streams
            .entry(stream)
            .or_insert_with(|| OrderedBuffer::new(INITIAL_STREAM_OFFSET))
            .insert(offset, msg);

        if !inserted {
            debug!(target: "relay::ordered", %stream, offset, "Skipping relayed message");
        }
        inserted
    }

    /// Buffers the messages of `block`. Returns the number of new messages.
    pub fn push_block(&mut self, block: &XBlock) -> usize {
        block.msgs.iter().filter(|msg| self.push((*msg).clone())).count()
    }

    /// Returns the number of buffered messages over all streams.
    pub fn pending(&self) -> usize {
        self.streams.values().map(OrderedBuffer::len).sum()
    }

    /// Returns the next offset to submit on `stream`.
    pub fn next_offset(&self, stream: &StreamId) -> u64 {
        self.streams.get(stream).map_or(INITIAL_STREAM_OFFSET, OrderedBuffer::next_offset)
    }

    /// Submits the ready messages of every stream.
    ///
    /// A stream stops at its first failed submission. The failed message and everything after
    /// it stay buffered for the next round.
    pub async fn relay(&mut self) -> RelayReport {
        let submitter = &self.submitter;
        let runs = self
            .streams
            .iter_mut()
            .filter(|(_, buffer)| buffer.next_ready().is_some())
            .map(|(stream, buffer)| relay_stream(submitter, *stream, buffer));

        let mut report = RelayReport::default();
        for (receipts, failure) in join_all(runs).await {
            report.receipts.extend(receipts);
            report.failed.extend(failure);
        }

        Metrics::record_relayed(Metrics::OUTCOME_SUCCESS, report.receipts.len());
        Metrics::record_relayed(Metrics::OUTCOME_FAILURE, report.failed.len());
        report
    }
}

async fn relay_stream<S: XSubmitter>(
    submitter: &S,
    stream: StreamId,
    buffer: &mut OrderedBuffer<XMsg>,
) -> (Vec<XReceipt>, Option<(MsgId, RelayError)>) {
    let mut receipts = vec![];

    while let Some(msg) = buffer.next_ready() {
        let msg_id = msg.id;
        let res = submitter.submit(msg).await;
        match res {
            Ok(receipt) => {
                if !receipt.success {
                    warn!(target: "relay::ordered", %msg_id, "Message execution reverted");
                }
                buffer.advance();
                receipts.push(receipt);
            }
            Err(err) => {
                warn!(target: "relay::ordered", %stream, %msg_id, %err, "Submission failed");
                return (receipts, Some((msg_id, err)));
            }
        }
    }

    debug!(target: "relay::ordered", %stream, submitted = receipts.len(), "Stream relayed");
    (receipts, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, Bytes, ChainId};
    use mockall::mock;
    use omni_xchain::{ConfLevel, test_util::XBlockBuilder};
    use std::{collections::HashSet, sync::Mutex};

    mock!(
        #[derive(Debug)]
        pub Submitter {}

        #[async_trait]
        impl XSubmitter for Submitter {
            async fn submit(&self, msg: &XMsg) -> Result<XReceipt, RelayError>;
        }
    );

    /// Records submissions, failing each message in `fail_once` on its first submission.
    #[derive(Debug, Default)]
    struct Recorder {
        submitted: Mutex<Vec<MsgId>>,
        fail_once: Mutex<HashSet<MsgId>>,
    }

    #[async_trait]
    impl XSubmitter for Recorder {
        async fn submit(&self, msg: &XMsg) -> Result<XReceipt, RelayError> {
            // Lets the other streams interleave.
            tokio::task::yield_now().await;
            if self.fail_once.lock().unwrap().remove(&msg.id) {
                return Err(RelayError::Submit { msg_id: msg.id, reason: "nonce too low".into() });
            }
            self.submitted.lock().unwrap().push(msg.id);
            Ok(receipt(msg.id))
        }
    }

    fn receipt(msg_id: MsgId) -> XReceipt {
        XReceipt { msg_id, success: true, gas_used: 21_000, relayer: Address::repeat_byte(0xcc) }
    }

    fn msg(dest: ChainId, offset: u64) -> XMsg {
        XMsg::new(
            2,
            dest,
            offset,
            Address::repeat_byte(0xaa),
            Address::repeat_byte(0xbb),
            Bytes::new(),
            100_000,
            ConfLevel::Finalized,
        )
    }

    fn offsets(receipts: &[XReceipt], dest: ChainId) -> Vec<u64> {
        receipts
            .iter()
            .filter(|receipt| receipt.dest_chain_id() == dest)
            .map(|receipt| receipt.msg_id.stream_offset)
            .collect()
    }

    #[tokio::test]
    async fn test_submits_in_offset_order() {
        let mut relayer = OrderedRelayer::new(Recorder::default());
        for offset in [3, 1, 2] {
            assert!(relayer.push(msg(3, offset)));
        }

        let report = relayer.relay().await;
        assert_eq!(offsets(&report.receipts, 3), vec![1, 2, 3]);
        assert!(report.failed.is_empty());
        assert_eq!(relayer.pending(), 0);
        assert_eq!(relayer.next_offset(&msg(3, 1).stream_id()), 4);
    }

    #[tokio::test]
    async fn test_gap_holds_back_later_offsets() {
        let mut relayer = OrderedRelayer::new(Recorder::default());
        relayer.push(msg(3, 1));
        relayer.push(msg(3, 3));

        let report = relayer.relay().await;
        assert_eq!(offsets(&report.receipts, 3), vec![1]);
        assert_eq!(relayer.pending(), 1);

        relayer.push(msg(3, 2));
        let report = relayer.relay().await;
        assert_eq!(offsets(&report.receipts, 3), vec![2, 3]);
    }

    #[tokio::test]
    async fn test_failure_stops_only_its_stream() {
        let recorder = Recorder::default();
        recorder.fail_once.lock().unwrap().insert(msg(3, 2).id);
        let mut relayer = OrderedRelayer::new(recorder);
        for offset in 1..=3 {
            relayer.push(msg(3, offset));
            relayer.push(msg(4, offset));
        }

        let report = relayer.relay().await;
        assert_eq!(offsets(&report.receipts, 3), vec![1]);
        assert_eq!(offsets(&report.receipts, 4), vec![1, 2, 3]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, msg(3, 2).id);
        assert_eq!(relayer.pending(), 2);

        let report = relayer.relay().await;
        assert_eq!(offsets(&report.receipts, 3), vec![2, 3]);

        // Never out of order within a stream, whatever the interleaving across streams.
        let submitted = relayer.submitter.submitted.lock().unwrap().clone();
        for dest in [3, 4] {
            let stream: Vec<_> = submitted
                .iter()
                .filter(|id| id.stream_id.dest_chain_id == dest)
                .map(|id| id.stream_offset)
                .collect();
            assert_eq!(stream, vec![1, 2, 3]);
        }
    }

    #[tokio::test]
    async fn test_failed_submission_is_not_skipped() {
        let mut submitter = MockSubmitter::new();
        submitter.expect_submit().times(1).returning(|msg| {
            Err(RelayError::Submit { msg_id: msg.id, reason: "underpriced".into() })
        });

        let mut relayer = OrderedRelayer::new(submitter);
        relayer.push(msg(3, 1));
        relayer.push(msg(3, 2));

        let report = relayer.relay().await;
        assert!(report.receipts.is_empty());
        assert_eq!(
            report.failed,
            vec![(
                msg(3, 1).id,
                RelayError::Submit { msg_id: msg(3, 1).id, reason: "underpriced".into() }
            )]
        );
        assert_eq!(relayer.next_offset(&msg(3, 1).stream_id()), 1);
        assert_eq!(relayer.pending(), 2);
    }

    #[tokio::test]
    async fn test_resume_and_skip_relayed() {
        let mut submitter = MockSubmitter::new();
        submitter
            .expect_submit()
            .withf(|msg| msg.stream_offset() == 5)
            .times(1)
            .returning(|msg| Ok(receipt(msg.id)));

        let mut relayer = OrderedRelayer::new(submitter);
        relayer.push(msg(3, 4));
        relayer.resume(msg(3, 1).stream_id(), 5);

        assert!(!relayer.push(msg(3, 3)));
        assert!(relayer.push(msg(3, 5)));
        assert_eq!(relayer.pending(), 1);

        let report = relayer.relay().await;
        assert_eq!(offsets(&report.receipts, 3), vec![5]);
        assert!(!relayer.push(msg(3, 5)));
    }

    #[tokio::test]
    async fn test_push_block() {
        let block = XBlockBuilder::new(2, 7)
            .msg(3, 1, ConfLevel::Finalized)
            .msg(3, 2, ConfLevel::Finalized)
            .msg(4, 1, ConfLevel::Latest)
            .build();

        let mut relayer = OrderedRelayer::new(Recorder::default());
        assert_eq!(relayer.push_block(&block), 3);
        // Buffered duplicates replace each other.
        assert_eq!(relayer.push_block(&block), 3);
        assert_eq!(relayer.pending(), 3);

        let report = relayer.relay().await;
        assert_eq!(report.receipts.len(), 3);
        assert_eq!(relayer.push_block(&block), 0);
    }
}
