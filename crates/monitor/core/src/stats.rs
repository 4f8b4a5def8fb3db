//! Per stream latency statistics.

use crate::ObservationStore;
use omni_xchain::StreamId;
use std::collections::BTreeMap;

/// Message counts and the mean latency of one stream.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LatencyStats {
    /// Messages sent.
    pub total_sent: u64,
    /// Messages with an observed receipt.
    pub total_received: u64,
    /// Mean latency of the received messages, in seconds.
    pub avg: f64,
}

impl LatencyStats {
    /// Records one received message with `latency` seconds.
    ///
    /// The mean is updated incrementally, `avg_n = (avg_{n-1} * (n - 1) + x_n) / n`.
    pub fn record(&mut self, latency: f64) {
        self.total_received += 1;
        let n = self.total_received as f64;
        self.avg = (self.avg * (n - 1.0) + latency) / n;
    }
}

/// Returns the latency in seconds between a message and its receipt block timestamps.
///
/// Negative if the destination clock runs behind the source clock.
pub fn latency(msg_timestamp: u64, receipt_timestamp: u64) -> f64 {
    receipt_timestamp as f64 - msg_timestamp as f64
}

/// Returns the latency stats of every stream observed by `store`, ordered by stream.
pub fn aggregate(store: &ObservationStore) -> BTreeMap<StreamId, LatencyStats> {
    store.aggregate()
}

/// Stats published by the monitor on every aggregation tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsSnapshot {
    /// Stats per stream.
    pub streams: BTreeMap<StreamId, LatencyStats>,
    /// Messages still waiting for a receipt.
    pub pending: usize,
}

impl StatsSnapshot {
    /// Takes a snapshot of `store`.
    pub fn collect(store: &ObservationStore) -> Self {
        Self { streams: aggregate(store), pending: store.pending() }
    }

    /// Returns the stats of `stream`, if it was observed.
    pub fn stream(&self, stream: &StreamId) -> Option<&LatencyStats> {
        self.streams.get(stream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_incremental_mean() {
        let mut stats = LatencyStats::default();
        for x in [4.0, 8.0, 12.0, 0.0] {
            stats.record(x);
        }
        assert_eq!(stats.total_received, 4);
        assert_eq!(stats.avg, 6.0);
    }

    #[test]
    fn test_incremental_mean_matches_batch_mean() {
        let samples: Vec<f64> = (1..=1_000).map(|i| f64::from(i % 37)).collect();
        let mut stats = LatencyStats::default();
        samples.iter().for_each(|x| stats.record(*x));

        let mean = samples.iter().sum::<f64>() / samples.len() as f64;
        assert!((stats.avg - mean).abs() < 1e-9);
    }

    #[rstest]
    #[case::later(10, 25, 15.0)]
    #[case::same_block_time(10, 10, 0.0)]
    #[case::clock_skew(10, 8, -2.0)]
    fn test_latency(#[case] msg: u64, #[case] receipt: u64, #[case] expected: f64) {
        assert_eq!(latency(msg, receipt), expected);
    }
}
