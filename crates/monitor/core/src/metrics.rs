//! Metrics for the monitor and the relayer.

use crate::StatsSnapshot;
use alloy_primitives::ChainId;
use omni_netconf::Network;
use omni_xchain::stream_name;

/// Container for metrics.
#[derive(Debug, Clone)]
pub(crate) struct Metrics;

impl Metrics {
    /// Identifier for the gauge of messages sent, labelled by stream.
    pub(crate) const STREAM_SENT: &'static str = "omni_monitor_stream_sent";
    /// Identifier for the gauge of receipts observed, labelled by stream.
    pub(crate) const STREAM_RECEIVED: &'static str = "omni_monitor_stream_received";
    /// Identifier for the gauge of the average latency, labelled by stream.
    pub(crate) const STREAM_AVG_LATENCY: &'static str = "omni_monitor_stream_avg_latency_seconds";
    /// Identifier for the gauge of messages still waiting for a receipt.
    pub(crate) const PENDING_MSGS: &'static str = "omni_monitor_pending_msgs";
    /// Identifier for the counter of subscription errors, labelled by chain id.
    pub(crate) const SUBSCRIPTION_ERRORS_TOTAL: &'static str =
        "omni_monitor_subscription_errors_total";
    /// Identifier for the counter of relayed messages, labelled by outcome.
    pub(crate) const RELAYED_MSGS_TOTAL: &'static str = "omni_relay_msgs_total";

    pub(crate) const OUTCOME_SUCCESS: &'static str = "success";
    pub(crate) const OUTCOME_FAILURE: &'static str = "failure";

    /// Describes the metrics.
    pub(crate) fn init() {
        metrics::describe_gauge!(
            Self::STREAM_SENT,
            metrics::Unit::Count,
            "Messages sent on the stream since the monitor started"
        );
        metrics::describe_gauge!(
            Self::STREAM_RECEIVED,
            metrics::Unit::Count,
            "Receipts observed on the stream since the monitor started"
        );
        metrics::describe_gauge!(
            Self::STREAM_AVG_LATENCY,
            metrics::Unit::Seconds,
            "Average latency between a message and its receipt"
        );
        metrics::describe_gauge!(
            Self::PENDING_MSGS,
            metrics::Unit::Count,
            "Observed messages without a receipt"
        );
        metrics::describe_counter!(
            Self::SUBSCRIPTION_ERRORS_TOTAL,
            metrics::Unit::Count,
            "Block subscription errors, by chain"
        );
        metrics::describe_counter!(
            Self::RELAYED_MSGS_TOTAL,
            metrics::Unit::Count,
            "Messages submitted by the relayer, by outcome"
        );
    }

    pub(crate) fn record_subscription_error(chain_id: ChainId) {
        metrics::counter!(Self::SUBSCRIPTION_ERRORS_TOTAL, "chain_id" => chain_id.to_string())
            .increment(1);
    }

    pub(crate) fn record_relayed(outcome: &'static str, count: usize) {
        metrics::counter!(Self::RELAYED_MSGS_TOTAL, "outcome" => outcome).increment(count as u64);
    }

    pub(crate) fn record_snapshot(network: &Network, snapshot: &StatsSnapshot) {
        for (stream_id, stats) in &snapshot.streams {
            let stream = stream_name(network, *stream_id);
            metrics::gauge!(Self::STREAM_SENT, "stream" => stream.clone())
                .set(stats.total_sent as f64);
            metrics::gauge!(Self::STREAM_RECEIVED, "stream" => stream.clone())
                .set(stats.total_received as f64);
            metrics::gauge!(Self::STREAM_AVG_LATENCY, "stream" => stream).set(stats.avg);
        }
        metrics::gauge!(Self::PENDING_MSGS).set(snapshot.pending as f64);
    }
}
