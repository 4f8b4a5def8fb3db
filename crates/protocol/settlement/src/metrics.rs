//! Metrics for the settlement ledger.

/// Container for metrics.
#[derive(Debug, Clone)]
pub(crate) struct Metrics;

impl Metrics {
    /// Identifier for the counter of settlement requests, labelled by outcome. Rejected requests
    /// also carry the rejection reason.
    pub(crate) const SETTLEMENT_REQUESTS_TOTAL: &'static str = "omni_settlement_requests_total";

    pub(crate) const OUTCOME_FUNDED: &'static str = "funded";
    pub(crate) const OUTCOME_ALREADY_FUNDED: &'static str = "already_funded";
    pub(crate) const OUTCOME_TRANSFER_FAILED: &'static str = "transfer_failed";
    pub(crate) const OUTCOME_REJECTED: &'static str = "rejected";

    /// Describes the metrics and zeroes the success outcomes.
    pub(crate) fn init() {
        metrics::describe_counter!(
            Self::SETTLEMENT_REQUESTS_TOTAL,
            metrics::Unit::Count,
            "Total number of settlement requests handled by the gas station, by outcome",
        );

        let outcomes =
            [Self::OUTCOME_FUNDED, Self::OUTCOME_ALREADY_FUNDED, Self::OUTCOME_TRANSFER_FAILED];
        for outcome in outcomes {
            metrics::counter!(Self::SETTLEMENT_REQUESTS_TOTAL, "outcome" => outcome).increment(0);
        }
    }

    pub(crate) fn record(outcome: &'static str) {
        metrics::counter!(Self::SETTLEMENT_REQUESTS_TOTAL, "outcome" => outcome).increment(1);
    }

    pub(crate) fn record_rejected(reason: &'static str) {
        metrics::counter!(
            Self::SETTLEMENT_REQUESTS_TOTAL,
            "outcome" => Self::OUTCOME_REJECTED,
            "reason" => reason,
        )
        .increment(1);
    }
}
