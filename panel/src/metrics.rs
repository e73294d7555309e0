//! Prometheus metrics for transaction panels.
//!
//! Every counter is labelled by action (`claim`, `mint`, `burn`, ...). The
//! [`PanelMetrics`] struct owns a dedicated [`Registry`] that a host
//! application can encode into the Prometheus text exposition format.

use prometheus::{
    register_int_counter_vec_with_registry, Encoder, IntCounterVec, Opts, Registry, TextEncoder,
};

/// Counters covering the transaction lifecycle.
pub struct PanelMetrics {
    /// The Prometheus registry that owns every metric below.
    pub registry: Registry,
    /// Submissions that passed their guards and reached the wallet.
    pub submissions: IntCounterVec,
    /// Submissions stopped by a failing guard.
    pub guard_blocks: IntCounterVec,
    /// Submissions the wallet or node rejected.
    pub submission_failures: IntCounterVec,
    /// Submits ignored because the action was busy.
    pub ignored_submits: IntCounterVec,
    /// Transactions confirmed on chain.
    pub confirmations: IntCounterVec,
    /// Broadcast transactions that reverted.
    pub reverts: IntCounterVec,
}

impl PanelMetrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let submissions = register_int_counter_vec_with_registry!(
            Opts::new(
                "synthstake_submissions_total",
                "Submissions sent to the wallet"
            ),
            &["action"],
            registry
        )
        .expect("failed to register submissions counter");

        let guard_blocks = register_int_counter_vec_with_registry!(
            Opts::new(
                "synthstake_guard_blocks_total",
                "Submissions blocked by a failing guard"
            ),
            &["action"],
            registry
        )
        .expect("failed to register guard_blocks counter");

        let submission_failures = register_int_counter_vec_with_registry!(
            Opts::new(
                "synthstake_submission_failures_total",
                "Submissions rejected by the wallet or node"
            ),
            &["action"],
            registry
        )
        .expect("failed to register submission_failures counter");

        let ignored_submits = register_int_counter_vec_with_registry!(
            Opts::new(
                "synthstake_ignored_submits_total",
                "Submits ignored while a transaction was in flight"
            ),
            &["action"],
            registry
        )
        .expect("failed to register ignored_submits counter");

        let confirmations = register_int_counter_vec_with_registry!(
            Opts::new(
                "synthstake_confirmations_total",
                "Transactions confirmed on chain"
            ),
            &["action"],
            registry
        )
        .expect("failed to register confirmations counter");

        let reverts = register_int_counter_vec_with_registry!(
            Opts::new("synthstake_reverts_total", "Transactions reverted on chain"),
            &["action"],
            registry
        )
        .expect("failed to register reverts counter");

        Self {
            registry,
            submissions,
            guard_blocks,
            submission_failures,
            ignored_submits,
            confirmations,
            reverts,
        }
    }

    /// Encode every metric in the text exposition format.
    pub fn encode(&self) -> String {
        let mut buffer = Vec::new();
        let encoder = TextEncoder::new();
        if let Err(e) = encoder.encode(&self.registry.gather(), &mut buffer) {
            tracing::warn!(error = %e, "failed to encode metrics");
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}

impl Default for PanelMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_are_labelled_by_action() {
        let metrics = PanelMetrics::new();
        metrics.submissions.with_label_values(&["mint"]).inc();
        metrics.submissions.with_label_values(&["mint"]).inc();
        metrics.submissions.with_label_values(&["burn"]).inc();
        assert_eq!(metrics.submissions.with_label_values(&["mint"]).get(), 2);
        assert_eq!(metrics.submissions.with_label_values(&["burn"]).get(), 1);
    }

    #[test]
    fn encode_contains_metric_names() {
        let metrics = PanelMetrics::new();
        metrics.confirmations.with_label_values(&["claim"]).inc();
        let text = metrics.encode();
        assert!(text.contains("synthstake_confirmations_total"));
        assert!(text.contains("action=\"claim\""));
    }
}
