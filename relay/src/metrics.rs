//! Prometheus metrics for the relay.
//!
//! The [`RelayMetrics`] struct owns a dedicated [`Registry`] that an
//! operational endpoint can encode into the text exposition format.

use prometheus::{
    register_int_counter_with_registry, register_int_gauge_with_registry, IntCounter, IntGauge,
    Opts, Registry,
};

/// Central collection of relay-level Prometheus metrics.
pub struct RelayMetrics {
    pub registry: Registry,

    // ── Counters ────────────────────────────────────────────────────────
    /// Events applied to the mirror (redeliveries included).
    pub events_processed: IntCounter,
    /// Inference jobs started (after the idempotency check).
    pub inference_started: IntCounter,
    /// Inference jobs that failed and went to the retry backlog.
    pub inference_failed: IntCounter,
    /// Answers successfully submitted back to the ledger.
    pub answers_submitted: IntCounter,
    /// Rounds pushed into finalization by the sweep.
    pub rounds_finalized: IntCounter,

    // ── Gauges ──────────────────────────────────────────────────────────
    /// Last processed event sequence (the persisted cursor).
    pub cursor: IntGauge,
    /// Current retry-backlog size.
    pub backlog_size: IntGauge,
}

impl RelayMetrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let events_processed = register_int_counter_with_registry!(
            Opts::new("veritas_relay_events_processed_total", "Events applied to the mirror"),
            registry
        )
        .expect("failed to register events_processed counter");

        let inference_started = register_int_counter_with_registry!(
            Opts::new("veritas_relay_inference_started_total", "Inference jobs started"),
            registry
        )
        .expect("failed to register inference_started counter");

        let inference_failed = register_int_counter_with_registry!(
            Opts::new("veritas_relay_inference_failed_total", "Inference jobs failed"),
            registry
        )
        .expect("failed to register inference_failed counter");

        let answers_submitted = register_int_counter_with_registry!(
            Opts::new(
                "veritas_relay_answers_submitted_total",
                "Answers submitted to the ledger"
            ),
            registry
        )
        .expect("failed to register answers_submitted counter");

        let rounds_finalized = register_int_counter_with_registry!(
            Opts::new(
                "veritas_relay_rounds_finalized_total",
                "Rounds finalized via the sweep"
            ),
            registry
        )
        .expect("failed to register rounds_finalized counter");

        let cursor = register_int_gauge_with_registry!(
            Opts::new("veritas_relay_cursor", "Last processed event sequence"),
            registry
        )
        .expect("failed to register cursor gauge");

        let backlog_size = register_int_gauge_with_registry!(
            Opts::new("veritas_relay_backlog_size", "Retry backlog size"),
            registry
        )
        .expect("failed to register backlog_size gauge");

        Self {
            registry,
            events_processed,
            inference_started,
            inference_failed,
            answers_submitted,
            rounds_finalized,
            cursor,
            backlog_size,
        }
    }
}

impl Default for RelayMetrics {
    fn default() -> Self {
        Self::new()
    }
}
