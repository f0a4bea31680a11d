//! Prometheus metrics for the quoting engine.
//!
//! # Panics
//!
//! Metric registration uses `unwrap()` intentionally: a registration
//! failure (duplicate metric name) is a fatal configuration error that
//! should crash at startup, never at runtime.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_gauge_vec, register_int_gauge, CounterVec, GaugeVec, IntGauge,
};

/// Total quote submissions handed to the dispatcher.
/// Labels: side (bid/ask), action (new/replace).
pub static QUOTES_SUBMITTED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "obmm_quotes_submitted_total",
        "Total quote submissions handed to the dispatcher",
        &["side", "action"]
    )
    .unwrap()
});

/// Total quote submissions that failed at the gateway.
pub static SUBMISSIONS_FAILED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "obmm_submissions_failed_total",
        "Total quote submissions that failed at the gateway",
        &["side"]
    )
    .unwrap()
});

/// Total quote changes suppressed by the throttle gate.
/// Labels: side, reason (unchanged/self_cross).
pub static THROTTLE_SUPPRESSED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "obmm_throttle_suppressed_total",
        "Total quote changes suppressed by the throttle gate",
        &["side", "reason"]
    )
    .unwrap()
});

/// Total adversity events (reference bound crossed a live quote).
pub static ADVERSITY_EVENTS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "obmm_adversity_events_total",
        "Total adversity events detected",
        &["side"]
    )
    .unwrap()
});

/// Total hard cancel-and-settle invocations by the reconciliation safeguard.
pub static HARD_CANCELS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "obmm_hard_cancels_total",
        "Total hard cancel-and-settle invocations",
        &["side"]
    )
    .unwrap()
});

/// Current priority rate chosen for the tick.
pub static PRIORITY_RATE: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!(
        "obmm_priority_rate",
        "Priority rate chosen on the latest tick"
    )
    .unwrap()
});

/// Candidate prices per side on the latest tick.
pub static CANDIDATE_PRICE: Lazy<GaugeVec> = Lazy::new(|| {
    register_gauge_vec!(
        "obmm_candidate_price",
        "Candidate quote price on the latest tick",
        &["side"]
    )
    .unwrap()
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_register_once() {
        // Touch every static; a duplicate registration would panic here.
        QUOTES_SUBMITTED_TOTAL.with_label_values(&["bid", "new"]).inc();
        SUBMISSIONS_FAILED_TOTAL.with_label_values(&["ask"]).inc();
        THROTTLE_SUPPRESSED_TOTAL
            .with_label_values(&["bid", "unchanged"])
            .inc();
        ADVERSITY_EVENTS_TOTAL.with_label_values(&["ask"]).inc();
        HARD_CANCELS_TOTAL.with_label_values(&["bid"]).inc();
        PRIORITY_RATE.set(101_420);
        CANDIDATE_PRICE.with_label_values(&["bid"]).set(24.98);
    }
}
