//! Hot-reloadable tuning surface.
//!
//! The externally owned control plane (REST host, ops tooling) adjusts the
//! live engine through these setters; the tick re-reads a snapshot every
//! cycle, never caching at startup. Mutation happens only through the
//! entry points below, under one lock.

use parking_lot::RwLock;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Full tuning step for the spread factors.
const TUNING_STEP: Decimal = Decimal::from_parts(1, 0, 0, false, 4); // 0.0001
/// Half tuning step.
const TUNING_HALF_STEP: Decimal = Decimal::from_parts(5, 0, 0, false, 5); // 0.00005
/// Step for the default priority rate.
const RATE_STEP: u64 = 10_000;

/// Live-tunable parameters, re-read each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TuningParams {
    /// Multiplier applied to the bid candidate after smoothing.
    pub bid_tuning_factor: Decimal,
    /// Multiplier applied to the ask candidate after smoothing.
    pub ask_tuning_factor: Decimal,
    /// Base priority rate when no signal is active.
    pub default_priority_rate: u64,
    /// Base quote size in base-asset units.
    pub quote_size: Decimal,
}

/// Shared handle to the tuning parameters.
///
/// Cheap to clone; all clones see the same values.
#[derive(Debug, Clone)]
pub struct TuningHandle {
    inner: Arc<RwLock<TuningParams>>,
}

impl TuningHandle {
    pub fn new(default_priority_rate: u64, quote_size: Decimal) -> Self {
        Self {
            inner: Arc::new(RwLock::new(TuningParams {
                bid_tuning_factor: Decimal::ONE,
                ask_tuning_factor: Decimal::ONE,
                default_priority_rate,
                quote_size,
            })),
        }
    }

    /// Copy of the current parameters.
    pub fn snapshot(&self) -> TuningParams {
        *self.inner.read()
    }

    /// Lower the bid factor one step (quote further from the market).
    pub fn widen_bids(&self) -> Decimal {
        self.adjust_bid(-TUNING_STEP)
    }

    /// Raise the bid factor one step (quote closer to the market).
    pub fn tighten_bids(&self) -> Decimal {
        self.adjust_bid(TUNING_STEP)
    }

    pub fn tighten_bids_half(&self) -> Decimal {
        self.adjust_bid(TUNING_HALF_STEP)
    }

    pub fn reset_bids(&self) {
        self.inner.write().bid_tuning_factor = Decimal::ONE;
        info!("bid tuning factor reset");
    }

    /// Raise the ask factor one step (quote further from the market).
    pub fn widen_asks(&self) -> Decimal {
        self.adjust_ask(TUNING_STEP)
    }

    /// Lower the ask factor one step (quote closer to the market).
    pub fn tighten_asks(&self) -> Decimal {
        self.adjust_ask(-TUNING_STEP)
    }

    pub fn tighten_asks_half(&self) -> Decimal {
        self.adjust_ask(-TUNING_HALF_STEP)
    }

    pub fn reset_asks(&self) {
        self.inner.write().ask_tuning_factor = Decimal::ONE;
        info!("ask tuning factor reset");
    }

    /// Raise the default priority rate one step. Returns the new rate.
    pub fn raise_default_rate(&self) -> u64 {
        let mut params = self.inner.write();
        params.default_priority_rate = params.default_priority_rate.saturating_add(RATE_STEP);
        info!(rate = params.default_priority_rate, "default priority rate raised");
        params.default_priority_rate
    }

    /// Lower the default priority rate one step. Returns the new rate.
    pub fn lower_default_rate(&self) -> u64 {
        let mut params = self.inner.write();
        params.default_priority_rate = params.default_priority_rate.saturating_sub(RATE_STEP);
        info!(rate = params.default_priority_rate, "default priority rate lowered");
        params.default_priority_rate
    }

    /// Replace the base quote size. Returns the previous size.
    pub fn set_quote_size(&self, size: Decimal) -> Decimal {
        let mut params = self.inner.write();
        let old = params.quote_size;
        params.quote_size = size;
        info!(old = %old, new = %size, "quote size updated");
        old
    }

    fn adjust_bid(&self, delta: Decimal) -> Decimal {
        let mut params = self.inner.write();
        params.bid_tuning_factor += delta;
        info!(factor = %params.bid_tuning_factor, "bid tuning factor adjusted");
        params.bid_tuning_factor
    }

    fn adjust_ask(&self, delta: Decimal) -> Decimal {
        let mut params = self.inner.write();
        params.ask_tuning_factor += delta;
        info!(factor = %params.ask_tuning_factor, "ask tuning factor adjusted");
        params.ask_tuning_factor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_starts_neutral() {
        let handle = TuningHandle::new(101_420, dec!(2));
        let params = handle.snapshot();
        assert_eq!(params.bid_tuning_factor, dec!(1));
        assert_eq!(params.ask_tuning_factor, dec!(1));
        assert_eq!(params.default_priority_rate, 101_420);
        assert_eq!(params.quote_size, dec!(2));
    }

    #[test]
    fn test_bid_steps_and_reset() {
        let handle = TuningHandle::new(101_420, dec!(2));
        assert_eq!(handle.widen_bids(), dec!(0.9999));
        assert_eq!(handle.tighten_bids(), dec!(1.0000));
        assert_eq!(handle.tighten_bids_half(), dec!(1.00005));
        handle.reset_bids();
        assert_eq!(handle.snapshot().bid_tuning_factor, dec!(1));
    }

    #[test]
    fn test_ask_steps_mirror_bid_direction() {
        let handle = TuningHandle::new(101_420, dec!(2));
        // Asks widen upward, tighten downward.
        assert_eq!(handle.widen_asks(), dec!(1.0001));
        assert_eq!(handle.tighten_asks(), dec!(1.0000));
        assert_eq!(handle.tighten_asks_half(), dec!(0.99995));
        handle.reset_asks();
        assert_eq!(handle.snapshot().ask_tuning_factor, dec!(1));
    }

    #[test]
    fn test_rate_steps() {
        let handle = TuningHandle::new(101_420, dec!(2));
        assert_eq!(handle.raise_default_rate(), 111_420);
        assert_eq!(handle.lower_default_rate(), 101_420);
    }

    #[test]
    fn test_clones_share_state() {
        let handle = TuningHandle::new(101_420, dec!(2));
        let clone = handle.clone();
        clone.set_quote_size(dec!(4));
        assert_eq!(handle.snapshot().quote_size, dec!(4));
    }
}
