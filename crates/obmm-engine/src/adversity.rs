//! Time-boxed adversity adjustments.
//!
//! After an adversity event (the reference bound crossed a live quote) two
//! decaying adjustments run off the same timestamp:
//! - a multiplicative price widening that decays linearly to exactly zero
//!   at the window boundary, avoiding a hard step at window exit;
//! - a priority-rate escalation `(window - elapsed) * step - reduction`,
//!   clamped at zero, that resets to the default rate outside the window.
//!
//! Both are pure functions of elapsed wall-clock time; no external event
//! cancels a window early.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Fractional price widening for `elapsed_ms` into a window.
///
/// Returns `widen_bps * remaining/window / 10_000`, monotonically
/// non-increasing in elapsed time and exactly zero from the boundary on.
pub fn widen_fraction(elapsed_ms: u64, window_ms: u64, widen_bps: Decimal) -> Decimal {
    if window_ms == 0 || elapsed_ms >= window_ms {
        return Decimal::ZERO;
    }
    let remaining = Decimal::from(window_ms - elapsed_ms) / Decimal::from(window_ms);
    widen_bps * remaining / dec!(10000)
}

/// Priority-rate escalation for `elapsed_ms` into a fee window.
///
/// `rate_step` is per remaining second; `reduction` is subtracted before
/// clamping at zero, so the escalation dies out slightly before the
/// boundary rather than jumping.
pub fn escalation(elapsed_ms: u64, window_ms: u64, rate_step: u64, reduction: u64) -> u64 {
    if window_ms == 0 || elapsed_ms >= window_ms {
        return 0;
    }
    let remaining_ms = (window_ms - elapsed_ms) as u128;
    let raw = remaining_ms * rate_step as u128 / 1_000;
    raw.saturating_sub(reduction as u128) as u64
}
