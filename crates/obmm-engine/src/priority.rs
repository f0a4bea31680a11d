//! Priority-fee controller.
//!
//! Aggregates the adversity-window escalation and the competitor-presence
//! increment into one effective rate, boosted multiplicatively for fresh
//! placements to win placement races. With no signal active the rate sits
//! at the hot-reloadable default.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Signals feeding the effective rate for one submission.
#[derive(Debug, Clone, Copy, Default)]
pub struct PriorityInputs {
    /// Adversity-window escalation from `adversity::escalation`.
    pub adversity_escalation: u64,
    /// A competitor-tier order rests at or better than the candidate.
    pub competitor_present: bool,
    /// The submission is a fresh placement, not a cancel-replace.
    pub is_fresh_placement: bool,
}

/// Advisory priority state read by the dispatch path.
#[derive(Debug, Clone, Copy)]
pub struct PriorityState {
    /// Rate chosen on the latest tick.
    pub current_rate: u64,
    /// Default rate when no signal is active.
    pub default_rate: u64,
}

impl PriorityState {
    pub fn new(default_rate: u64) -> Self {
        Self {
            current_rate: default_rate,
            default_rate,
        }
    }

    /// Record the rate chosen for the latest submission.
    pub fn update(&mut self, rate: u64) {
        self.current_rate = rate;
    }

    /// Back to the default rate (no signal active).
    pub fn reset(&mut self, default_rate: u64) {
        self.default_rate = default_rate;
        self.current_rate = default_rate;
    }
}

/// Effective priority rate for one submission.
pub fn effective_rate(
    default_rate: u64,
    inputs: PriorityInputs,
    competitor_increment: u64,
    fresh_boost: Decimal,
) -> u64 {
    let mut rate = default_rate.saturating_add(inputs.adversity_escalation);
    if inputs.competitor_present {
        rate = rate.saturating_add(competitor_increment);
    }
    if inputs.is_fresh_placement {
        rate = (Decimal::from(rate) * fresh_boost)
            .to_u64()
            .unwrap_or(rate);
    }
    rate
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_no_signal_returns_default() {
        let rate = effective_rate(101_420, PriorityInputs::default(), 15_000, dec!(1.4));
        assert_eq!(rate, 101_420);
    }

    #[test]
    fn test_signals_stack() {
        let inputs = PriorityInputs {
            adversity_escalation: 70_000,
            competitor_present: true,
            is_fresh_placement: false,
        };
        assert_eq!(
            effective_rate(101_420, inputs, 15_000, dec!(1.4)),
            101_420 + 70_000 + 15_000
        );
    }

    #[test]
    fn test_fresh_placement_boost_applies_last() {
        let inputs = PriorityInputs {
            adversity_escalation: 0,
            competitor_present: true,
            is_fresh_placement: true,
        };
        // (100_000 + 15_000) * 1.4
        assert_eq!(effective_rate(100_000, inputs, 15_000, dec!(1.4)), 161_000);
    }

    #[test]
    fn test_state_tracks_latest_rate() {
        let mut state = PriorityState::new(101_420);
        state.update(130_000);
        assert_eq!(state.current_rate, 130_000);
        state.reset(111_420);
        assert_eq!(state.current_rate, 111_420);
        assert_eq!(state.default_rate, 111_420);
    }
}
