//! Per-side quote state and its explicit lifecycle phases.
//!
//! `Price::ZERO` is the "no live quote" sentinel: an unquoted side must
//! requote unconditionally on the next eligible tick. The phase enum makes
//! the timestamp-driven lifecycle explicit and testable apart from the
//! tick driver.

use obmm_core::Price;

/// Lifecycle phase of one side, derived from wall-clock elapsed time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotePhase {
    /// Sentinel set; requote unconditionally.
    Unquoted,
    /// A quote is resting and no window is active.
    Live,
    /// Within the widening window after an adversity event.
    Adversity { elapsed_ms: u64 },
    /// Within the fresh-placement cooldown, no adversity active.
    Cooldown { elapsed_ms: u64 },
}

/// Mutable per-side quote state, owned by the engine.
#[derive(Debug, Clone, Default)]
pub struct QuoteState {
    /// Last placed price; `Price::ZERO` means unquoted.
    last_placed_price: Price,
    /// Unix ms of the last fresh placement (not updated on replaces).
    last_placed_at_ms: u64,
    /// Unix ms of the last adversity event, if any.
    last_adversity_at_ms: Option<u64>,
}

impl QuoteState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_placed_price(&self) -> Price {
        self.last_placed_price
    }

    pub fn is_unquoted(&self) -> bool {
        self.last_placed_price.is_zero()
    }

    /// Milliseconds since the last fresh placement.
    pub fn elapsed_since_placement(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.last_placed_at_ms)
    }

    /// Milliseconds since the last adversity event.
    pub fn elapsed_since_adversity(&self, now_ms: u64) -> Option<u64> {
        self.last_adversity_at_ms
            .map(|at| now_ms.saturating_sub(at))
    }

    /// Record a placement. Fresh placements (no preceding cancel) also
    /// stamp the placement clock that gates cooldown and cross checks.
    pub fn record_placement(&mut self, price: Price, now_ms: u64, fresh: bool) {
        self.last_placed_price = price;
        if fresh {
            self.last_placed_at_ms = now_ms;
        }
    }

    /// Record an adversity event: the side becomes unquoted and the
    /// widening/fee windows restart.
    pub fn record_adversity(&mut self, now_ms: u64) {
        self.last_placed_price = Price::ZERO;
        self.last_adversity_at_ms = Some(now_ms);
    }

    /// Force the side back to the unquoted sentinel (failed submission,
    /// forced requote from the leaning controller).
    pub fn mark_unquoted(&mut self) {
        self.last_placed_price = Price::ZERO;
    }

    /// Derive the current lifecycle phase.
    pub fn phase(&self, now_ms: u64, widen_window_ms: u64, cooldown_ms: u64) -> QuotePhase {
        if let Some(elapsed_ms) = self.elapsed_since_adversity(now_ms) {
            if elapsed_ms < widen_window_ms {
                return QuotePhase::Adversity { elapsed_ms };
            }
        }
        if self.is_unquoted() {
            return QuotePhase::Unquoted;
        }
        let elapsed_ms = self.elapsed_since_placement(now_ms);
        if elapsed_ms < cooldown_ms {
            QuotePhase::Cooldown { elapsed_ms }
        } else {
            QuotePhase::Live
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_new_state_is_unquoted() {
        let state = QuoteState::new();
        assert!(state.is_unquoted());
        assert_eq!(state.phase(0, 4_000, 16_000), QuotePhase::Unquoted);
    }

    #[test]
    fn test_fresh_placement_enters_cooldown_then_live() {
        let mut state = QuoteState::new();
        state.record_placement(Price::new(dec!(25)), 1_000, true);

        assert!(!state.is_unquoted());
        assert_eq!(
            state.phase(2_000, 4_000, 16_000),
            QuotePhase::Cooldown { elapsed_ms: 1_000 }
        );
        assert_eq!(state.phase(20_000, 4_000, 16_000), QuotePhase::Live);
    }

    #[test]
    fn test_replace_does_not_restart_cooldown() {
        let mut state = QuoteState::new();
        state.record_placement(Price::new(dec!(25)), 1_000, true);
        state.record_placement(Price::new(dec!(25.1)), 18_000, false);

        assert_eq!(state.elapsed_since_placement(18_000), 17_000);
        assert_eq!(state.phase(18_000, 4_000, 16_000), QuotePhase::Live);
        assert_eq!(state.last_placed_price().inner(), dec!(25.1));
    }

    #[test]
    fn test_adversity_resets_sentinel_and_times_out() {
        let mut state = QuoteState::new();
        state.record_placement(Price::new(dec!(25)), 1_000, true);
        state.record_adversity(5_000);

        assert!(state.is_unquoted());
        assert_eq!(
            state.phase(6_000, 4_000, 16_000),
            QuotePhase::Adversity { elapsed_ms: 1_000 }
        );
        // Window expired, still unquoted.
        assert_eq!(state.phase(9_500, 4_000, 16_000), QuotePhase::Unquoted);
    }

    #[test]
    fn test_mark_unquoted_keeps_placement_clock() {
        let mut state = QuoteState::new();
        state.record_placement(Price::new(dec!(25)), 1_000, true);
        state.mark_unquoted();

        assert!(state.is_unquoted());
        assert_eq!(state.elapsed_since_placement(2_000), 1_000);
    }
}
