//! Independent reference price with an uncertainty band.

use crate::Price;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Fair-value estimate from the reference oracle.
///
/// Recreated on every poll; a reading older than the configured staleness
/// bound must be treated as absent rather than current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceQuote {
    /// Aggregate midpoint price.
    pub midpoint: Price,
    /// Confidence interval half-width around the midpoint.
    pub confidence: Decimal,
    /// Unix milliseconds when the reading was observed.
    pub observed_at_ms: u64,
}

impl ReferenceQuote {
    pub fn new(midpoint: Price, confidence: Decimal, observed_at_ms: u64) -> Self {
        Self {
            midpoint,
            confidence,
            observed_at_ms,
        }
    }

    /// Age of the reading in milliseconds.
    pub fn age_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.observed_at_ms)
    }

    /// True when the reading is older than `max_age_ms`.
    pub fn is_stale(&self, now_ms: u64, max_age_ms: u64) -> bool {
        self.age_ms(now_ms) > max_age_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_staleness() {
        let q = ReferenceQuote::new(Price::new(dec!(25)), dec!(0.03), 1_000);
        assert!(!q.is_stale(2_000, 2_000));
        assert!(q.is_stale(3_001, 2_000));
        // Clock skew (observed in the future) never counts as stale.
        assert!(!q.is_stale(500, 2_000));
    }
}
