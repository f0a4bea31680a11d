//! Shared feed state.
//!
//! The poll tasks write here; the decision tick reads here. Values are
//! immutable and swapped wholesale under a short lock, so a reader never
//! observes a partially updated snapshot.

use obmm_core::{OrderBookSnapshot, ReferenceQuote};
use parking_lot::RwLock;
use std::sync::Arc;

/// Latest feed values for one instrument.
#[derive(Default)]
pub struct FeedState {
    book: RwLock<Option<Arc<OrderBookSnapshot>>>,
    reference: RwLock<Option<ReferenceQuote>>,
}

impl FeedState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the book snapshot wholesale.
    pub fn store_book(&self, snapshot: OrderBookSnapshot) {
        *self.book.write() = Some(Arc::new(snapshot));
    }

    /// Latest book snapshot, if any poll has succeeded yet.
    pub fn book(&self) -> Option<Arc<OrderBookSnapshot>> {
        self.book.read().clone()
    }

    /// Replace the reference reading (None = feed explicitly has no data).
    pub fn store_reference(&self, reading: Option<ReferenceQuote>) {
        *self.reference.write() = reading;
    }

    /// Latest reference reading that is not older than `max_age_ms`.
    ///
    /// Staleness is applied at read time so an arbitrarily old reading is
    /// never treated as current.
    pub fn reference(&self, now_ms: u64, max_age_ms: u64) -> Option<ReferenceQuote> {
        self.reference
            .read()
            .filter(|r| !r.is_stale(now_ms, max_age_ms))
    }

    /// Age of the current book snapshot in milliseconds.
    pub fn book_age_ms(&self, now_ms: u64) -> Option<u64> {
        self.book
            .read()
            .as_ref()
            .map(|b| now_ms.saturating_sub(b.received_at_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use obmm_core::Price;
    use rust_decimal_macros::dec;

    #[test]
    fn test_book_swap_replaces_wholesale() {
        let state = FeedState::new();
        assert!(state.book().is_none());

        state.store_book(OrderBookSnapshot::new(vec![], vec![], 100));
        let first = state.book().unwrap();
        assert_eq!(first.received_at_ms, 100);

        state.store_book(OrderBookSnapshot::new(vec![], vec![], 200));
        assert_eq!(state.book().unwrap().received_at_ms, 200);
        // Readers holding the superseded Arc still see a complete value.
        assert_eq!(first.received_at_ms, 100);
    }

    #[test]
    fn test_reference_staleness_applied_at_read() {
        let state = FeedState::new();
        state.store_reference(Some(ReferenceQuote::new(
            Price::new(dec!(25)),
            dec!(0.03),
            1_000,
        )));

        assert!(state.reference(2_000, 2_000).is_some());
        assert!(state.reference(4_000, 2_000).is_none());
    }

    #[test]
    fn test_reference_explicit_absent() {
        let state = FeedState::new();
        state.store_reference(Some(ReferenceQuote::new(
            Price::new(dec!(25)),
            dec!(0.03),
            0,
        )));
        state.store_reference(None);
        assert!(state.reference(0, 10_000).is_none());
    }
}
