//! Fair-price estimation from the book and the reference quote.
//!
//! The book price is the best resting price after excluding our own orders
//! and known predators, falling back to the raw best so an emptied side
//! never faults. A predator resting at or inside the ask touch is averaged
//! with the next clean ask rather than matched head-on.
//!
//! The reference quote derives a one-sided bound per side; a live quote
//! that no longer improves on its bound is an adversity event, answered by
//! a retreat to the midpoint between the book-derived price and the bound,
//! not a full reprice to the bound.

use obmm_core::{OrderBookSnapshot, Price, ReferenceQuote, Side, Tier, TierTable};
use rust_decimal::Decimal;

use crate::config::EngineConfig;

/// Best book price for a side, tier-filtered and predator-dampened.
///
/// Returns None only when the side is completely empty.
pub fn book_price(
    book: &OrderBookSnapshot,
    side: Side,
    tiers: &TierTable,
    dampen_gap: Decimal,
) -> Option<Price> {
    let filtered = book.best_matching(side, |o| {
        !matches!(
            tiers.classify(&o.owner),
            Tier::SelfOwned | Tier::Predator
        )
    });
    let mut best = filtered.or_else(|| book.raw_best(side))?;

    // Predator dampening: a predator at or inside the clean ask touch gets
    // averaged with it instead of setting the touch outright.
    if side == Side::Ask {
        if let (Some(predator), Some(clean)) =
            (book.best_of_tier(Side::Ask, Tier::Predator, tiers), filtered)
        {
            if predator.price <= clean && clean.abs_distance(predator.price) <= dampen_gap {
                best = predator.price.midpoint(clean);
            }
        }
    }

    Some(best)
}

/// One-sided reference bound for a side.
///
/// `bid = (mid - conf*K) * (1 - bias_bid)`, `ask = (mid + conf*K) * (1 + bias_ask)`;
/// the bias terms tilt each bound further out as an adverse-selection margin.
pub fn reference_bound(side: Side, reference: &ReferenceQuote, config: &EngineConfig) -> Price {
    let half_width = reference.confidence * config.confidence_weight;
    match side {
        Side::Bid => {
            (reference.midpoint - Price::new(half_width))
                * (Decimal::ONE - config.predictive_bias_bid)
        }
        Side::Ask => {
            (reference.midpoint + Price::new(half_width))
                * (Decimal::ONE + config.predictive_bias_ask)
        }
    }
}

/// Outcome of checking a candidate against its reference bound.
#[derive(Debug, Clone, Copy)]
pub struct BoundCheck {
    pub candidate: Price,
    /// True when the side's live quote crossed its bound this tick.
    pub adversity: bool,
}

/// Check the side's last placed price against its bound.
///
/// A live quote at or beyond the bound is an adversity event: the caller
/// resets the side to the unquoted sentinel and the candidate retreats to
/// the midpoint between the book-derived price and the bound.
pub fn apply_reference_bound(
    side: Side,
    candidate: Price,
    book_price: Price,
    last_placed: Price,
    bound: Price,
) -> BoundCheck {
    if last_placed.is_zero() {
        return BoundCheck {
            candidate,
            adversity: false,
        };
    }
    let crossed = match side {
        Side::Bid => last_placed >= bound,
        Side::Ask => last_placed <= bound,
    };
    if !crossed {
        return BoundCheck {
            candidate,
            adversity: false,
        };
    }
    let anchor = match side {
        Side::Bid => candidate.max(book_price),
        Side::Ask => candidate.min(book_price),
    };
    BoundCheck {
        candidate: anchor.midpoint(bound),
        adversity: true,
    }
}

/// True when a competitor-tier order rests at or better than the candidate
/// with at least `min_notional` behind it.
pub fn competitor_present(
    book: &OrderBookSnapshot,
    side: Side,
    tiers: &TierTable,
    candidate: Price,
    min_notional: Decimal,
) -> bool {
    book.orders(side).iter().any(|o| {
        tiers.classify(&o.owner) == Tier::Competitor
            && !side.is_better(candidate, o.price)
            && o.notional() >= min_notional
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use obmm_core::{OwnerId, RestingOrder, Size};
    use rust_decimal_macros::dec;

    fn order(owner: &str, price: Decimal, size: Decimal) -> RestingOrder {
        RestingOrder::new(owner, Price::new(price), Size::new(size))
    }

    fn tiers() -> TierTable {
        TierTable::new(
            [OwnerId::from("us")],
            [OwnerId::from("asx")],
            [OwnerId::from("fish")],
        )
    }

    fn config() -> EngineConfig {
        EngineConfig::default()
    }

    #[test]
    fn test_book_price_excludes_self_and_predator() {
        let book = OrderBookSnapshot::new(
            vec![
                order("us", dec!(25.02), dec!(10)),
                order("a", dec!(25.00), dec!(10)),
            ],
            vec![
                order("fish", dec!(25.05), dec!(10)),
                order("b", dec!(25.40), dec!(10)),
            ],
            0,
        );
        let t = tiers();
        assert_eq!(
            book_price(&book, Side::Bid, &t, dec!(0.02)).unwrap().inner(),
            dec!(25.00)
        );
        // Predator gap (0.35) exceeds the dampen gap, so the clean ask wins.
        assert_eq!(
            book_price(&book, Side::Ask, &t, dec!(0.02)).unwrap().inner(),
            dec!(25.40)
        );
    }

    #[test]
    fn test_book_price_falls_back_when_exclusion_empties_side() {
        let book = OrderBookSnapshot::new(vec![order("us", dec!(25), dec!(10))], vec![], 0);
        let t = tiers();
        assert_eq!(
            book_price(&book, Side::Bid, &t, dec!(0.02)).unwrap().inner(),
            dec!(25)
        );
        assert!(book_price(&book, Side::Ask, &t, dec!(0.02)).is_none());
    }

    #[test]
    fn test_predator_dampening_averages_the_touch() {
        let book = OrderBookSnapshot::new(
            vec![],
            vec![
                order("fish", dec!(25.00), dec!(10)),
                order("b", dec!(25.01), dec!(10)),
            ],
            0,
        );
        // Predator inside the touch with a 0.01 gap: mean of the two.
        assert_eq!(
            book_price(&book, Side::Ask, &tiers(), dec!(0.02))
                .unwrap()
                .inner(),
            dec!(25.005)
        );
    }

    #[test]
    fn test_book_never_inverts_after_filters() {
        let book = OrderBookSnapshot::new(
            vec![
                order("a", dec!(24.98), dec!(10)),
                order("us", dec!(24.99), dec!(10)),
            ],
            vec![
                order("fish", dec!(25.00), dec!(10)),
                order("b", dec!(25.01), dec!(10)),
            ],
            0,
        );
        let t = tiers();
        let bid = book_price(&book, Side::Bid, &t, dec!(0.02)).unwrap();
        let ask = book_price(&book, Side::Ask, &t, dec!(0.02)).unwrap();
        assert!(bid <= ask, "filtered book must not invert: {bid} > {ask}");
    }

    #[test]
    fn test_reference_bounds_tilt_outward() {
        let r = ReferenceQuote::new(Price::new(dec!(100)), dec!(0.05), 0);
        let cfg = config();
        let bid_bound = reference_bound(Side::Bid, &r, &cfg);
        let ask_bound = reference_bound(Side::Ask, &r, &cfg);
        // bid bound below mid - conf, ask bound above mid + conf.
        assert!(bid_bound.inner() < dec!(99.96));
        assert!(ask_bound.inner() > dec!(100.04));
        assert!(bid_bound < ask_bound);
    }

    #[test]
    fn test_unquoted_side_never_triggers_adversity() {
        let check = apply_reference_bound(
            Side::Ask,
            Price::new(dec!(99.8)),
            Price::new(dec!(99.9)),
            Price::ZERO,
            Price::new(dec!(100.09)),
        );
        assert!(!check.adversity);
        assert_eq!(check.candidate.inner(), dec!(99.8));
    }

    #[test]
    fn test_bid_adversity_retreats_to_midpoint() {
        // Live bid at 100.10 sits above its 100.00 bound: retreat.
        let check = apply_reference_bound(
            Side::Bid,
            Price::new(dec!(100.08)),
            Price::new(dec!(100.05)),
            Price::new(dec!(100.10)),
            Price::new(dec!(100.00)),
        );
        assert!(check.adversity);
        // midpoint(max(100.08, 100.05), 100.00) = 100.04
        assert_eq!(check.candidate.inner(), dec!(100.04));
    }

    #[test]
    fn test_ask_adversity_retreats_to_midpoint() {
        let check = apply_reference_bound(
            Side::Ask,
            Price::new(dec!(99.95)),
            Price::new(dec!(99.98)),
            Price::new(dec!(99.90)),
            Price::new(dec!(100.10)),
        );
        assert!(check.adversity);
        // midpoint(min(99.95, 99.98), 100.10) = 100.025
        assert_eq!(check.candidate.inner(), dec!(100.025));
    }

    #[test]
    fn test_competitor_present_requires_size_floor() {
        let book = OrderBookSnapshot::new(
            vec![
                order("asx", dec!(25.01), dec!(50)),  // 1250 notional, above
                order("asx", dec!(25.02), dec!(1)),   // too small
            ],
            vec![],
            0,
        );
        let t = tiers();
        assert!(competitor_present(
            &book,
            Side::Bid,
            &t,
            Price::new(dec!(25.00)),
            dec!(700)
        ));
        // Candidate above every sizeable competitor: not present.
        assert!(!competitor_present(
            &book,
            Side::Bid,
            &t,
            Price::new(dec!(25.03)),
            dec!(700)
        ));
    }

    #[test]
    fn test_competitor_at_equal_price_counts() {
        let book = OrderBookSnapshot::new(
            vec![],
            vec![order("asx", dec!(25.00), dec!(40))],
            0,
        );
        assert!(competitor_present(
            &book,
            Side::Ask,
            &tiers(),
            Price::new(dec!(25.00)),
            dec!(700)
        ));
    }
}
