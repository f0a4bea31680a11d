//! Candidate-price smoothing and the predator-avoidance step.
//!
//! Each side keeps a fixed-length rolling window of recent candidates.
//! While the window is still filling the raw price passes through; once
//! full, the arithmetic mean is emitted and the oldest sample evicted.
//!
//! The predator-avoidance step runs after smoothing so it is not itself
//! smoothed away: a predator resting within a small absolute distance on
//! the wrong side of the candidate gets stepped past by a fixed increment.

use obmm_core::{OrderBookSnapshot, Price, Side, Tier, TierTable};
use rust_decimal::Decimal;
use std::collections::VecDeque;

/// Fixed-length rolling mean over candidate prices.
#[derive(Debug, Clone)]
pub struct SmoothingWindow {
    values: VecDeque<Decimal>,
    capacity: usize,
}

impl SmoothingWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            values: VecDeque::with_capacity(capacity.max(1)),
            capacity: capacity.max(1),
        }
    }

    /// Record a candidate and return the smoothed price.
    pub fn push(&mut self, price: Price) -> Price {
        if self.values.len() < self.capacity {
            self.values.push_back(price.inner());
            return price;
        }
        self.values.pop_front();
        self.values.push_back(price.inner());
        let sum: Decimal = self.values.iter().copied().sum();
        Price::new(sum / Decimal::from(self.capacity as u64))
    }

    pub fn is_full(&self) -> bool {
        self.values.len() >= self.capacity
    }
}

/// Step the candidate past a predator resting next to it.
///
/// Bid: the cheapest predator at or above the candidate within `gap` pulls
/// the candidate a fixed `step` above it. Ask: the dearest predator below
/// the candidate within `gap` pushes it a fixed `step` below. Either way
/// the quote never rests immediately behind known toxic flow.
pub fn predator_step(
    book: &OrderBookSnapshot,
    side: Side,
    tiers: &TierTable,
    candidate: Price,
    gap: Decimal,
    step: Decimal,
) -> Price {
    let near = book
        .orders(side)
        .iter()
        .filter(|o| tiers.classify(&o.owner) == Tier::Predator)
        .filter(|o| match side {
            Side::Bid => o.price >= candidate,
            Side::Ask => o.price < candidate,
        })
        .map(|o| o.price)
        .reduce(|best, p| match side {
            // Closest to the candidate: lowest qualifying bid, highest ask.
            Side::Bid => best.min(p),
            Side::Ask => best.max(p),
        });

    match near {
        Some(p) if candidate.abs_distance(p) <= gap => match side {
            Side::Bid => candidate + Price::new(step),
            Side::Ask => candidate - Price::new(step),
        },
        _ => candidate,
    }
}
