//! Immutable order-book snapshot values.
//!
//! A snapshot is replaced wholesale on each poll and owned by the engine
//! for the duration of one tick; superseded copies are simply dropped.

use crate::{OwnerId, Price, Side, Size, Tier, TierTable};
use serde::{Deserialize, Serialize};

/// One resting order in the book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestingOrder {
    /// Owner identity (open-orders account).
    pub owner: OwnerId,
    /// Resting limit price.
    pub price: Price,
    /// Remaining size.
    pub size: Size,
}

impl RestingOrder {
    pub fn new(owner: impl Into<OwnerId>, price: Price, size: Size) -> Self {
        Self {
            owner: owner.into(),
            price,
            size,
        }
    }

    /// Notional value of the resting order.
    pub fn notional(&self) -> rust_decimal::Decimal {
        self.size.notional(self.price)
    }
}

/// Immutable snapshot of both sides of the book.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderBookSnapshot {
    /// Resting bids (no ordering assumed).
    pub bids: Vec<RestingOrder>,
    /// Resting asks (no ordering assumed).
    pub asks: Vec<RestingOrder>,
    /// Unix milliseconds when the snapshot was taken.
    pub received_at_ms: u64,
}

impl OrderBookSnapshot {
    pub fn new(bids: Vec<RestingOrder>, asks: Vec<RestingOrder>, received_at_ms: u64) -> Self {
        Self {
            bids,
            asks,
            received_at_ms,
        }
    }

    /// Orders on one side.
    pub fn orders(&self, side: Side) -> &[RestingOrder] {
        match side {
            Side::Bid => &self.bids,
            Side::Ask => &self.asks,
        }
    }

    /// Raw best price on a side (highest bid / lowest ask), ignoring tiers.
    pub fn raw_best(&self, side: Side) -> Option<Price> {
        self.best_matching(side, |_| true)
    }

    /// Best price on a side among orders passing the filter.
    pub fn best_matching(
        &self,
        side: Side,
        mut filter: impl FnMut(&RestingOrder) -> bool,
    ) -> Option<Price> {
        let mut best: Option<Price> = None;
        for order in self.orders(side) {
            if !filter(order) {
                continue;
            }
            best = Some(match best {
                Some(b) if side.is_better(b, order.price) => b,
                _ => order.price,
            });
        }
        best
    }

    /// Our own best resting order on a side, if any.
    pub fn own_best(&self, side: Side, tiers: &TierTable) -> Option<&RestingOrder> {
        let mut best: Option<&RestingOrder> = None;
        for order in self.orders(side) {
            if !tiers.is_self(&order.owner) {
                continue;
            }
            best = Some(match best {
                Some(b) if side.is_better(b.price, order.price) => b,
                _ => order,
            });
        }
        best
    }

    /// Number of our own resting orders on a side.
    ///
    /// More than one means a cancel/replace was lost or duplicated and the
    /// reconciliation safeguard should fire.
    pub fn own_order_count(&self, side: Side, tiers: &TierTable) -> usize {
        self.orders(side)
            .iter()
            .filter(|o| tiers.is_self(&o.owner))
            .count()
    }

    /// Best order of a given tier on a side.
    pub fn best_of_tier(&self, side: Side, tier: Tier, tiers: &TierTable) -> Option<&RestingOrder> {
        let mut best: Option<&RestingOrder> = None;
        for order in self.orders(side) {
            if tiers.classify(&order.owner) != tier {
                continue;
            }
            best = Some(match best {
                Some(b) if side.is_better(b.price, order.price) => b,
                _ => order,
            });
        }
        best
    }
}
