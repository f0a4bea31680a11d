//! Inventory leaning controller.
//!
//! Runs on its own slow cadence, independent of the decision tick. When the
//! quote-asset balance drops to its low-water mark the ask leans: size
//! scales up to sell base and replenish quote, the ask spread tightens, and
//! the ask side is forced back to the unquoted sentinel so it requotes on
//! the next tick. Symmetric logic tightens the bid when the base-asset
//! balance is depleted.
//!
//! Giga-lean arms while base inventory sits far above target; the engine
//! keeps the ask-side fee escalation active for as long as it is set.

use obmm_core::Side;
use rust_decimal::Decimal;
use tracing::info;

use crate::config::LeanConfig;

/// Last outputs of the leaning controller, read by the tick pipeline.
#[derive(Debug, Clone)]
pub struct LeanState {
    /// Multiplier on the ask size while leaning.
    pub ask_size_multiplier: Decimal,
    /// Extra factor folded into the bid spread multiplier.
    pub bid_spread_factor: Decimal,
    /// Extra factor folded into the ask spread multiplier.
    pub ask_spread_factor: Decimal,
    /// Base inventory far above target; ask fee escalation stays active.
    pub giga_lean: bool,
    /// Quote-asset balance at or below its low-water mark.
    pub quote_leaning: bool,
    /// Base-asset balance at or below its low-water mark.
    pub base_leaning: bool,
    /// Last observed balances, for the status surface.
    pub quote_balance: Option<Decimal>,
    pub base_balance: Option<Decimal>,
}

impl Default for LeanState {
    fn default() -> Self {
        Self {
            ask_size_multiplier: Decimal::ONE,
            bid_spread_factor: Decimal::ONE,
            ask_spread_factor: Decimal::ONE,
            giga_lean: false,
            quote_leaning: false,
            base_leaning: false,
            quote_balance: None,
            base_balance: None,
        }
    }
}

/// Sides the controller wants reset to the unquoted sentinel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LeanUpdate {
    pub force_requote_bid: bool,
    pub force_requote_ask: bool,
}

impl LeanUpdate {
    pub fn forces(&self, side: Side) -> bool {
        match side {
            Side::Bid => self.force_requote_bid,
            Side::Ask => self.force_requote_ask,
        }
    }
}

/// Recomputes size/spread bias from wallet balances.
#[derive(Debug, Clone)]
pub struct LeanController {
    config: LeanConfig,
}

impl LeanController {
    pub fn new(config: LeanConfig) -> Self {
        Self { config }
    }

    /// Fold fresh balances into the lean state.
    ///
    /// `quote_size` is the hot-reloadable base quote size; the lean is
    /// skipped when base inventory cannot cover the leaned ask.
    pub fn update(
        &self,
        state: &mut LeanState,
        quote_balance: Decimal,
        base_balance: Decimal,
        quote_size: Decimal,
    ) -> LeanUpdate {
        let cfg = &self.config;
        let mut update = LeanUpdate::default();

        state.quote_balance = Some(quote_balance);
        state.base_balance = Some(base_balance);

        if quote_balance <= cfg.quote_low_water {
            let leaned_ask = quote_size * cfg.lean_factor;
            state.ask_size_multiplier = if base_balance <= leaned_ask {
                // Not enough base to back the lean; quote plain size.
                Decimal::ONE
            } else {
                cfg.lean_factor
            };
            state.giga_lean = base_balance >= (quote_size * cfg.target_max_units) / Decimal::TWO
                && base_balance > quote_size;
            state.ask_spread_factor = cfg.ask_tighten;
            state.quote_leaning = true;
            update.force_requote_ask = true;
            info!(
                quote_balance = %quote_balance,
                base_balance = %base_balance,
                lean_factor = %cfg.lean_factor,
                giga = state.giga_lean,
                "leaning ask to replenish quote asset"
            );
        } else {
            state.ask_size_multiplier = Decimal::ONE;
            state.ask_spread_factor = Decimal::ONE;
            state.quote_leaning = false;
            state.giga_lean = false;
        }

        if base_balance <= cfg.base_low_water {
            state.bid_spread_factor = cfg.bid_tighten;
            state.base_leaning = true;
            update.force_requote_bid = true;
            info!(
                base_balance = %base_balance,
                "tightening bid to replenish base asset"
            );
        } else {
            state.bid_spread_factor = Decimal::ONE;
            state.base_leaning = false;
        }

        update
    }
}
