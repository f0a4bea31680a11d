//! Tick orchestration for one instrument.
//!
//! `QuoteEngine` owns all per-side state and is driven from outside: the
//! host locks it, passes the latest book snapshot and reference reading,
//! and forwards the returned instructions to the dispatcher. Keeping the
//! engine free of I/O makes every tick replayable in tests with an
//! explicit clock.
//!
//! A fault in one side's computation (empty book side, non-positive
//! candidate) skips that side only; the other side and the scheduler are
//! unaffected.

use obmm_core::{
    OrderBookSnapshot, Price, QuoteAction, QuoteInstruction, ReferenceQuote, Side, Size, TierTable,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::adversity;
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::fair_price;
use crate::lean::{LeanController, LeanState, LeanUpdate};
use crate::priority::{effective_rate, PriorityInputs, PriorityState};
use crate::quote_state::{QuotePhase, QuoteState};
use crate::smoothing::{self, SmoothingWindow};
use crate::throttle::{should_submit, SuppressReason, ThrottleContext, ThrottleDecision};
use crate::tuning::{TuningHandle, TuningParams};

/// Everything one tick decided.
#[derive(Debug, Default)]
pub struct TickOutput {
    /// Finalized quote changes for the dispatcher.
    pub instructions: Vec<QuoteInstruction>,
    /// Sides the reconciliation safeguard wants hard-cancelled.
    pub hard_cancels: Vec<Side>,
    /// Sides that recorded an adversity event this tick.
    pub adversity_events: Vec<Side>,
    /// Sides the throttle gate (or the crossed-candidates refusal) held back.
    pub suppressed: Vec<(Side, SuppressReason)>,
}

impl TickOutput {
    /// Instruction for a side, if one was emitted.
    pub fn instruction(&self, side: Side) -> Option<&QuoteInstruction> {
        self.instructions.iter().find(|i| i.side == side)
    }
}

/// Status snapshot for the external control plane.
#[derive(Debug, Clone, Serialize)]
pub struct EngineStatus {
    pub instrument: String,
    pub quote_balance: Option<Decimal>,
    pub base_balance: Option<Decimal>,
    pub quote_low_water: Decimal,
    pub base_low_water: Decimal,
    pub bid_tuning_factor: Decimal,
    pub ask_tuning_factor: Decimal,
    pub quote_size: Decimal,
    pub default_priority_rate: u64,
    pub current_priority_rate: u64,
    pub quote_leaning: bool,
    pub base_leaning: bool,
    pub giga_lean: bool,
    pub last_bid_price: Price,
    pub last_ask_price: Price,
}

/// Candidate that survived the gate, not yet recorded.
struct PendingQuote {
    side: Side,
    action: QuoteAction,
    cancel_existing: bool,
    price: Price,
    size: Size,
    rate: u64,
}

/// Per-side mutable state bundle.
struct SideState {
    quote: QuoteState,
    window: SmoothingWindow,
    force_requote: bool,
    last_submit_at_ms: u64,
    last_hard_cancel_at_ms: u64,
}

impl SideState {
    fn new(smoothing_window: usize) -> Self {
        Self {
            quote: QuoteState::new(),
            window: SmoothingWindow::new(smoothing_window),
            force_requote: false,
            last_submit_at_ms: 0,
            last_hard_cancel_at_ms: 0,
        }
    }
}

/// The quoting decision loop for one instrument.
pub struct QuoteEngine {
    instrument: String,
    config: EngineConfig,
    tiers: TierTable,
    tuning: TuningHandle,
    lean_controller: LeanController,
    lean: LeanState,
    priority: PriorityState,
    bid: SideState,
    ask: SideState,
}

impl QuoteEngine {
    pub fn new(
        instrument: impl Into<String>,
        config: EngineConfig,
        tiers: TierTable,
    ) -> EngineResult<Self> {
        config.validate()?;
        let tuning = TuningHandle::new(config.default_priority_rate, config.quote_size);
        Ok(Self {
            instrument: instrument.into(),
            tuning,
            lean_controller: LeanController::new(config.lean.clone()),
            lean: LeanState::default(),
            priority: PriorityState::new(config.default_priority_rate),
            bid: SideState::new(config.bid_smoothing_window),
            ask: SideState::new(config.ask_smoothing_window),
            tiers,
            config,
        })
    }

    /// Shared handle for the external tuning surface.
    pub fn tuning(&self) -> TuningHandle {
        self.tuning.clone()
    }

    /// One decision tick. The caller holds the per-instrument lock.
    pub fn tick(
        &mut self,
        book: &OrderBookSnapshot,
        reference: Option<&ReferenceQuote>,
        now_ms: u64,
    ) -> TickOutput {
        let config = self.config.clone();
        let tuning = self.tuning.snapshot();
        let mut out = TickOutput::default();

        self.priority.reset(tuning.default_priority_rate);

        // Reconciliation safeguard: more than one resting order per side
        // means a cancel-replace was lost or duplicated.
        for side in [Side::Bid, Side::Ask] {
            let own = book.own_order_count(side, &self.tiers);
            if own > 1 {
                let state = self.side_mut(side);
                if now_ms.saturating_sub(state.last_hard_cancel_at_ms)
                    >= config.hard_cancel_guard_ms
                {
                    warn!(
                        side = %side,
                        own_orders = own,
                        "duplicate resting orders detected, forcing hard cancel-and-settle"
                    );
                    out.hard_cancels.push(side);
                }
                state.last_hard_cancel_at_ms = now_ms;
            }
        }

        // A stale reading must never be treated as current.
        let reference = reference.filter(|r| !r.is_stale(now_ms, config.reference_stale_ms));

        let bid = self.compute_side(Side::Bid, book, reference, &config, &tuning, now_ms, &mut out);
        let ask = self.compute_side(Side::Ask, book, reference, &config, &tuning, now_ms, &mut out);

        // Never hand the dispatcher a crossed or inverted pair; both sides
        // are refused for the tick and state stays unchanged.
        let (bid, ask) = match (bid, ask) {
            (Some(b), Some(a))
                if b.price >= a.price * (Decimal::ONE - config.cross_padding) =>
            {
                let refusal = EngineError::CrossedCandidates {
                    bid: b.price.to_string(),
                    ask: a.price.to_string(),
                };
                error!(instrument = %self.instrument, error = %refusal, "tick refused");
                out.suppressed.push((Side::Bid, SuppressReason::SelfCross));
                out.suppressed.push((Side::Ask, SuppressReason::SelfCross));
                (None, None)
            }
            other => other,
        };

        for pending in [bid, ask].into_iter().flatten() {
            let fresh = pending.action == QuoteAction::New;
            let state = self.side_mut(pending.side);
            state.quote.record_placement(pending.price, now_ms, fresh);
            state.force_requote = false;
            state.last_submit_at_ms = now_ms;
            out.instructions.push(QuoteInstruction {
                side: pending.side,
                action: pending.action,
                price: pending.price,
                size: pending.size,
                cancel_existing: pending.cancel_existing,
                priority_rate: pending.rate,
                created_at_ms: now_ms,
            });
        }

        out
    }

    /// Fold fresh wallet balances into the lean state (slow cadence).
    pub fn apply_balances(&mut self, quote_balance: Decimal, base_balance: Decimal) -> LeanUpdate {
        let quote_size = self.tuning.snapshot().quote_size;
        let update =
            self.lean_controller
                .update(&mut self.lean, quote_balance, base_balance, quote_size);
        if update.force_requote_ask {
            let state = self.side_mut(Side::Ask);
            state.quote.mark_unquoted();
            state.force_requote = true;
        }
        if update.force_requote_bid {
            let state = self.side_mut(Side::Bid);
            state.quote.mark_unquoted();
            state.force_requote = true;
        }
        update
    }

    /// A submission failed (or never made it onto the queue): leave the
    /// side unquoted so the next tick retries unconditionally.
    pub fn on_submission_failure(&mut self, side: Side) {
        info!(instrument = %self.instrument, %side, "submission failed, side left unquoted");
        self.side_mut(side).quote.mark_unquoted();
    }

    /// Lifecycle phase of a side.
    pub fn phase(&self, side: Side, now_ms: u64) -> QuotePhase {
        let widen_window = match side {
            Side::Bid => self.config.bid_widen_window_ms,
            Side::Ask => self.config.ask_widen_window_ms,
        };
        self.side(side)
            .quote
            .phase(now_ms, widen_window, self.config.new_order_delay_ms)
    }

    /// Snapshot for the external control plane.
    pub fn status(&self) -> EngineStatus {
        let tuning = self.tuning.snapshot();
        EngineStatus {
            instrument: self.instrument.clone(),
            quote_balance: self.lean.quote_balance,
            base_balance: self.lean.base_balance,
            quote_low_water: self.config.lean.quote_low_water,
            base_low_water: self.config.lean.base_low_water,
            bid_tuning_factor: tuning.bid_tuning_factor,
            ask_tuning_factor: tuning.ask_tuning_factor,
            quote_size: tuning.quote_size,
            default_priority_rate: tuning.default_priority_rate,
            current_priority_rate: self.priority.current_rate,
            quote_leaning: self.lean.quote_leaning,
            base_leaning: self.lean.base_leaning,
            giga_lean: self.lean.giga_lean,
            last_bid_price: self.bid.quote.last_placed_price(),
            last_ask_price: self.ask.quote.last_placed_price(),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn compute_side(
        &mut self,
        side: Side,
        book: &OrderBookSnapshot,
        reference: Option<&ReferenceQuote>,
        config: &EngineConfig,
        tuning: &TuningParams,
        now_ms: u64,
        out: &mut TickOutput,
    ) -> Option<PendingQuote> {
        let Some(book_px) = fair_price::book_price(book, side, &self.tiers, config.predator_dampen_gap)
        else {
            debug!(%side, "book side empty, nothing to quote against");
            return None;
        };

        let (spread_mult, lean_spread) = match side {
            Side::Bid => (config.bid_spread_multiplier, self.lean.bid_spread_factor),
            Side::Ask => (config.ask_spread_multiplier, self.lean.ask_spread_factor),
        };
        let mut candidate = book_px * (spread_mult * lean_spread);

        // Reference reconciliation: a live quote beyond its bound is an
        // adversity event and retreats toward the bound.
        if let Some(r) = reference {
            let bound = fair_price::reference_bound(side, r, config);
            let last = self.side(side).quote.last_placed_price();
            let check = fair_price::apply_reference_bound(side, candidate, book_px, last, bound);
            if check.adversity {
                self.side_mut(side).quote.record_adversity(now_ms);
                out.adversity_events.push(side);
                info!(
                    instrument = %self.instrument,
                    %side,
                    last = %last,
                    bound = %bound,
                    retreat = %check.candidate,
                    "adversity: reference bound crossed"
                );
            }
            candidate = check.candidate;
        }

        // Time-boxed widening, decaying to zero at the window boundary.
        let giga_ask = side == Side::Ask && self.lean.giga_lean;
        if let Some(elapsed) = self.side(side).quote.elapsed_since_adversity(now_ms) {
            let window = match side {
                Side::Bid => config.bid_widen_window_ms,
                Side::Ask => config.ask_widen_window_ms,
            };
            let widen_bps = if giga_ask {
                // Leaning to sell: keep the ask competitive, widen a tenth.
                config.widen_bps * dec!(0.1)
            } else {
                config.widen_bps
            };
            let frac = adversity::widen_fraction(elapsed, window, widen_bps);
            if !frac.is_zero() {
                candidate = match side {
                    Side::Bid => candidate * (Decimal::ONE - frac),
                    Side::Ask => candidate * (Decimal::ONE + frac),
                };
            }
        }

        // Fee escalation off the same adversity clock; giga-lean pins the
        // ask escalation at its maximum while excess inventory lasts.
        let fee_window = match side {
            Side::Bid => config.bid_fee_window_ms,
            Side::Ask => config.ask_fee_window_ms,
        };
        let escalation = if giga_ask {
            adversity::escalation(0, fee_window, config.fee_rate_step, config.fee_reduction)
        } else {
            self.side(side)
                .quote
                .elapsed_since_adversity(now_ms)
                .map_or(0, |elapsed| {
                    adversity::escalation(
                        elapsed,
                        fee_window,
                        config.fee_rate_step,
                        config.fee_reduction,
                    )
                })
        };

        // Competitor-presence defense, before smoothing so the smoothed
        // price carries the defensive adjustment.
        let competitor = fair_price::competitor_present(
            book,
            side,
            &self.tiers,
            candidate,
            config.competitor_min_notional,
        );
        if competitor {
            candidate = match side {
                Side::Bid => candidate * (Decimal::ONE - config.competitor_nudge),
                Side::Ask => candidate * (Decimal::ONE + config.competitor_nudge),
            };
            debug!(%side, %candidate, "competitor at or inside candidate, widening");
        }

        candidate = self.side_mut(side).window.push(candidate);
        candidate = smoothing::predator_step(
            book,
            side,
            &self.tiers,
            candidate,
            config.predator_gap,
            config.predator_step,
        );

        let factor = match side {
            Side::Bid => tuning.bid_tuning_factor,
            Side::Ask => tuning.ask_tuning_factor,
        };
        if factor != Decimal::ONE {
            candidate = candidate * factor;
            debug!(%side, %factor, %candidate, "tuning factor applied");
        }

        if !candidate.is_positive() {
            warn!(%side, %candidate, "non-positive candidate, refusing side for this tick");
            return None;
        }

        let resting = book.own_best(side, &self.tiers).map(|o| o.price);
        let state = self.side(side);
        let ctx = ThrottleContext {
            side,
            candidate,
            state: &state.quote,
            opposite_last_placed: self.side(side.opposite()).quote.last_placed_price(),
            resting,
            force_requote: state.force_requote,
            elapsed_since_submit_ms: now_ms.saturating_sub(state.last_submit_at_ms),
            now_ms,
        };
        match should_submit(&ctx, config) {
            ThrottleDecision::Suppress(reason) => {
                debug!(%side, reason = reason.as_str(), %candidate, "throttle suppressed");
                out.suppressed.push((side, reason));
                None
            }
            ThrottleDecision::Submit {
                action,
                cancel_existing,
            } => {
                let rate = effective_rate(
                    tuning.default_priority_rate,
                    PriorityInputs {
                        adversity_escalation: escalation,
                        competitor_present: competitor,
                        is_fresh_placement: action == QuoteAction::New,
                    },
                    config.competitor_fee_increment,
                    config.fresh_placement_boost,
                );
                self.priority.update(rate);

                let size = match side {
                    Side::Bid => tuning.quote_size * config.bid_size_ratio,
                    Side::Ask => {
                        tuning.quote_size * config.ask_size_ratio * self.lean.ask_size_multiplier
                    }
                };
                if !size.is_sign_positive() || size.is_zero() {
                    warn!(%side, %size, "non-positive quote size, refusing side");
                    return None;
                }

                Some(PendingQuote {
                    side,
                    action,
                    cancel_existing,
                    price: candidate,
                    size: Size::new(size),
                    rate,
                })
            }
        }
    }

    fn side(&self, side: Side) -> &SideState {
        match side {
            Side::Bid => &self.bid,
            Side::Ask => &self.ask,
        }
    }

    fn side_mut(&mut self, side: Side) -> &mut SideState {
        match side {
            Side::Bid => &mut self.bid,
            Side::Ask => &mut self.ask,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use obmm_core::{OwnerId, RestingOrder};
    use rust_decimal_macros::dec;

    const NOW: u64 = 1_700_000_000_000;

    fn tiers() -> TierTable {
        TierTable::new(
            [OwnerId::from("us")],
            [OwnerId::from("asx")],
            [OwnerId::from("fish")],
        )
    }

    fn engine() -> QuoteEngine {
        QuoteEngine::new("SOL/USDC", EngineConfig::default(), tiers()).unwrap()
    }

    fn order(owner: &str, price: Decimal) -> RestingOrder {
        RestingOrder::new(owner, Price::new(price), Size::new(dec!(50)))
    }

    fn flat_book() -> OrderBookSnapshot {
        OrderBookSnapshot::new(
            vec![order("mm1", dec!(100))],
            vec![order("mm2", dec!(101))],
            NOW,
        )
    }

    #[test]
    fn test_flat_book_no_reference_places_both_sides_new() {
        let mut engine = engine();
        let out = engine.tick(&flat_book(), None, NOW);

        assert_eq!(out.instructions.len(), 2);
        assert!(out.hard_cancels.is_empty());
        assert!(out.adversity_events.is_empty());

        let bid = out.instruction(Side::Bid).unwrap();
        let ask = out.instruction(Side::Ask).unwrap();
        assert_eq!(bid.action, QuoteAction::New);
        assert_eq!(ask.action, QuoteAction::New);
        assert!(!bid.cancel_existing && !ask.cancel_existing);
        assert_eq!(bid.price.inner(), dec!(100) * dec!(0.99884));
        assert_eq!(ask.price.inner(), dec!(101) * dec!(0.99897));
        // Fresh placements carry the boosted default rate.
        assert_eq!(bid.priority_rate, 141_988);
    }

    #[test]
    fn test_unquoted_side_ignores_reference_bound() {
        // Ask bound sits above the 99.9-derived candidate, but the side is
        // unquoted so no adversity fires and a normal New goes out.
        let mut engine = engine();
        let book = OrderBookSnapshot::new(
            vec![order("mm1", dec!(99.5))],
            vec![order("mm2", dec!(99.9))],
            NOW,
        );
        let reference = ReferenceQuote::new(Price::new(dec!(100)), dec!(0.05), NOW);

        let out = engine.tick(&book, Some(&reference), NOW);

        assert!(out.adversity_events.is_empty());
        let ask = out.instruction(Side::Ask).unwrap();
        assert_eq!(ask.action, QuoteAction::New);
        assert_eq!(ask.price.inner(), dec!(99.9) * dec!(0.99897));
    }

    #[test]
    fn test_same_inputs_twice_yield_same_candidates() {
        // Determinism: no submission success between ticks means identical
        // candidates both times.
        let mut engine = engine();
        let book = flat_book();

        let first = engine.tick(&book, None, NOW);
        let first_bid = first.instruction(Side::Bid).unwrap().price;
        let first_ask = first.instruction(Side::Ask).unwrap().price;

        engine.on_submission_failure(Side::Bid);
        engine.on_submission_failure(Side::Ask);

        let second = engine.tick(&book, None, NOW);
        assert_eq!(second.instruction(Side::Bid).unwrap().price, first_bid);
        assert_eq!(second.instruction(Side::Ask).unwrap().price, first_ask);
    }

    #[test]
    fn test_adversity_resets_sentinel_and_retreats() {
        let mut engine = engine();
        let book = flat_book();

        // Establish a live bid around 99.884.
        let out = engine.tick(&book, None, NOW);
        let placed_bid = out.instruction(Side::Bid).unwrap().price;

        // Reference collapses: bid bound falls below the live bid.
        let reference = ReferenceQuote::new(Price::new(dec!(99)), dec!(0.01), NOW + 165);
        let out = engine.tick(&book, Some(&reference), NOW + 165);

        assert_eq!(out.adversity_events, vec![Side::Bid]);
        let bid = out.instruction(Side::Bid).unwrap();
        // Sentinel reset makes the retreat a fresh placement.
        assert_eq!(bid.action, QuoteAction::New);
        assert!(bid.price < placed_bid, "retreat must move the bid down");
        // Escalated and boosted: well above the boosted default.
        assert!(bid.priority_rate > 141_988);
    }

    #[test]
    fn test_duplicate_resting_orders_trigger_hard_cancel_once() {
        let mut engine = engine();
        let book = OrderBookSnapshot::new(
            vec![order("us", dec!(99.9)), order("us", dec!(99.8))],
            vec![order("mm2", dec!(101))],
            NOW,
        );

        let out = engine.tick(&book, None, NOW);
        assert_eq!(out.hard_cancels, vec![Side::Bid]);

        // Guard timestamp was reset: an immediate re-detection stays quiet.
        let out = engine.tick(&book, None, NOW + 165);
        assert!(out.hard_cancels.is_empty());
    }

    #[test]
    fn test_submission_failure_forces_retry_next_tick() {
        let mut engine = engine();
        let book = flat_book();

        let out = engine.tick(&book, None, NOW);
        assert_eq!(out.instruction(Side::Bid).unwrap().action, QuoteAction::New);

        // Without a failure the unchanged candidate is suppressed.
        let out = engine.tick(&book, None, NOW + 165);
        assert!(out.instruction(Side::Bid).is_none());

        engine.on_submission_failure(Side::Bid);
        let out = engine.tick(&book, None, NOW + 330);
        assert_eq!(out.instruction(Side::Bid).unwrap().action, QuoteAction::New);
    }

    #[test]
    fn test_lean_forces_ask_requote_with_scaled_size() {
        let mut engine = engine();
        let book = flat_book();

        // Live ask resting.
        engine.tick(&book, None, NOW);

        // Quote asset depleted: next lean cycle forces the ask back out.
        let update = engine.apply_balances(dec!(800), dec!(200));
        assert!(update.force_requote_ask);

        let out = engine.tick(&book, None, NOW + 165);
        let ask = out.instruction(Side::Ask).unwrap();
        assert_eq!(ask.action, QuoteAction::New);
        // 2 (quote size) * 0.8 (ask ratio) * 1.1 (lean factor)
        assert_eq!(ask.size.inner(), dec!(1.76));
        // Tightened ask spread: closer to the market than the plain quote.
        assert!(ask.price.inner() < dec!(101) * dec!(0.99897));
    }

    #[test]
    fn test_crossed_candidates_refused_for_the_tick() {
        // An inverted raw book would produce bid >= ask; the tick must
        // refuse both sides rather than submit a crossed pair.
        let mut engine = engine();
        let book = OrderBookSnapshot::new(
            vec![order("mm1", dec!(100))],
            vec![order("mm2", dec!(99))],
            NOW,
        );

        let out = engine.tick(&book, None, NOW);
        assert!(out.instructions.is_empty());
        assert!(out
            .suppressed
            .contains(&(Side::Bid, SuppressReason::SelfCross)));
        assert!(out
            .suppressed
            .contains(&(Side::Ask, SuppressReason::SelfCross)));

        // Nothing was recorded: both sides still unquoted.
        assert_eq!(engine.phase(Side::Bid, NOW), QuotePhase::Unquoted);
        assert_eq!(engine.phase(Side::Ask, NOW), QuotePhase::Unquoted);
    }

    #[test]
    fn test_giga_lean_keeps_ask_escalation_active() {
        let mut engine = engine();
        // Quote depleted, base far above target: giga-lean arms.
        let update = engine.apply_balances(dec!(500), dec!(200));
        assert!(update.force_requote_ask);
        assert!(engine.status().giga_lean);

        let out = engine.tick(&flat_book(), None, NOW);
        let bid = out.instruction(Side::Bid).unwrap();
        let ask = out.instruction(Side::Ask).unwrap();
        // No adversity anywhere, yet the ask carries escalation.
        assert!(out.adversity_events.is_empty());
        assert!(ask.priority_rate > bid.priority_rate);
    }

    #[test]
    fn test_competitor_presence_widens_and_escalates() {
        let mut engine = engine();
        // A sizeable competitor bid above our candidate.
        let book = OrderBookSnapshot::new(
            vec![order("mm1", dec!(100)), order("asx", dec!(100.00))],
            vec![order("mm2", dec!(101))],
            NOW,
        );

        let out = engine.tick(&book, None, NOW);
        let bid = out.instruction(Side::Bid).unwrap();
        let plain = dec!(100) * dec!(0.99884);
        assert!(bid.price.inner() < plain, "defensive widening moves the bid down");
        // Default rate + competitor increment, boosted for the fresh placement.
        assert!(bid.priority_rate > 141_988);
    }

    #[test]
    fn test_status_reflects_tuning_and_lean() {
        let mut engine = engine();
        engine.tuning().set_quote_size(dec!(4));
        engine.apply_balances(dec!(5000), dec!(200));

        let status = engine.status();
        assert_eq!(status.instrument, "SOL/USDC");
        assert_eq!(status.quote_size, dec!(4));
        assert_eq!(status.quote_balance, Some(dec!(5000)));
        assert!(!status.quote_leaning);
        assert_eq!(status.current_priority_rate, 101_420);
    }
}
