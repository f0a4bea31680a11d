//! Throttle gate.
//!
//! Last stop before dispatch. Rules, in order:
//! 1. an unquoted side always places fresh, regardless of thresholds;
//! 2. a candidate within the minimum-change band is suppressed while the
//!    resting order is still in model and no forced requote is pending;
//! 3. a candidate that would cross the opposite side's live quote inside
//!    the elapsed-time guard is suppressed and logged;
//! 4. cancel-replaces are rate-bounded by a minimum inter-order delay,
//!    independent of price movement.
//! Anything that survives is a placement; it carries a cancel when a quote
//! is resting or the fresh-placement delay has not yet run out.

use obmm_core::{Price, QuoteAction, Side};
use tracing::info;

use crate::config::EngineConfig;
use crate::quote_state::QuoteState;

/// Why the gate suppressed a side this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuppressReason {
    /// Candidate too close to the live quote to be worth the churn.
    Unchanged,
    /// Candidate would cross our own opposite-side quote.
    SelfCross,
    /// Cancel-replace attempted too soon after the last submission.
    ReplaceTooSoon,
}

impl SuppressReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unchanged => "unchanged",
            Self::SelfCross => "self_cross",
            Self::ReplaceTooSoon => "replace_too_soon",
        }
    }
}

/// Everything the gate needs to judge one side.
pub struct ThrottleContext<'a> {
    pub side: Side,
    pub candidate: Price,
    pub state: &'a QuoteState,
    /// Opposite side's last placed price (ZERO when unquoted).
    pub opposite_last_placed: Price,
    /// Our live resting order's price on this side, if any.
    pub resting: Option<Price>,
    /// Leaning controller demanded an immediate requote.
    pub force_requote: bool,
    /// Milliseconds since the last submission of any kind on this side.
    pub elapsed_since_submit_ms: u64,
    pub now_ms: u64,
}

/// Verdict for one side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrottleDecision {
    Submit {
        action: QuoteAction,
        cancel_existing: bool,
    },
    Suppress(SuppressReason),
}

/// Evaluate the gate for one side.
pub fn should_submit(ctx: &ThrottleContext<'_>, config: &EngineConfig) -> ThrottleDecision {
    // 1. Unquoted: place fresh unconditionally.
    if ctx.state.is_unquoted() {
        return ThrottleDecision::Submit {
            action: QuoteAction::New,
            cancel_existing: false,
        };
    }

    // 2. Change too small and the resting quote still prices in model.
    let change = ctx
        .candidate
        .ratio_from(ctx.state.last_placed_price())
        .map(|r| r.abs());
    let in_model = ctx.resting.map_or(true, |resting| {
        if ctx.candidate.is_zero() {
            return false;
        }
        resting.abs_distance(ctx.candidate) / ctx.candidate.inner() < config.allowed_bps_mismatch
    });
    if let Some(change) = change {
        if change < config.min_change_ratio && !ctx.force_requote && in_model {
            return ThrottleDecision::Suppress(SuppressReason::Unchanged);
        }
    }

    // 3. Self-cross prevention inside the elapsed-time guard.
    if !ctx.opposite_last_placed.is_zero()
        && ctx.state.elapsed_since_placement(ctx.now_ms) <= config.cross_guard_ms
    {
        let crossed = match ctx.side {
            Side::Bid => {
                ctx.candidate
                    >= ctx.opposite_last_placed
                        * (rust_decimal::Decimal::ONE - config.cross_padding)
            }
            Side::Ask => {
                ctx.candidate
                    <= ctx.opposite_last_placed
                        * (rust_decimal::Decimal::ONE + config.cross_padding)
            }
        };
        if crossed {
            info!(
                side = %ctx.side,
                candidate = %ctx.candidate,
                opposite = %ctx.opposite_last_placed,
                "self-cross suppressed"
            );
            return ThrottleDecision::Suppress(SuppressReason::SelfCross);
        }
    }

    // 4. Bound the cancel-replace rate.
    if ctx.elapsed_since_submit_ms < config.min_replace_delay_ms {
        return ThrottleDecision::Suppress(SuppressReason::ReplaceTooSoon);
    }

    let cancel_existing = ctx.resting.is_some()
        || ctx.state.elapsed_since_placement(ctx.now_ms) < config.new_order_delay_ms;
    ThrottleDecision::Submit {
        action: if cancel_existing {
            QuoteAction::Replace
        } else {
            QuoteAction::New
        },
        cancel_existing,
    }
}
