//! Engine configuration.
//!
//! One record per instrument; spreads, thresholds, windows, and lean
//! policy all live here so a second trading pair is just a second config.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Quoting engine configuration for one instrument.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    // --- Sizing ---
    /// Base quote size in base-asset units.
    #[serde(default = "default_quote_size")]
    pub quote_size: Decimal,

    /// Fraction of `quote_size` placed on the bid.
    #[serde(default = "default_bid_size_ratio")]
    pub bid_size_ratio: Decimal,

    /// Fraction of `quote_size` placed on the ask.
    #[serde(default = "default_ask_size_ratio")]
    pub ask_size_ratio: Decimal,

    // --- Spreads ---
    /// Bid candidate = book bid × this multiplier.
    #[serde(default = "default_bid_spread_multiplier")]
    pub bid_spread_multiplier: Decimal,

    /// Ask candidate = book ask × this multiplier.
    #[serde(default = "default_ask_spread_multiplier")]
    pub ask_spread_multiplier: Decimal,

    // --- Reference price ---
    /// Weight applied to the confidence half-width when deriving bounds.
    #[serde(default = "default_confidence_weight")]
    pub confidence_weight: Decimal,

    /// Downward tilt on the bid bound (adverse-selection margin).
    #[serde(default = "default_predictive_bias_bid")]
    pub predictive_bias_bid: Decimal,

    /// Upward tilt on the ask bound.
    #[serde(default = "default_predictive_bias_ask")]
    pub predictive_bias_ask: Decimal,

    /// Reference readings older than this are treated as absent.
    #[serde(default = "default_reference_stale_ms")]
    pub reference_stale_ms: u64,

    // --- Adversity windows ---
    /// Bid-side widening window after an adversity event.
    #[serde(default = "default_bid_widen_window_ms")]
    pub bid_widen_window_ms: u64,

    /// Ask-side widening window after an adversity event.
    #[serde(default = "default_ask_widen_window_ms")]
    pub ask_widen_window_ms: u64,

    /// Maximum widening in basis points, decaying linearly to zero at the
    /// window boundary.
    #[serde(default = "default_widen_bps")]
    pub widen_bps: Decimal,

    /// Bid-side fee-escalation window.
    #[serde(default = "default_bid_fee_window_ms")]
    pub bid_fee_window_ms: u64,

    /// Ask-side fee-escalation window.
    #[serde(default = "default_ask_fee_window_ms")]
    pub ask_fee_window_ms: u64,

    /// Escalation rate added per remaining second of the fee window.
    #[serde(default = "default_fee_rate_step")]
    pub fee_rate_step: u64,

    /// Constant subtracted from the escalation before clamping at zero.
    #[serde(default = "default_fee_reduction")]
    pub fee_reduction: u64,

    // --- Competitor-presence defense ---
    /// Minimum notional for a competitor order to count as present.
    #[serde(default = "default_competitor_min_notional")]
    pub competitor_min_notional: Decimal,

    /// Fractional widening applied when a competitor is present.
    #[serde(default = "default_competitor_nudge")]
    pub competitor_nudge: Decimal,

    /// Priority rate increment when a competitor is present.
    #[serde(default = "default_competitor_fee_increment")]
    pub competitor_fee_increment: u64,

    // --- Predator avoidance ---
    /// Absolute price gap within which the ask touch is averaged with the
    /// next non-predator ask (predator dampening).
    #[serde(default = "default_predator_dampen_gap")]
    pub predator_dampen_gap: Decimal,

    /// Absolute distance at which a same-side predator order triggers the
    /// avoidance step.
    #[serde(default = "default_predator_gap")]
    pub predator_gap: Decimal,

    /// Absolute step applied to move past the predator order.
    #[serde(default = "default_predator_step")]
    pub predator_step: Decimal,

    // --- Smoothing ---
    /// Bid smoothing window length.
    #[serde(default = "default_bid_smoothing_window")]
    pub bid_smoothing_window: usize,

    /// Ask smoothing window length.
    #[serde(default = "default_ask_smoothing_window")]
    pub ask_smoothing_window: usize,

    // --- Throttle ---
    /// Minimum relative change from the last placed price to requote.
    #[serde(default = "default_min_change_ratio")]
    pub min_change_ratio: Decimal,

    /// Allowed relative mismatch between the live resting price and the
    /// fresh candidate before the quote counts as out of model.
    #[serde(default = "default_allowed_bps_mismatch")]
    pub allowed_bps_mismatch: Decimal,

    /// Padding on the self-cross check (gte/lte alone is too precise).
    #[serde(default = "default_cross_padding")]
    pub cross_padding: Decimal,

    /// Self-cross suppression applies within this window after the side's
    /// last fresh placement.
    #[serde(default = "default_cross_guard_ms")]
    pub cross_guard_ms: u64,

    /// Minimum delay between a placement and the next cancel-replace.
    #[serde(default = "default_min_replace_delay_ms")]
    pub min_replace_delay_ms: u64,

    /// Fresh placements within this window of the previous one still carry
    /// a cancel, bounding duplicate exposure.
    #[serde(default = "default_new_order_delay_ms")]
    pub new_order_delay_ms: u64,

    // --- Priority ---
    /// Default priority rate when no signal is active.
    #[serde(default = "default_priority_rate")]
    pub default_priority_rate: u64,

    /// Multiplicative boost on fresh placements (not replacements).
    #[serde(default = "default_fresh_placement_boost")]
    pub fresh_placement_boost: Decimal,

    // --- Reconciliation safeguard ---
    /// Minimum interval between hard cancel-and-settle invocations per side.
    #[serde(default = "default_hard_cancel_guard_ms")]
    pub hard_cancel_guard_ms: u64,

    // --- Inventory leaning ---
    #[serde(default)]
    pub lean: LeanConfig,
}

/// Inventory leaning policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeanConfig {
    /// Quote-asset balance at or below which the ask leans to sell base.
    #[serde(default = "default_quote_low_water")]
    pub quote_low_water: Decimal,

    /// Base-asset balance at or below which the bid tightens to buy base.
    #[serde(default = "default_base_low_water")]
    pub base_low_water: Decimal,

    /// Ask size multiplier while leaning.
    #[serde(default = "default_lean_factor")]
    pub lean_factor: Decimal,

    /// Ask spread multiplier tightening while leaning.
    #[serde(default = "default_ask_tighten")]
    pub ask_tighten: Decimal,

    /// Bid spread multiplier tightening while base inventory is low.
    #[serde(default = "default_bid_tighten")]
    pub bid_tighten: Decimal,

    /// Target inventory in units of `quote_size`; base inventory above
    /// half this target arms giga-lean.
    #[serde(default = "default_target_max_units")]
    pub target_max_units: Decimal,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            quote_size: default_quote_size(),
            bid_size_ratio: default_bid_size_ratio(),
            ask_size_ratio: default_ask_size_ratio(),
            bid_spread_multiplier: default_bid_spread_multiplier(),
            ask_spread_multiplier: default_ask_spread_multiplier(),
            confidence_weight: default_confidence_weight(),
            predictive_bias_bid: default_predictive_bias_bid(),
            predictive_bias_ask: default_predictive_bias_ask(),
            reference_stale_ms: default_reference_stale_ms(),
            bid_widen_window_ms: default_bid_widen_window_ms(),
            ask_widen_window_ms: default_ask_widen_window_ms(),
            widen_bps: default_widen_bps(),
            bid_fee_window_ms: default_bid_fee_window_ms(),
            ask_fee_window_ms: default_ask_fee_window_ms(),
            fee_rate_step: default_fee_rate_step(),
            fee_reduction: default_fee_reduction(),
            competitor_min_notional: default_competitor_min_notional(),
            competitor_nudge: default_competitor_nudge(),
            competitor_fee_increment: default_competitor_fee_increment(),
            predator_dampen_gap: default_predator_dampen_gap(),
            predator_gap: default_predator_gap(),
            predator_step: default_predator_step(),
            bid_smoothing_window: default_bid_smoothing_window(),
            ask_smoothing_window: default_ask_smoothing_window(),
            min_change_ratio: default_min_change_ratio(),
            allowed_bps_mismatch: default_allowed_bps_mismatch(),
            cross_padding: default_cross_padding(),
            cross_guard_ms: default_cross_guard_ms(),
            min_replace_delay_ms: default_min_replace_delay_ms(),
            new_order_delay_ms: default_new_order_delay_ms(),
            default_priority_rate: default_priority_rate(),
            fresh_placement_boost: default_fresh_placement_boost(),
            hard_cancel_guard_ms: default_hard_cancel_guard_ms(),
            lean: LeanConfig::default(),
        }
    }
}

impl Default for LeanConfig {
    fn default() -> Self {
        Self {
            quote_low_water: default_quote_low_water(),
            base_low_water: default_base_low_water(),
            lean_factor: default_lean_factor(),
            ask_tighten: default_ask_tighten(),
            bid_tighten: default_bid_tighten(),
            target_max_units: default_target_max_units(),
        }
    }
}

impl EngineConfig {
    /// Validate invariants that would otherwise surface mid-tick.
    pub fn validate(&self) -> EngineResult<()> {
        if !self.quote_size.is_sign_positive() || self.quote_size.is_zero() {
            return Err(EngineError::InvalidConfig("quote_size must be positive".into()));
        }
        if self.bid_spread_multiplier >= self.ask_spread_multiplier
            && self.bid_spread_multiplier > Decimal::ONE
        {
            return Err(EngineError::InvalidConfig(
                "bid spread multiplier must not quote through the ask".into(),
            ));
        }
        if self.bid_smoothing_window == 0 || self.ask_smoothing_window == 0 {
            return Err(EngineError::InvalidConfig(
                "smoothing windows must be at least 1".into(),
            ));
        }
        if self.cross_padding.is_sign_negative() {
            return Err(EngineError::InvalidConfig("cross_padding must be >= 0".into()));
        }
        Ok(())
    }
}

fn default_quote_size() -> Decimal {
    Decimal::TWO
}
fn default_bid_size_ratio() -> Decimal {
    Decimal::new(5, 1) // 0.5
}
fn default_ask_size_ratio() -> Decimal {
    Decimal::new(8, 1) // 0.8
}
fn default_bid_spread_multiplier() -> Decimal {
    Decimal::new(99884, 5) // 0.99884
}
fn default_ask_spread_multiplier() -> Decimal {
    Decimal::new(99897, 5) // 0.99897
}
fn default_confidence_weight() -> Decimal {
    Decimal::new(999, 3) // 0.999
}
fn default_predictive_bias_bid() -> Decimal {
    Decimal::new(43, 5) // 0.00043
}
fn default_predictive_bias_ask() -> Decimal {
    Decimal::new(46, 5) // 0.00046
}
fn default_reference_stale_ms() -> u64 {
    2_000
}
fn default_bid_widen_window_ms() -> u64 {
    4_000
}
fn default_ask_widen_window_ms() -> u64 {
    3_000
}
fn default_widen_bps() -> Decimal {
    Decimal::new(3, 0) // 3 bps at the moment of adversity
}
fn default_bid_fee_window_ms() -> u64 {
    3_000
}
fn default_ask_fee_window_ms() -> u64 {
    2_000
}
fn default_fee_rate_step() -> u64 {
    25_000 // per remaining second
}
fn default_fee_reduction() -> u64 {
    5_000
}
fn default_competitor_min_notional() -> Decimal {
    Decimal::new(700, 0)
}
fn default_competitor_nudge() -> Decimal {
    Decimal::new(15, 5) // 0.00015 = 1.5 bps
}
fn default_competitor_fee_increment() -> u64 {
    15_000
}
fn default_predator_dampen_gap() -> Decimal {
    Decimal::new(2, 2) // 0.02 absolute
}
fn default_predator_gap() -> Decimal {
    Decimal::new(58, 4) // 0.0058 absolute
}
fn default_predator_step() -> Decimal {
    Decimal::new(59, 4) // 0.0059 absolute
}
fn default_bid_smoothing_window() -> usize {
    5
}
fn default_ask_smoothing_window() -> usize {
    4
}
fn default_min_change_ratio() -> Decimal {
    Decimal::new(15, 5) // 0.00015
}
fn default_allowed_bps_mismatch() -> Decimal {
    Decimal::new(2, 5) // 0.00002
}
fn default_cross_padding() -> Decimal {
    Decimal::new(5, 5) // 0.00005
}
fn default_cross_guard_ms() -> u64 {
    1_000
}
fn default_min_replace_delay_ms() -> u64 {
    350
}
fn default_new_order_delay_ms() -> u64 {
    16_000
}
fn default_priority_rate() -> u64 {
    101_420
}
fn default_fresh_placement_boost() -> Decimal {
    Decimal::new(14, 1) // 1.4
}
fn default_hard_cancel_guard_ms() -> u64 {
    8_000
}
fn default_quote_low_water() -> Decimal {
    Decimal::new(1000, 0)
}
fn default_base_low_water() -> Decimal {
    Decimal::new(50, 0)
}
fn default_lean_factor() -> Decimal {
    Decimal::new(11, 1) // 1.1
}
fn default_ask_tighten() -> Decimal {
    Decimal::new(99985, 5) // 0.99985
}
fn default_bid_tighten() -> Decimal {
    Decimal::new(10012, 4) // 1.0012
}
fn default_target_max_units() -> Decimal {
    Decimal::new(5, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        config.validate().unwrap();
        assert_eq!(config.bid_spread_multiplier, dec!(0.99884));
        assert_eq!(config.ask_spread_multiplier, dec!(0.99897));
        assert_eq!(config.min_change_ratio, dec!(0.00015));
        assert_eq!(config.default_priority_rate, 101_420);
        assert_eq!(config.new_order_delay_ms, 16_000);
        assert_eq!(config.lean.lean_factor, dec!(1.1));
    }

    #[test]
    fn test_config_serde_defaults() {
        let toml_str = r#"
quote_size = "4"
[lean]
quote_low_water = "500"
"#;
        let config: EngineConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.quote_size, dec!(4));
        assert_eq!(config.lean.quote_low_water, dec!(500));
        // Everything else falls back to defaults.
        assert_eq!(config.bid_smoothing_window, 5);
        assert_eq!(config.cross_padding, dec!(0.00005));
    }

    #[test]
    fn test_validate_rejects_zero_quote_size() {
        let config = EngineConfig {
            quote_size: Decimal::ZERO,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_smoothing_window() {
        let config = EngineConfig {
            bid_smoothing_window: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
