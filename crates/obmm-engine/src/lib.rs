//! Quoting decision loop.
//!
//! One `QuoteEngine` per instrument. On each tick it reads the latest book
//! snapshot and reference price, reconciles its per-side quote state,
//! detects adversity, applies defensive adjustments, and emits finalized
//! quote instructions for the dispatcher.
//!
//! # Tick pipeline (per side)
//!
//! ```text
//! book price (tier exclusion + predator dampening)
//!   → spread multiplier (defaults, lean bias)
//!   → reference bound check (adversity retreat + sentinel reset)
//!   → time-boxed adversity widening
//!   → competitor-presence defense
//!   → rolling-window smoothing
//!   → predator-avoidance step
//!   → hot tuning factor
//!   → throttle gate → priority rate → QuoteInstruction
//! ```

pub mod adversity;
pub mod config;
pub mod engine;
pub mod error;
pub mod fair_price;
pub mod lean;
pub mod priority;
pub mod quote_state;
pub mod smoothing;
pub mod throttle;
pub mod tuning;

pub use config::{EngineConfig, LeanConfig};
pub use engine::{EngineStatus, QuoteEngine, TickOutput};
pub use error::{EngineError, EngineResult};
pub use lean::{LeanController, LeanState, LeanUpdate};
pub use priority::{PriorityInputs, PriorityState};
pub use quote_state::{QuotePhase, QuoteState};
pub use throttle::{SuppressReason, ThrottleContext, ThrottleDecision};
pub use tuning::{TuningHandle, TuningParams};
