//! Core domain types for the obmm quoting engine.
//!
//! This crate provides the fundamental types shared by the feed, engine,
//! and gateway crates:
//! - `Price`, `Size`: precision-safe numeric types
//! - `Side`: bid/ask with cross-side helpers
//! - `OwnerId`, `Tier`, `TierTable`: participant classification
//! - `OrderBookSnapshot`, `RestingOrder`: immutable book values
//! - `ReferenceQuote`: independent fair-value estimate with confidence
//! - `QuoteInstruction`: the finalized order-change handed to the gateway

pub mod book;
pub mod clock;
pub mod decimal;
pub mod error;
pub mod quote;
pub mod reference;
pub mod side;
pub mod tier;

pub use book::{OrderBookSnapshot, RestingOrder};
pub use clock::now_ms;
pub use decimal::{Price, Size};
pub use error::{CoreError, Result};
pub use quote::{QuoteAction, QuoteInstruction, SubmissionId};
pub use reference::ReferenceQuote;
pub use side::Side;
pub use tier::{OwnerId, Tier, TierTable};
