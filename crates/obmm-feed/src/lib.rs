//! Market data and balance feeds for the obmm quoting engine.
//!
//! Three poll-based collaborators supply the engine's inputs:
//! - order-book snapshots (`BookProvider`)
//! - the independent reference price (`ReferenceProvider`)
//! - wallet balances for inventory leaning (`BalanceProvider`)
//!
//! Book and reference run on their own recurring timers and swap immutable
//! values into `FeedState`, so a decision tick always reads a complete,
//! self-consistent snapshot; balances are polled by the host's slower
//! leaning cycle and fed straight to the engine. A failed poll retains the
//! last-known-good value and retries on the next interval — never fatal.

pub mod error;
pub mod poll;
pub mod providers;
pub mod state;

pub use error::{FeedError, FeedResult};
pub use poll::{spawn_book_poll, spawn_reference_poll};
pub use providers::{
    Balances, BookProvider, BoxFuture, DynBalanceProvider, DynBookProvider, DynReferenceProvider,
    MockBookProvider, MockReferenceProvider, ReferenceProvider,
};
pub use providers::{BalanceProvider, MockBalanceProvider};
pub use state::FeedState;
