//! Data-source traits for the feed layer.
//!
//! Trait-based abstraction over the external pollers so the engine can be
//! exercised against scripted fixtures. All traits are dyn-compatible via
//! boxed futures.

use obmm_core::{OrderBookSnapshot, ReferenceQuote};
use rust_decimal::Decimal;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::FeedResult;

/// Boxed future for dyn-compatible async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;

/// Wallet balances for the instrument's two assets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Balances {
    /// Quote-asset balance (e.g. USDC).
    pub quote: Decimal,
    /// Base-asset balance (e.g. wrapped SOL).
    pub base: Decimal,
}

/// Supplies the current order-book snapshot.
///
/// Idempotent poll; a failure simply keeps the previous snapshot live.
pub trait BookProvider: Send + Sync {
    fn fetch_book(&self) -> BoxFuture<'_, FeedResult<OrderBookSnapshot>>;
}

/// Supplies the independent fair-value estimate.
///
/// `Ok(None)` is the explicit "feed has no data" state.
pub trait ReferenceProvider: Send + Sync {
    fn fetch_reference(&self) -> BoxFuture<'_, FeedResult<Option<ReferenceQuote>>>;
}

/// Supplies wallet balances for inventory leaning.
pub trait BalanceProvider: Send + Sync {
    fn fetch_balances(&self) -> BoxFuture<'_, FeedResult<Balances>>;
}

pub type DynBookProvider = Arc<dyn BookProvider>;
pub type DynReferenceProvider = Arc<dyn ReferenceProvider>;
pub type DynBalanceProvider = Arc<dyn BalanceProvider>;

/// Scripted book provider for tests.
pub struct MockBookProvider {
    responses: parking_lot::Mutex<Vec<FeedResult<OrderBookSnapshot>>>,
}

impl MockBookProvider {
    pub fn new(responses: Vec<FeedResult<OrderBookSnapshot>>) -> Self {
        Self {
            responses: parking_lot::Mutex::new(responses),
        }
    }
}

impl BookProvider for MockBookProvider {
    fn fetch_book(&self) -> BoxFuture<'_, FeedResult<OrderBookSnapshot>> {
        Box::pin(async move {
            let mut responses = self.responses.lock();
            if responses.is_empty() {
                Err(crate::FeedError::BookPoll("mock exhausted".into()))
            } else {
                responses.remove(0)
            }
        })
    }
}

/// Scripted reference provider for tests.
pub struct MockReferenceProvider {
    reading: parking_lot::Mutex<FeedResult<Option<ReferenceQuote>>>,
}

impl MockReferenceProvider {
    pub fn new(reading: FeedResult<Option<ReferenceQuote>>) -> Self {
        Self {
            reading: parking_lot::Mutex::new(reading),
        }
    }

    pub fn set(&self, reading: FeedResult<Option<ReferenceQuote>>) {
        *self.reading.lock() = reading;
    }
}

impl ReferenceProvider for MockReferenceProvider {
    fn fetch_reference(&self) -> BoxFuture<'_, FeedResult<Option<ReferenceQuote>>> {
        Box::pin(async move {
            match &*self.reading.lock() {
                Ok(r) => Ok(*r),
                Err(e) => Err(crate::FeedError::ReferencePoll(e.to_string())),
            }
        })
    }
}

/// Scripted balance provider for tests.
pub struct MockBalanceProvider {
    balances: parking_lot::Mutex<FeedResult<Balances>>,
}

impl MockBalanceProvider {
    pub fn new(balances: FeedResult<Balances>) -> Self {
        Self {
            balances: parking_lot::Mutex::new(balances),
        }
    }

    pub fn set(&self, balances: FeedResult<Balances>) {
        *self.balances.lock() = balances;
    }
}

impl BalanceProvider for MockBalanceProvider {
    fn fetch_balances(&self) -> BoxFuture<'_, FeedResult<Balances>> {
        Box::pin(async move {
            match &*self.balances.lock() {
                Ok(b) => Ok(*b),
                Err(e) => Err(crate::FeedError::BalancePoll(e.to_string())),
            }
        })
    }
}
