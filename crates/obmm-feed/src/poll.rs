//! Recurring poll tasks that refresh `FeedState`.
//!
//! Transient poll failures are logged at debug level and the last-known-good
//! value stays live; the next interval retries.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::providers::{DynBookProvider, DynReferenceProvider};
use crate::state::FeedState;

/// Spawn the order-book poll task.
pub fn spawn_book_poll(
    provider: DynBookProvider,
    state: Arc<FeedState>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            match provider.fetch_book().await {
                Ok(snapshot) => state.store_book(snapshot),
                Err(e) => debug!(error = %e, "book poll failed, retaining previous snapshot"),
            }
        }
    })
}

/// Spawn the reference-price poll task.
pub fn spawn_reference_poll(
    provider: DynReferenceProvider,
    state: Arc<FeedState>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            match provider.fetch_reference().await {
                Ok(reading) => state.store_reference(reading),
                Err(e) => debug!(error = %e, "reference poll failed, retaining previous reading"),
            }
        }
    })
}
