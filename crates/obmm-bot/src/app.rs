//! Main application orchestration.
//!
//! Three recurring timers plus the decision tick, exactly one engine lock:
//! - book and reference poll tasks swap immutable values into `FeedState`
//! - the decision tick locks the engine, feeds it the latest snapshot, and
//!   forwards the accepted quote changes to the dispatcher
//! - the leaning cycle refreshes balances and folds them into the engine
//! - submission outcomes drain back in and mark failed sides unquoted

use obmm_core::now_ms;
use obmm_engine::QuoteEngine;
use obmm_feed::{
    spawn_book_poll, spawn_reference_poll, DynBalanceProvider, DynBookProvider,
    DynReferenceProvider, FeedState,
};
use obmm_gateway::{DispatchJob, Dispatcher, DynOrderGateway};
use obmm_telemetry::metrics;
use rust_decimal::prelude::ToPrimitive;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::{AppConfig, OperatingMode};
use crate::error::{AppError, AppResult};
use crate::sim::{DryRunGateway, SimFeed};

/// Main application.
pub struct App {
    config: AppConfig,
}

impl App {
    pub fn new(config: AppConfig) -> AppResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Run with collaborators chosen by the operating mode.
    pub async fn run(self) -> AppResult<()> {
        match self.config.mode {
            OperatingMode::DryRun => {
                info!("dry-run mode: simulated feeds, logging gateway");
                let sim = Arc::new(SimFeed::new(self.config.sim.clone()));
                let gateway: DynOrderGateway = Arc::new(DryRunGateway::new());
                self.run_with(sim.clone(), sim.clone(), sim, gateway).await
            }
            OperatingMode::Live => Err(AppError::Startup(
                "live mode requires a wired order gateway and data feeds".into(),
            )),
        }
    }

    /// Run against injected collaborators.
    pub async fn run_with(
        self,
        book_provider: DynBookProvider,
        reference_provider: DynReferenceProvider,
        balance_provider: DynBalanceProvider,
        gateway: DynOrderGateway,
    ) -> AppResult<()> {
        let config = self.config;

        let mut engine = QuoteEngine::new(
            &config.instrument,
            config.engine.clone(),
            config.tiers.tier_table(),
        )?;

        // Startup validation: the first balance fetch is fatal on failure.
        let initial = balance_provider.fetch_balances().await.map_err(|e| {
            AppError::Startup(format!("initial balance fetch failed: {e}"))
        })?;
        engine.apply_balances(initial.quote, initial.base);
        info!(
            instrument = %config.instrument,
            quote_balance = %initial.quote,
            base_balance = %initial.base,
            "startup balances loaded"
        );

        let engine = Arc::new(Mutex::new(engine));
        let feed = Arc::new(FeedState::new());

        let book_task = spawn_book_poll(
            book_provider,
            feed.clone(),
            Duration::from_millis(config.feed.book_poll_ms),
        );
        let reference_task = spawn_reference_poll(
            reference_provider,
            feed.clone(),
            Duration::from_millis(config.feed.reference_poll_ms),
        );

        let (dispatcher, mut outcomes) =
            Dispatcher::spawn(gateway, config.dispatch.workers, config.dispatch.queue_depth);

        let mut tick = tokio::time::interval(Duration::from_millis(config.feed.tick_interval_ms));
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut lean = tokio::time::interval(Duration::from_millis(config.feed.lean_interval_ms));
        lean.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        info!(instrument = %config.instrument, "entering decision loop");
        loop {
            tokio::select! {
                _ = tick.tick() => {
                    run_tick(&engine, &feed, &dispatcher, config.engine.reference_stale_ms).await;
                }

                _ = lean.tick() => {
                    match balance_provider.fetch_balances().await {
                        Ok(balances) => {
                            engine.lock().await.apply_balances(balances.quote, balances.base);
                        }
                        Err(e) => warn!(error = %e, "balance refresh failed, inventory unchanged"),
                    }
                }

                Some(outcome) = outcomes.recv() => {
                    if outcome.result.is_err() {
                        metrics::SUBMISSIONS_FAILED_TOTAL
                            .with_label_values(&[&outcome.side.to_string()])
                            .inc();
                        engine.lock().await.on_submission_failure(outcome.side);
                    }
                }

                _ = tokio::signal::ctrl_c() => {
                    info!("shutdown signal received");
                    break;
                }
            }
        }

        let final_status = engine.lock().await.status();
        info!(status = ?final_status, "shutting down");
        book_task.abort();
        reference_task.abort();

        Ok(())
    }
}

/// One decision tick: read feeds, run the engine, dispatch the output.
pub async fn run_tick(
    engine: &Mutex<QuoteEngine>,
    feed: &FeedState,
    dispatcher: &Dispatcher,
    reference_stale_ms: u64,
) {
    let Some(book) = feed.book() else {
        debug!("no book snapshot yet, skipping tick");
        return;
    };
    let now = now_ms();
    let reference = feed.reference(now, reference_stale_ms);

    let mut engine = engine.lock().await;
    let out = engine.tick(&book, reference.as_ref(), now);

    for side in &out.adversity_events {
        metrics::ADVERSITY_EVENTS_TOTAL
            .with_label_values(&[&side.to_string()])
            .inc();
    }
    for (side, reason) in &out.suppressed {
        metrics::THROTTLE_SUPPRESSED_TOTAL
            .with_label_values(&[&side.to_string(), reason.as_str()])
            .inc();
    }
    for side in &out.hard_cancels {
        metrics::HARD_CANCELS_TOTAL
            .with_label_values(&[&side.to_string()])
            .inc();
        if !dispatcher.dispatch(DispatchJob::HardCancel(*side)).is_queued() {
            warn!(%side, "hard cancel rejected by saturated queue");
        }
    }
    for instruction in out.instructions {
        let side = instruction.side;
        metrics::QUOTES_SUBMITTED_TOTAL
            .with_label_values(&[&side.to_string(), &instruction.action.to_string()])
            .inc();
        metrics::CANDIDATE_PRICE
            .with_label_values(&[&side.to_string()])
            .set(instruction.price.inner().to_f64().unwrap_or(0.0));
        metrics::PRIORITY_RATE.set(instruction.priority_rate as i64);

        if !dispatcher.dispatch(DispatchJob::Quote(instruction)).is_queued() {
            // Queue saturated: treat like a failed submission so the side
            // retries unconditionally next tick.
            metrics::SUBMISSIONS_FAILED_TOTAL
                .with_label_values(&[&side.to_string()])
                .inc();
            engine.on_submission_failure(side);
        }
    }
}
