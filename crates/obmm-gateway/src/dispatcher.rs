//! Bounded-worker dispatcher.
//!
//! Hands finalized quote changes to the gateway on a fixed pool of worker
//! tasks behind a bounded queue. Enqueueing never blocks: when the queue is
//! saturated the job is rejected with `DispatchResult::QueueFull` and the
//! side's sentinel retry path picks it up on a later tick.
//!
//! Submission results are reported back on an outcome channel that the
//! decision loop drains at the start of each tick; a failed submission
//! leaves the side unquoted so the next tick retries unconditionally.

use obmm_core::{QuoteInstruction, Side, SubmissionId};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::{error, info, warn};

use crate::error::GatewayError;
use crate::gateway::DynOrderGateway;

/// Work item for the pool.
#[derive(Debug, Clone)]
pub enum DispatchJob {
    /// Submit a quote change.
    Quote(QuoteInstruction),
    /// Emergency cancel-and-settle for a side.
    HardCancel(Side),
}

/// Result of attempting to enqueue a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchResult {
    /// Job queued for a worker.
    Queued,
    /// Queue saturated; job rejected.
    QueueFull,
}

impl DispatchResult {
    pub fn is_queued(&self) -> bool {
        matches!(self, Self::Queued)
    }
}

/// Completion report for a submitted quote change.
#[derive(Debug, Clone)]
pub struct SubmissionOutcome {
    pub side: Side,
    pub result: Result<SubmissionId, GatewayError>,
}

/// Executes quote changes on a bounded worker pool.
pub struct Dispatcher {
    tx: mpsc::Sender<DispatchJob>,
}

impl Dispatcher {
    /// Spawn `workers` worker tasks over a queue of depth `queue_depth`.
    ///
    /// Returns the dispatcher and the outcome receiver for the decision
    /// loop to drain.
    pub fn spawn(
        gateway: DynOrderGateway,
        workers: usize,
        queue_depth: usize,
    ) -> (Self, mpsc::Receiver<SubmissionOutcome>) {
        let (tx, rx) = mpsc::channel::<DispatchJob>(queue_depth.max(1));
        let (outcome_tx, outcome_rx) = mpsc::channel::<SubmissionOutcome>(queue_depth.max(1) * 2);
        let rx = Arc::new(Mutex::new(rx));

        for worker_id in 0..workers.max(1) {
            let rx = rx.clone();
            let gateway = gateway.clone();
            let outcome_tx = outcome_tx.clone();
            tokio::spawn(async move {
                loop {
                    let job = {
                        let mut guard = rx.lock().await;
                        guard.recv().await
                    };
                    let Some(job) = job else {
                        break; // dispatcher dropped
                    };
                    Self::execute(worker_id, &gateway, &outcome_tx, job).await;
                }
            });
        }

        (Self { tx }, outcome_rx)
    }

    /// Enqueue a job without blocking the decision loop.
    pub fn dispatch(&self, job: DispatchJob) -> DispatchResult {
        match self.tx.try_send(job) {
            Ok(()) => DispatchResult::Queued,
            Err(mpsc::error::TrySendError::Full(job)) => {
                warn!(?job, "dispatch queue saturated, rejecting job");
                DispatchResult::QueueFull
            }
            Err(mpsc::error::TrySendError::Closed(job)) => {
                error!(?job, "dispatch queue closed, rejecting job");
                DispatchResult::QueueFull
            }
        }
    }

    async fn execute(
        worker_id: usize,
        gateway: &DynOrderGateway,
        outcome_tx: &mpsc::Sender<SubmissionOutcome>,
        job: DispatchJob,
    ) {
        match job {
            DispatchJob::Quote(instruction) => {
                let side = instruction.side;
                let action = instruction.action;
                let price = instruction.price;
                let size = instruction.size;
                let rate = instruction.priority_rate;
                let result = gateway.submit_quote(instruction).await;
                match &result {
                    Ok(id) => info!(
                        worker = worker_id,
                        %side, %action, %price, %size, rate,
                        submission = %id,
                        "quote submitted"
                    ),
                    Err(e) => error!(
                        worker = worker_id,
                        %side, %action, %price,
                        error = %e,
                        "quote submission failed"
                    ),
                }
                if outcome_tx
                    .try_send(SubmissionOutcome { side, result })
                    .is_err()
                {
                    warn!(%side, "outcome channel full, report dropped");
                }
            }
            DispatchJob::HardCancel(side) => {
                if let Err(e) = gateway.hard_cancel_and_settle(side).await {
                    error!(%side, error = %e, "hard cancel-and-settle failed");
                } else {
                    info!(%side, "hard cancel-and-settle submitted");
                }
            }
        }
    }
}
