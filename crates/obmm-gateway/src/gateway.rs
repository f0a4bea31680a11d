//! Order gateway trait.
//!
//! Abstracts the external collaborator that encodes and transmits order
//! transactions. Dyn-compatible via boxed futures so tests can inject a
//! recording implementation.

use obmm_core::{QuoteInstruction, Side, SubmissionId};
use std::pin::Pin;
use std::sync::Arc;

use crate::error::GatewayResult;

/// Boxed future for dyn-compatible async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;

/// Narrow interface to the external order gateway.
pub trait OrderGateway: Send + Sync {
    /// Submit a finalized quote change. Fire-and-forget from the engine's
    /// perspective; the result only feeds logging/metrics and the unquoted
    /// retry path.
    fn submit_quote(&self, instruction: QuoteInstruction)
        -> BoxFuture<'_, GatewayResult<SubmissionId>>;

    /// Emergency path: cancel everything resting on a side and settle.
    /// Invoked by the reconciliation safeguard when more than one resting
    /// order per side is detected for our identity.
    fn hard_cancel_and_settle(&self, side: Side) -> BoxFuture<'_, GatewayResult<()>>;
}

pub type DynOrderGateway = Arc<dyn OrderGateway>;

/// Recording gateway for tests.
pub struct RecordingGateway {
    submissions: parking_lot::Mutex<Vec<QuoteInstruction>>,
    hard_cancels: parking_lot::Mutex<Vec<Side>>,
    next_result: parking_lot::Mutex<GatewayResult<()>>,
}

impl Default for RecordingGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self {
            submissions: parking_lot::Mutex::new(Vec::new()),
            hard_cancels: parking_lot::Mutex::new(Vec::new()),
            next_result: parking_lot::Mutex::new(Ok(())),
        }
    }

    /// Make subsequent submissions fail with the given message.
    pub fn fail_with(&self, msg: &str) {
        *self.next_result.lock() = Err(crate::GatewayError::Submit(msg.to_string()));
    }

    /// Restore successful submissions.
    pub fn succeed(&self) {
        *self.next_result.lock() = Ok(());
    }

    pub fn submissions(&self) -> Vec<QuoteInstruction> {
        self.submissions.lock().clone()
    }

    pub fn hard_cancels(&self) -> Vec<Side> {
        self.hard_cancels.lock().clone()
    }
}

impl OrderGateway for RecordingGateway {
    fn submit_quote(
        &self,
        instruction: QuoteInstruction,
    ) -> BoxFuture<'_, GatewayResult<SubmissionId>> {
        Box::pin(async move {
            self.submissions.lock().push(instruction);
            self.next_result.lock().clone().map(|_| SubmissionId::new())
        })
    }

    fn hard_cancel_and_settle(&self, side: Side) -> BoxFuture<'_, GatewayResult<()>> {
        Box::pin(async move {
            self.hard_cancels.lock().push(side);
            Ok(())
        })
    }
}
