//! Order gateway abstraction and async dispatcher.
//!
//! The engine decides; this crate delivers. `OrderGateway` is the narrow
//! interface to the external order-encoding/transport collaborator, and
//! `Dispatcher` executes finalized quote changes on a bounded worker pool
//! so a slow or failing submission never blocks the decision tick.

pub mod dispatcher;
pub mod error;
pub mod gateway;

pub use dispatcher::{DispatchJob, DispatchResult, Dispatcher, SubmissionOutcome};
pub use error::{GatewayError, GatewayResult};
pub use gateway::{BoxFuture, DynOrderGateway, OrderGateway, RecordingGateway};
