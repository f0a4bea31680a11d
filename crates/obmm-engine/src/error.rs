//! Engine error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid engine configuration: {0}")]
    InvalidConfig(String),

    #[error("Crossed candidates refused: bid {bid} vs ask {ask}")]
    CrossedCandidates { bid: String, ask: String },
}

pub type EngineResult<T> = Result<T, EngineError>;
