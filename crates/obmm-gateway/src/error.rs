//! Gateway error types.

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("Quote submission failed: {0}")]
    Submit(String),

    #[error("Hard cancel-and-settle failed: {0}")]
    HardCancel(String),
}

pub type GatewayResult<T> = Result<T, GatewayError>;
