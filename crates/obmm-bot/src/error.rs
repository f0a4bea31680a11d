//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Engine error: {0}")]
    Engine(#[from] obmm_engine::EngineError),

    #[error("Feed error: {0}")]
    Feed(#[from] obmm_feed::FeedError),

    #[error("Gateway error: {0}")]
    Gateway(#[from] obmm_gateway::GatewayError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] obmm_telemetry::TelemetryError),

    #[error("Startup error: {0}")]
    Startup(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
