//! Feed error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Book poll failed: {0}")]
    BookPoll(String),

    #[error("Reference price poll failed: {0}")]
    ReferencePoll(String),

    #[error("Balance poll failed: {0}")]
    BalancePoll(String),
}

pub type FeedResult<T> = Result<T, FeedError>;
