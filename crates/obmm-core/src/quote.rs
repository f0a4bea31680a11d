//! Quote-change instruction types handed to the order gateway.

use crate::{Price, Side, Size};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// How the quote change reaches the book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteAction {
    /// Fresh placement on an unquoted side.
    New,
    /// Cancel the resting quote, then place.
    Replace,
}

impl fmt::Display for QuoteAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::New => write!(f, "new"),
            Self::Replace => write!(f, "replace"),
        }
    }
}

/// Identifier returned by the gateway for a submitted quote change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionId(Uuid);

impl SubmissionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubmissionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A finalized quote change for one side.
///
/// Everything the gateway needs to build the wire transaction; the engine
/// never blocks on the result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteInstruction {
    pub side: Side,
    pub action: QuoteAction,
    pub price: Price,
    pub size: Size,
    /// Whether a cancel of the side's resting quote precedes the placement.
    pub cancel_existing: bool,
    /// Transaction-ordering incentive rate for this submission.
    pub priority_rate: u64,
    /// Unix milliseconds when the instruction was created.
    pub created_at_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submission_id_unique() {
        assert_ne!(SubmissionId::new(), SubmissionId::new());
    }

    #[test]
    fn test_action_display() {
        assert_eq!(QuoteAction::New.to_string(), "new");
        assert_eq!(QuoteAction::Replace.to_string(), "replace");
    }
}
