//! Book side: bid or ask.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Side of the book a quote rests on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Bid,
    Ask,
}

impl Side {
    /// Returns the opposite side.
    pub fn opposite(&self) -> Self {
        match self {
            Self::Bid => Self::Ask,
            Self::Ask => Self::Bid,
        }
    }

    /// True when `a` is a better price than `b` on this side
    /// (higher for bids, lower for asks).
    pub fn is_better(&self, a: crate::Price, b: crate::Price) -> bool {
        match self {
            Self::Bid => a > b,
            Self::Ask => a < b,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bid => write!(f, "bid"),
            Self::Ask => write!(f, "ask"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Price;
    use rust_decimal_macros::dec;

    #[test]
    fn test_opposite() {
        assert_eq!(Side::Bid.opposite(), Side::Ask);
        assert_eq!(Side::Ask.opposite(), Side::Bid);
    }

    #[test]
    fn test_is_better() {
        let lo = Price::new(dec!(99));
        let hi = Price::new(dec!(101));
        assert!(Side::Bid.is_better(hi, lo));
        assert!(!Side::Bid.is_better(lo, hi));
        assert!(Side::Ask.is_better(lo, hi));
        assert!(!Side::Ask.is_better(hi, lo));
    }
}
