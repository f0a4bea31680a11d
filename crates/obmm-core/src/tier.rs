//! Participant classification.
//!
//! Resting orders are tagged by owner identity into tiers. The tier tables
//! are static for the life of the process: loaded from configuration, never
//! mutated at runtime. Classification is a pure set-membership lookup used
//! to compute a cleaner fair price and to apply defensive rules against
//! specific flow sources.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Opaque owner identity of a resting order (the open-orders account of the
/// participant in the original deployment).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for OwnerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for OwnerId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Participant tier of a resting order's owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Our own resting orders.
    SelfOwned,
    /// A known competing market maker; presence ahead of our intended
    /// price triggers defensive widening and priority escalation.
    Competitor,
    /// Known toxic/sharp flow; excluded from fair-price computation and
    /// avoided when it rests next to our candidate.
    Predator,
    /// Everyone else.
    Unknown,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SelfOwned => write!(f, "self"),
            Self::Competitor => write!(f, "competitor"),
            Self::Predator => write!(f, "predator"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Static identity → tier mapping.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TierTable {
    /// Our own open-orders identity (one per instrument).
    #[serde(default)]
    pub self_owned: HashSet<OwnerId>,
    /// Known competing market makers.
    #[serde(default)]
    pub competitors: HashSet<OwnerId>,
    /// Known toxic flow sources.
    #[serde(default)]
    pub predators: HashSet<OwnerId>,
}

impl TierTable {
    pub fn new(
        self_owned: impl IntoIterator<Item = OwnerId>,
        competitors: impl IntoIterator<Item = OwnerId>,
        predators: impl IntoIterator<Item = OwnerId>,
    ) -> Self {
        Self {
            self_owned: self_owned.into_iter().collect(),
            competitors: competitors.into_iter().collect(),
            predators: predators.into_iter().collect(),
        }
    }

    /// Classify an owner identity. Pure, O(1), no side effects.
    ///
    /// Self membership wins over any other listing.
    pub fn classify(&self, owner: &OwnerId) -> Tier {
        if self.self_owned.contains(owner) {
            Tier::SelfOwned
        } else if self.predators.contains(owner) {
            Tier::Predator
        } else if self.competitors.contains(owner) {
            Tier::Competitor
        } else {
            Tier::Unknown
        }
    }

    pub fn is_self(&self, owner: &OwnerId) -> bool {
        self.classify(owner) == Tier::SelfOwned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> TierTable {
        TierTable::new(
            [OwnerId::from("our-ooa")],
            [OwnerId::from("asx")],
            [OwnerId::from("fish-1"), OwnerId::from("sharp-1")],
        )
    }

    #[test]
    fn test_classify_tiers() {
        let t = table();
        assert_eq!(t.classify(&OwnerId::from("our-ooa")), Tier::SelfOwned);
        assert_eq!(t.classify(&OwnerId::from("asx")), Tier::Competitor);
        assert_eq!(t.classify(&OwnerId::from("fish-1")), Tier::Predator);
        assert_eq!(t.classify(&OwnerId::from("nobody")), Tier::Unknown);
    }

    #[test]
    fn test_self_wins_over_other_listings() {
        let mut t = table();
        t.predators.insert(OwnerId::from("our-ooa"));
        assert_eq!(t.classify(&OwnerId::from("our-ooa")), Tier::SelfOwned);
    }

    #[test]
    fn test_empty_table_is_all_unknown() {
        let t = TierTable::default();
        assert_eq!(t.classify(&OwnerId::from("anyone")), Tier::Unknown);
    }

    #[test]
    fn test_table_deserializes_from_config_json() {
        let json = r#"{
            "self_owned": ["our-ooa"],
            "competitors": ["asx"],
            "predators": ["fish-1"]
        }"#;
        let t: TierTable = serde_json::from_str(json).unwrap();
        assert_eq!(t.classify(&OwnerId::from("asx")), Tier::Competitor);
        assert_eq!(t.classify(&OwnerId::from("fish-1")), Tier::Predator);
    }
}
