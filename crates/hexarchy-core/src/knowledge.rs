//! Per-tile knowledge accumulation.
//!
//! Knowledge points accumulate on tiles (seeded by research errands at a
//! campus) and spill over to neighboring tiles at the end of every turn,
//! decaying with each step outward.

use crate::types::KnowledgeBranch;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default cap on a knowledge branch at a single tile.
pub const KNOWLEDGE_MAX_POINTS: u32 = 100;

/// Decay factor applied per step of spillover.
pub const KNOWLEDGE_SPILLOVER_DECAY: f64 = 0.1;

/// Points a completed research errand credits to the hosting tile. Kept
/// below the cap so the freshly credited branch still spills outward.
pub const RESEARCH_KNOWLEDGE_POINTS: u32 = 50;

/// Knowledge points accumulated on a tile, per branch.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeMap {
    /// Branch -> points. BTreeMap keeps serialization deterministic.
    points: BTreeMap<KnowledgeBranch, u32>,
}

impl KnowledgeMap {
    /// Create an empty knowledge map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add points to a branch, decayed by `decay` and clamped to `max`.
    ///
    /// Never decreases a branch; adding to a branch already at or above
    /// `max` is a no-op.
    pub fn add(&mut self, branch: &str, points: u32, decay: f64, max: u32) {
        let current = self.points.get(branch).copied().unwrap_or(0);
        if current >= max {
            return;
        }
        let delivered = ((points as f64) * (1.0 - decay)).round() as u32;
        if delivered == 0 {
            return;
        }
        let updated = current.saturating_add(delivered).min(max);
        if updated > current {
            self.points.insert(branch.to_string(), updated);
        }
    }

    /// Points accumulated on a branch.
    pub fn get(&self, branch: &str) -> u32 {
        self.points.get(branch).copied().unwrap_or(0)
    }

    /// Check whether any branch holds points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Iterate over (branch, points) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&KnowledgeBranch, &u32)> {
        self.points.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_get() {
        let mut k = KnowledgeMap::new();
        k.add("agriculture", 10, 0.0, KNOWLEDGE_MAX_POINTS);
        assert_eq!(k.get("agriculture"), 10);
        assert_eq!(k.get("masonry"), 0);
    }

    #[test]
    fn test_add_applies_decay() {
        let mut k = KnowledgeMap::new();
        k.add("agriculture", 10, KNOWLEDGE_SPILLOVER_DECAY, 100);
        assert_eq!(k.get("agriculture"), 9);
    }

    #[test]
    fn test_add_clamps_to_max() {
        let mut k = KnowledgeMap::new();
        k.add("agriculture", 80, 0.0, 100);
        k.add("agriculture", 80, 0.0, 100);
        assert_eq!(k.get("agriculture"), 100);
    }

    #[test]
    fn test_add_at_max_is_noop() {
        let mut k = KnowledgeMap::new();
        k.add("agriculture", 100, 0.0, 100);
        k.add("agriculture", 50, 0.0, 100);
        assert_eq!(k.get("agriculture"), 100);
    }

    #[test]
    fn test_never_decreases() {
        let mut k = KnowledgeMap::new();
        k.add("agriculture", 40, 0.0, 100);
        // A lower max than the current points must not pull it down.
        k.add("agriculture", 10, 0.0, 30);
        assert_eq!(k.get("agriculture"), 40);
    }

    #[test]
    fn test_zero_delivery_ignored() {
        let mut k = KnowledgeMap::new();
        k.add("agriculture", 0, 0.0, 100);
        assert!(k.is_empty());
    }
}
