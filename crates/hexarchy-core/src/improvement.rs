//! Tile improvements and their per-turn economy.
//!
//! An improvement occupies a tile, yields resources into its own store each
//! turn, and may host one work errand at a time. Traders subscribe to an
//! improvement on both sides of a route: the `traders` list holds consumers
//! drawing from this improvement's store, the `suppliers` list holds the
//! traders delivering into it.

use crate::errand::WorkErrand;
use crate::types::TraderId;
use crate::yields::{ResourceStore, Yield};
use serde::{Deserialize, Serialize};

/// Closed set of improvement kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImprovementKind {
    Settlement,
    Encampment,
    Farm,
    Forest,
    Mine,
    Worksite,
    Campus,
}

impl ImprovementKind {
    /// Per-turn yield added into the improvement's store.
    pub const fn per_turn_yield(&self) -> Yield {
        match self {
            ImprovementKind::Settlement => Yield::new(1, 1, 0, 0),
            ImprovementKind::Encampment => Yield::new(0, 1, 0, 0),
            ImprovementKind::Farm => Yield::new(2, 0, 0, 0),
            ImprovementKind::Mine => Yield::new(0, 2, 0, 0),
            ImprovementKind::Campus => Yield::new(0, 0, 2, 0),
            // Natural improvements and bare worksites produce nothing of
            // their own; the tile's baseline yield is all there is.
            ImprovementKind::Forest | ImprovementKind::Worksite => Yield::zero(),
        }
    }

    /// Default storage capacity for the kind. A live errand raises the
    /// store's capacity to its cost; completion restores this default.
    pub const fn store_capacity(&self) -> Yield {
        match self {
            ImprovementKind::Settlement => Yield::new(20, 20, 10, 10),
            ImprovementKind::Encampment => Yield::new(10, 10, 0, 0),
            ImprovementKind::Farm => Yield::new(5, 0, 0, 0),
            ImprovementKind::Mine => Yield::new(0, 5, 0, 0),
            ImprovementKind::Campus => Yield::new(0, 0, 10, 0),
            ImprovementKind::Forest | ImprovementKind::Worksite => Yield::zero(),
        }
    }

    /// Elevation contributed to the tile, on top of the terrain height.
    pub const fn height(&self) -> i32 {
        match self {
            ImprovementKind::Forest => 2,
            ImprovementKind::Settlement | ImprovementKind::Encampment => 1,
            _ => 0,
        }
    }

    /// Natural improvements pre-exist on the map and contribute no yield.
    pub const fn natural(&self) -> bool {
        matches!(self, ImprovementKind::Forest)
    }

    /// Which errand kinds this improvement can host, if any.
    pub const fn hosts_construction(&self) -> bool {
        matches!(self, ImprovementKind::Worksite)
    }

    pub const fn hosts_training(&self) -> bool {
        matches!(self, ImprovementKind::Settlement | ImprovementKind::Encampment)
    }

    pub const fn hosts_research(&self) -> bool {
        matches!(self, ImprovementKind::Campus)
    }

    /// Resource cost to construct this improvement via a worksite errand.
    pub const fn construction_cost(&self) -> Yield {
        match self {
            ImprovementKind::Farm => Yield::new(5, 0, 0, 0),
            ImprovementKind::Mine => Yield::new(0, 5, 0, 0),
            ImprovementKind::Encampment => Yield::new(0, 6, 0, 0),
            ImprovementKind::Campus => Yield::new(0, 8, 0, 0),
            ImprovementKind::Settlement => Yield::new(5, 10, 0, 0),
            // Not constructible; zero cost keeps the table total.
            ImprovementKind::Forest | ImprovementKind::Worksite => Yield::zero(),
        }
    }

    /// Get all improvement kind variants.
    pub const fn all() -> &'static [ImprovementKind] {
        &[
            ImprovementKind::Settlement,
            ImprovementKind::Encampment,
            ImprovementKind::Farm,
            ImprovementKind::Forest,
            ImprovementKind::Mine,
            ImprovementKind::Worksite,
            ImprovementKind::Campus,
        ]
    }
}

/// An economic structure occupying a tile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Improvement {
    /// Kind of improvement.
    pub kind: ImprovementKind,
    /// Pillaged improvements produce nothing until repaired.
    pub pillaged: bool,
    /// Capped resource stockpile, shared with any live errand.
    pub store: ResourceStore,
    /// Work in progress, at most one at a time.
    pub errand: Option<WorkErrand>,
    /// Traders consuming from this improvement (rebuilt on import).
    #[serde(skip)]
    pub traders: Vec<TraderId>,
    /// Traders delivering into this improvement (rebuilt on import).
    #[serde(skip)]
    pub suppliers: Vec<TraderId>,
}

impl Improvement {
    /// Create a new improvement of the given kind with an empty store.
    pub fn new(kind: ImprovementKind) -> Self {
        Self {
            kind,
            pillaged: false,
            store: ResourceStore::new(kind.store_capacity()),
            errand: None,
            traders: Vec::new(),
            suppliers: Vec::new(),
        }
    }

    /// Per-turn yield, accounting for the natural and pillaged flags.
    pub fn per_turn_yield(&self) -> Yield {
        if self.pillaged || self.kind.natural() {
            Yield::zero()
        } else {
            self.kind.per_turn_yield()
        }
    }

    /// Can this improvement feed a trade route for `requirement`?
    ///
    /// It must be productive (not pillaged, not natural-only with an empty
    /// store), not itself consumed by a live errand, and either stockpile or
    /// produce something the requirement asks for.
    pub fn can_supply(&self, requirement: &Yield) -> bool {
        if self.pillaged || self.errand.is_some() {
            return false;
        }
        let available = self.store.stored + self.per_turn_yield();
        available.overlaps(requirement)
    }

    /// Start an errand. Refused (returns false) when one is already live;
    /// preemption is deliberately not supported.
    pub fn start_errand(&mut self, errand: WorkErrand) -> bool {
        if self.errand.is_some() {
            return false;
        }
        self.store.raise_capacity_to(&errand.cost);
        self.errand = Some(errand);
        true
    }

    /// Completion check, the first step of the per-turn `work` sequence.
    ///
    /// When the store covers the errand cost the errand is marked completed,
    /// the cost is deducted, the store capacity drops back to the kind's
    /// default, and the supplier traders to expire are returned.
    pub fn check_completion(&mut self) -> Vec<TraderId> {
        let Some(errand) = self.errand.as_mut() else {
            return Vec::new();
        };
        if errand.completed || !self.store.fulfills(&errand.cost) {
            return Vec::new();
        }
        errand.completed = true;
        self.store.deduct(&errand.cost);
        self.store.set_capacity(self.kind.store_capacity());
        std::mem::take(&mut self.suppliers)
    }

    /// Final steps of `work`: add own yield into the store, then cap.
    pub fn accrue(&mut self) {
        self.store.stored += self.per_turn_yield();
        self.store.cap();
    }

    /// True if an errand exists and has completed this turn.
    pub fn errand_completed(&self) -> bool {
        self.errand.as_ref().map_or(false, |e| e.completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errand::ErrandAction;

    #[test]
    fn test_natural_yields_nothing() {
        let forest = Improvement::new(ImprovementKind::Forest);
        assert_eq!(forest.per_turn_yield(), Yield::zero());
    }

    #[test]
    fn test_pillaged_yields_nothing() {
        let mut farm = Improvement::new(ImprovementKind::Farm);
        assert_eq!(farm.per_turn_yield(), Yield::food(2));
        farm.pillaged = true;
        assert_eq!(farm.per_turn_yield(), Yield::zero());
    }

    #[test]
    fn test_accrue_caps_at_capacity() {
        let mut farm = Improvement::new(ImprovementKind::Farm);
        for _ in 0..10 {
            farm.accrue();
        }
        assert_eq!(farm.store.stored, Yield::food(5));
    }

    #[test]
    fn test_start_errand_raises_capacity() {
        let mut site = Improvement::new(ImprovementKind::Worksite);
        let errand = WorkErrand::new(
            ErrandAction::Construction {
                kind: ImprovementKind::Farm,
            },
            0,
            None,
        );
        assert!(site.start_errand(errand));
        assert!(site.store.capacity.fulfills(&Yield::food(5)));
    }

    #[test]
    fn test_second_errand_refused() {
        let mut site = Improvement::new(ImprovementKind::Worksite);
        let errand = WorkErrand::new(
            ErrandAction::Construction {
                kind: ImprovementKind::Farm,
            },
            0,
            None,
        );
        assert!(site.start_errand(errand.clone()));
        assert!(!site.start_errand(errand));
    }

    #[test]
    fn test_completion_deducts_and_restores_capacity() {
        let mut site = Improvement::new(ImprovementKind::Worksite);
        site.suppliers = vec![7, 9];
        let errand = WorkErrand::new(
            ErrandAction::Construction {
                kind: ImprovementKind::Farm,
            },
            0,
            None,
        );
        site.start_errand(errand);
        site.store.stored = Yield::food(5);

        let expired = site.check_completion();
        assert_eq!(expired, vec![7, 9]);
        assert!(site.errand_completed());
        assert_eq!(site.store.stored, Yield::zero());
        assert_eq!(
            site.store.capacity,
            ImprovementKind::Worksite.store_capacity()
        );
    }

    #[test]
    fn test_completion_requires_full_cost() {
        let mut site = Improvement::new(ImprovementKind::Worksite);
        let errand = WorkErrand::new(
            ErrandAction::Construction {
                kind: ImprovementKind::Farm,
            },
            0,
            None,
        );
        site.start_errand(errand);
        site.store.stored = Yield::food(4);

        assert!(site.check_completion().is_empty());
        assert!(!site.errand_completed());
        assert_eq!(site.store.stored, Yield::food(4));
    }

    #[test]
    fn test_can_supply_matches_keys() {
        let mut farm = Improvement::new(ImprovementKind::Farm);
        assert!(farm.can_supply(&Yield::food(5)));
        assert!(!farm.can_supply(&Yield::production(5)));
        farm.pillaged = true;
        assert!(!farm.can_supply(&Yield::food(5)));
    }

    #[test]
    fn test_worksite_cannot_supply() {
        let mut site = Improvement::new(ImprovementKind::Worksite);
        let errand = WorkErrand::new(
            ErrandAction::Construction {
                kind: ImprovementKind::Farm,
            },
            0,
            None,
        );
        site.start_errand(errand);
        assert!(!site.can_supply(&Yield::food(5)));
    }
}
