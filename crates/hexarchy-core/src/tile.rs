//! Map tiles: terrain, occupancy, and per-civilization visibility.
//!
//! Visibility is two orthogonal per-civ flags: `discovered_by` is
//! monotone-sticky, `visible_to` is a reference count of overlapping vision
//! cones. The counter may dip negative transiently while a move re-lights
//! cones; at rest it is nonnegative.

use crate::improvement::Improvement;
use crate::knowledge::KnowledgeMap;
use crate::terrain::Terrain;
use crate::types::{CityId, CivId, MovementClass, UnitId};
use crate::yields::Yield;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// City ownership of a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileOwner {
    pub civ_id: CivId,
    pub city_id: CityId,
}

/// One hex cell of the map.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    /// Base terrain type.
    pub terrain: Terrain,
    /// Baseline yield of the bare tile.
    pub base_yield: Yield,
    /// Owning city, if claimed; rebuilt on import from the city tile sets.
    #[serde(skip)]
    pub owner: Option<TileOwner>,
    /// Unit occupying this tile; at most one.
    pub unit: Option<UnitId>,
    /// Improvement built here; exclusively owned by the tile.
    pub improvement: Option<Improvement>,
    /// Knowledge points accumulated on this tile.
    pub knowledge: KnowledgeMap,
    /// Civs that have discovered this tile. Monotone, never cleared.
    pub discovered_by: BTreeSet<CivId>,
    /// Per-civ visibility reference counters.
    pub visible_to: BTreeMap<CivId, i32>,
}

impl Tile {
    /// Create a new tile with the terrain's baseline yield.
    pub fn new(terrain: Terrain) -> Self {
        Self {
            terrain,
            base_yield: terrain.base_yield(),
            owner: None,
            unit: None,
            improvement: None,
            knowledge: KnowledgeMap::new(),
            discovered_by: BTreeSet::new(),
            visible_to: BTreeMap::new(),
        }
    }

    /// Total elevation: terrain height plus improvement height.
    pub fn elevation(&self) -> i32 {
        self.terrain.height()
            + self
                .improvement
                .as_ref()
                .map_or(0, |imp| imp.kind.height())
    }

    /// Published yield of the tile: baseline plus the improvement's own
    /// per-turn yield (zero for natural or pillaged improvements).
    pub fn total_yield(&self) -> Yield {
        let mut y = self.base_yield;
        if let Some(imp) = &self.improvement {
            y += imp.per_turn_yield();
        }
        y
    }

    /// Movement cost for a class; zero means impassable.
    pub fn movement_cost(&self, class: MovementClass) -> u32 {
        self.terrain.movement_cost(class)
    }

    /// Adjust the visibility counter for a civ; discovery is latched the
    /// moment the counter becomes positive.
    pub fn set_visibility(&mut self, civ_id: CivId, on: bool) {
        let counter = self.visible_to.entry(civ_id).or_insert(0);
        if on {
            *counter += 1;
        } else {
            *counter -= 1;
        }
        if *counter > 0 {
            self.discovered_by.insert(civ_id);
        }
    }

    /// Drop a civ's visibility counter to zero (turn-start relight).
    pub fn clear_visibility(&mut self, civ_id: CivId) {
        self.visible_to.remove(&civ_id);
    }

    /// Is the tile inside any of the civ's active vision cones?
    pub fn is_visible_to(&self, civ_id: CivId) -> bool {
        self.visible_to.get(&civ_id).copied().unwrap_or(0) > 0
    }

    /// Has the civ ever seen this tile?
    pub fn is_discovered_by(&self, civ_id: CivId) -> bool {
        self.discovered_by.contains(&civ_id)
    }

    /// Can a city claim this tile? Owned tiles are never re-claimable
    /// without `overwrite`.
    pub fn can_settle(&self) -> bool {
        self.terrain.settleable() && self.owner.is_none()
    }

    /// Can an improvement be placed here?
    pub fn can_build(&self) -> bool {
        self.terrain.buildable()
    }
}

impl Default for Tile {
    fn default() -> Self {
        Self::new(Terrain::default())
    }
}
