//! Cities - named settlements owning a set of tiles.

use crate::hex::Coord;
use crate::types::{CityId, CivId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A city on the game map.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    /// Unique identifier.
    pub id: CityId,
    /// City name.
    pub name: String,
    /// Owning civilization.
    pub civ_id: CivId,
    /// Center coordinate.
    pub center: Coord,
    /// Tiles owned by this city. BTreeSet keeps exports deterministic.
    pub tiles: BTreeSet<Coord>,
}

impl City {
    /// Create a new city; tile ownership is applied separately through the
    /// map so the settleable gate runs per tile.
    pub fn new(id: CityId, name: String, civ_id: CivId, center: Coord) -> Self {
        Self {
            id,
            name,
            civ_id,
            center,
            tiles: BTreeSet::new(),
        }
    }

    /// Record a tile as owned by this city.
    pub fn add_tile(&mut self, coord: Coord) {
        self.tiles.insert(coord);
    }

    /// Does this city own the given tile?
    pub fn owns(&self, coord: &Coord) -> bool {
        self.tiles.contains(coord)
    }
}
