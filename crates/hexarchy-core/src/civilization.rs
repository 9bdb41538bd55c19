//! Civilizations - player-owned factions.

use crate::types::{CivColor, CivId, UnitId};
use serde::{Deserialize, Serialize};

/// A faction in the game, identified by a small integer id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Civilization {
    /// Unique identifier.
    pub id: CivId,
    /// Color for map display.
    pub color: CivColor,
    /// Roster of unit ids owned by this civ.
    pub units: Vec<UnitId>,
    /// Turns this civ has played.
    pub turns_played: u32,
}

impl Civilization {
    /// Create a new civilization with its default color.
    pub fn new(id: CivId) -> Self {
        Self {
            id,
            color: CivColor::default_for_civ(id),
            units: Vec::new(),
            turns_played: 0,
        }
    }

    /// Add a unit to the roster.
    pub fn add_unit(&mut self, unit_id: UnitId) {
        self.units.push(unit_id);
    }

    /// Remove a unit from the roster.
    pub fn remove_unit(&mut self, unit_id: UnitId) {
        self.units.retain(|&u| u != unit_id);
    }
}
