//! Core type aliases and small shared types.

use serde::{Deserialize, Serialize};

/// Civilization index (0-based, small).
pub type CivId = u8;

/// Unique identifier for a unit.
pub type UnitId = u64;

/// Unique identifier for a city.
pub type CityId = u64;

/// Unique identifier for a trader.
pub type TraderId = u64;

/// Knowledge branch identifier (e.g. "agriculture").
pub type KnowledgeBranch = String;

/// Movement mode of a unit, used by the pathfinding cost tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum MovementClass {
    #[default]
    Land,
    Water,
    Air,
}

/// RGB color for civilization identification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CivColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl CivColor {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Default colors for civs 0-7.
    pub const fn default_for_civ(civ_id: CivId) -> Self {
        match civ_id {
            0 => Self::new(255, 0, 0),     // Red
            1 => Self::new(0, 0, 255),     // Blue
            2 => Self::new(255, 255, 0),   // Yellow
            3 => Self::new(0, 255, 0),     // Green
            4 => Self::new(128, 0, 128),   // Purple
            5 => Self::new(255, 165, 0),   // Orange
            6 => Self::new(0, 255, 255),   // Cyan
            _ => Self::new(255, 192, 203), // Pink
        }
    }

    /// Convert to hex string (e.g., "#FF0000").
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl Default for CivColor {
    fn default() -> Self {
        Self::new(128, 128, 128) // Gray
    }
}
