//! Terrain types for the game map.
//!
//! Every table here is a compile-time const fn so terrain data stays
//! read-only after construction.

use crate::types::MovementClass;
use crate::yields::Yield;
use serde::{Deserialize, Serialize};

/// Base terrain type for a tile. Closed set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Terrain {
    #[default]
    Grassland,
    Plains,
    Desert,
    Tundra,
    Mountain,
    River,
    Coastal,
    FrozenCoastal,
    Ocean,
    FrozenOcean,
}

impl Terrain {
    /// Get the base yield for this terrain type.
    pub const fn base_yield(&self) -> Yield {
        match self {
            Terrain::Grassland => Yield::new(2, 0, 0, 0),
            Terrain::Plains => Yield::new(1, 1, 0, 0),
            Terrain::Desert => Yield::zero(),
            Terrain::Tundra => Yield::new(1, 0, 0, 0),
            Terrain::Mountain => Yield::zero(),
            Terrain::River => Yield::new(2, 0, 0, 1),
            Terrain::Coastal => Yield::new(1, 0, 0, 1),
            Terrain::FrozenCoastal => Yield::zero(),
            Terrain::Ocean => Yield::new(1, 0, 0, 0),
            Terrain::FrozenOcean => Yield::zero(),
        }
    }

    /// Elevation contributed by the terrain itself. Flat walkable ground sits
    /// at zero so line-of-sight rays stay level across it; only mountains
    /// rise into the sight ceiling.
    pub const fn height(&self) -> i32 {
        match self {
            Terrain::Mountain => 4,
            _ => 0,
        }
    }

    /// Movement cost for a movement class. Zero means impassable.
    pub const fn movement_cost(&self, class: MovementClass) -> u32 {
        match class {
            MovementClass::Land => match self {
                Terrain::Grassland | Terrain::Plains | Terrain::Desert => 1,
                Terrain::Tundra => 2,
                Terrain::River => 3,
                Terrain::Mountain
                | Terrain::Coastal
                | Terrain::FrozenCoastal
                | Terrain::Ocean
                | Terrain::FrozenOcean => 0,
            },
            MovementClass::Water => match self {
                Terrain::Coastal | Terrain::Ocean | Terrain::River => 1,
                Terrain::FrozenCoastal | Terrain::FrozenOcean => 2,
                _ => 0,
            },
            // Air cost is uniform; the path tree special-cases it anyway.
            MovementClass::Air => 1,
        }
    }

    /// Check if this is a water terrain type.
    pub const fn is_water(&self) -> bool {
        matches!(
            self,
            Terrain::Coastal | Terrain::FrozenCoastal | Terrain::Ocean | Terrain::FrozenOcean
        )
    }

    /// Can a city claim this tile? Excludes all water, mountains and rivers.
    pub const fn settleable(&self) -> bool {
        matches!(
            self,
            Terrain::Grassland | Terrain::Plains | Terrain::Desert | Terrain::Tundra
        )
    }

    /// Can an improvement be built here? Excludes deep water and mountains.
    pub const fn buildable(&self) -> bool {
        !matches!(
            self,
            Terrain::Ocean | Terrain::FrozenOcean | Terrain::Mountain
        )
    }

    /// Get all terrain variants.
    pub const fn all() -> &'static [Terrain] {
        &[
            Terrain::Grassland,
            Terrain::Plains,
            Terrain::Desert,
            Terrain::Tundra,
            Terrain::Mountain,
            Terrain::River,
            Terrain::Coastal,
            Terrain::FrozenCoastal,
            Terrain::Ocean,
            Terrain::FrozenOcean,
        ]
    }
}
