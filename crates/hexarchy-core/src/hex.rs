//! Hex coordinate system for the game map.
//!
//! Uses offset "odd-x" coordinates where odd columns are shifted relative to
//! even ones. The map is toroidal east/west: x wraps modulo the map width,
//! while y is bounds-checked and never wraps.

use serde::{Deserialize, Serialize};

/// Number of hex directions.
pub const DIRECTION_COUNT: u8 = 6;

/// Neighbor offsets per direction for even columns, clockwise from NE.
const EVEN_COLUMN_OFFSETS: [(i32, i32); 6] =
    [(1, -1), (1, 0), (0, 1), (-1, 0), (-1, -1), (0, -1)];

/// Neighbor offsets per direction for odd columns; the diagonals shift one
/// row south relative to even columns.
const ODD_COLUMN_OFFSETS: [(i32, i32); 6] =
    [(1, 0), (1, 1), (0, 1), (-1, 1), (-1, 0), (0, -1)];

/// Offset coordinates for the hex grid (odd-x).
///
/// - `x` is the column; it wraps modulo the map width
/// - `y` is the row; it does not wrap
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub struct Coord {
    /// Column coordinate
    pub x: i32,
    /// Row coordinate
    pub y: i32,
}

impl PartialOrd for Coord {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Coord {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Row-major ordering for deterministic iteration
        (self.y, self.x).cmp(&(other.y, other.x))
    }
}

impl Coord {
    /// Create a new coordinate.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Get all 6 neighboring coordinates, indexed by direction.
    ///
    /// Directions run clockwise: 0=NE, 1=E, 2=SE, 3=SW, 4=W, 5=NW. Results
    /// are raw offset coordinates; wrapping against a concrete map width
    /// happens in `Map`.
    pub fn adjacent(&self) -> [Coord; 6] {
        std::array::from_fn(|d| self.in_direction(d as i32))
    }

    /// Get the neighbor in direction `d`. `d` is taken modulo 6, so callers
    /// may pass `direction + 1` / `direction - 1` freely when fanning out.
    pub fn in_direction(&self, d: i32) -> Coord {
        let d = d.rem_euclid(DIRECTION_COUNT as i32) as usize;
        let (dx, dy) = if self.x & 1 == 0 {
            EVEN_COLUMN_OFFSETS[d]
        } else {
            ODD_COLUMN_OFFSETS[d]
        };
        Coord::new(self.x + dx, self.y + dy)
    }

    /// Hex distance to another coordinate (in steps, ignoring wrap).
    pub fn distance(&self, other: &Coord) -> u32 {
        let (aq, ar) = self.axial();
        let (bq, br) = other.axial();
        let dq = aq - bq;
        let dr = ar - br;
        ((dq.abs() + dr.abs() + (dq + dr).abs()) / 2) as u32
    }

    /// Axial coordinates (column, skewed row) for distance math; the row is
    /// de-staggered so every column shares one diagonal axis.
    fn axial(&self) -> (i32, i32) {
        (self.x, self.y - (self.x - (self.x & 1)) / 2)
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
