//! Deterministic map generation.
//!
//! The generator is fully seeded: the same seed and config always produce
//! the same map, so a server can recreate a game world from its settings
//! alone.

use crate::hex::Coord;
use crate::improvement::{Improvement, ImprovementKind};
use crate::map::Map;
use crate::terrain::Terrain;
use crate::tile::Tile;

/// Deterministic counter-based generator (splitmix64) for map generation.
///
/// Not cryptographically secure - only used for reproducible worldgen. A
/// counter-based generator has no weak states, so any folded seed (all
/// zeros included) is fine as-is.
#[derive(Clone, Debug)]
pub struct SeededRng {
    state: u64,
}

impl SeededRng {
    /// Create a new RNG from a 32-byte seed, folded a word at a time with
    /// rotation so every byte influences the stream.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let mut state = 0u64;
        for chunk in seed.chunks_exact(8) {
            let word = u64::from_le_bytes(chunk.try_into().expect("chunk is 8 bytes"));
            state = state.rotate_left(17) ^ word;
        }
        Self { state }
    }

    /// Generate next random u64.
    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Generate a random number in range [0, max).
    pub fn next_range(&mut self, max: u32) -> u32 {
        if max == 0 {
            return 0;
        }
        (self.next_u64() % max as u64) as u32
    }

    /// Generate a random float in range [0.0, 1.0).
    pub fn next_f32(&mut self) -> f32 {
        ((self.next_u64() >> 11) as f64 / (1u64 << 53) as f64) as f32
    }
}

/// Configuration for the map generator.
#[derive(Clone, Debug)]
pub struct MapGenConfig {
    pub width: u32,
    pub height: u32,
    /// Fraction of the map kept as land, roughly.
    pub land_fraction: f32,
    /// Chance of a mountain on any land tile.
    pub mountain_chance: f32,
    /// Chance of a forest improvement on any open land tile.
    pub forest_chance: f32,
}

impl Default for MapGenConfig {
    fn default() -> Self {
        Self {
            width: 40,
            height: 25,
            land_fraction: 0.4,
            mountain_chance: 0.06,
            forest_chance: 0.12,
        }
    }
}

/// Generates game maps from a seed.
pub struct MapGenerator {
    rng: SeededRng,
    config: MapGenConfig,
}

impl MapGenerator {
    /// Create a new map generator with the given seed and config.
    pub fn new(seed: [u8; 32], config: MapGenConfig) -> Self {
        Self {
            rng: SeededRng::from_seed(&seed),
            config,
        }
    }

    /// Generate a complete map.
    pub fn generate(&mut self) -> Map {
        let width = self.config.width;
        let height = self.config.height;
        let mut terrain = vec![Terrain::Ocean; (width * height) as usize];

        self.grow_continents(&mut terrain);
        self.assign_climate(&mut terrain);
        self.trace_coastlines(&mut terrain);

        let tiles: Vec<Tile> = terrain
            .iter()
            .map(|&t| {
                let mut tile = Tile::new(t);
                if t.settleable() && self.rng.next_f32() < self.config.forest_chance {
                    tile.improvement = Some(Improvement::new(ImprovementKind::Forest));
                }
                tile
            })
            .collect();

        Map::from_tiles(width, height, tiles)
    }

    /// Phase 1: seed continent cores and grow land around them with random
    /// walks until the land budget is spent.
    fn grow_continents(&mut self, terrain: &mut [Terrain]) {
        let width = self.config.width;
        let height = self.config.height;
        let total = (width * height) as usize;
        let budget = ((total as f32) * self.config.land_fraction) as usize;
        let cores = 2 + (total / 500).min(4);

        let mut placed = 0;
        for _ in 0..cores {
            // keep cores off the polar rows so climate bands stay coherent
            let x = self.rng.next_range(width) as i32;
            let y = 2 + self.rng.next_range(height.saturating_sub(4).max(1)) as i32;
            let mut cursor = Coord::new(x, y);
            let steps = budget / cores;
            for _ in 0..steps {
                let pos = self.index(cursor);
                if terrain[pos] == Terrain::Ocean {
                    terrain[pos] = Terrain::Grassland;
                    placed += 1;
                }
                cursor = self.wander(cursor);
                if placed >= budget {
                    return;
                }
            }
        }
    }

    /// Phase 2: replace the placeholder land with climate-banded terrain,
    /// plus scattered mountains and rivers.
    fn assign_climate(&mut self, terrain: &mut [Terrain]) {
        let width = self.config.width;
        let height = self.config.height;
        for y in 0..height {
            let latitude = {
                // 0 at the equator, 1 at the poles
                let half = (height as f32 - 1.0) / 2.0;
                ((y as f32 - half).abs() / half).min(1.0)
            };
            for x in 0..width {
                let pos = (y * width + x) as usize;
                if terrain[pos] != Terrain::Grassland {
                    continue;
                }
                let roll = self.rng.next_f32();
                terrain[pos] = if roll < self.config.mountain_chance {
                    Terrain::Mountain
                } else if roll < self.config.mountain_chance + 0.03 {
                    Terrain::River
                } else if latitude > 0.8 {
                    Terrain::Tundra
                } else if latitude < 0.25 && roll > 0.7 {
                    Terrain::Desert
                } else if roll > 0.55 {
                    Terrain::Plains
                } else {
                    Terrain::Grassland
                };
            }
        }
    }

    /// Phase 3: ocean tiles touching land become coastal water, frozen at
    /// polar latitudes.
    fn trace_coastlines(&mut self, terrain: &mut [Terrain]) {
        let width = self.config.width;
        let height = self.config.height;
        let mut coastal = Vec::new();
        for y in 0..height as i32 {
            for x in 0..width as i32 {
                let coord = Coord::new(x, y);
                let pos = self.index(coord);
                if terrain[pos] != Terrain::Ocean && terrain[pos] != Terrain::FrozenOcean {
                    continue;
                }
                let touches_land = coord
                    .adjacent()
                    .iter()
                    .any(|&n| self.contains(n) && !terrain[self.index(n)].is_water());
                if touches_land {
                    coastal.push((pos, y));
                }
            }
        }
        let polar = (height as f32 * 0.1).ceil() as i32;
        for (pos, y) in coastal {
            let frozen = y < polar || y >= height as i32 - polar;
            terrain[pos] = if frozen {
                Terrain::FrozenCoastal
            } else {
                Terrain::Coastal
            };
        }
    }

    fn wander(&mut self, from: Coord) -> Coord {
        let dir = self.rng.next_range(6) as i32;
        let next = from.in_direction(dir);
        if self.contains(next) {
            self.clamp(next)
        } else {
            from
        }
    }

    fn contains(&self, c: Coord) -> bool {
        c.y >= 0 && c.y < self.config.height as i32
    }

    fn clamp(&self, c: Coord) -> Coord {
        Coord::new(c.x.rem_euclid(self.config.width as i32), c.y)
    }

    fn index(&self, c: Coord) -> usize {
        let norm = self.clamp(c);
        (norm.y as u32 * self.config.width + norm.x as u32) as usize
    }
}
