//! The game map: tile storage and every spatial query the simulation needs.
//!
//! Tiles live in a flat row-major vector indexed by `pos = y*width + x mod
//! width`; the map is toroidal east/west (x wraps) and bounded north/south
//! (y does not). The map also owns the cities, the trader arena, and the
//! queue of tile-update notices drained when a turn's messages are composed.

use crate::city::City;
use crate::errand::{ErrandAction, WorkErrand};
use crate::events::{ImprovementData, TileData, UnitData};
use crate::hex::Coord;
use crate::improvement::{Improvement, ImprovementKind};
use crate::knowledge::{
    KNOWLEDGE_MAX_POINTS, KNOWLEDGE_SPILLOVER_DECAY, RESEARCH_KNOWLEDGE_POINTS,
};
use crate::terrain::Terrain;
use crate::tile::{Tile, TileOwner};
use crate::trader::{Route, Trader, TRADER_CAPACITY};
use crate::types::{CityId, CivId, MovementClass, TraderId, UnitId};
use crate::unit::{Unit, UnitKind};
use crate::yields::Yield;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use tracing::trace;

/// Default search range for trade-route discovery.
pub const TRADE_ROUTE_RANGE: u32 = 5;

/// A unit the map turn wants spawned (from a completed training errand).
/// The world owns the unit arena, so the spawn is handed back to it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnitSpawn {
    pub civ_id: CivId,
    pub kind: UnitKind,
    pub coords: Coord,
}

/// Result of a breadth-first movement-cost expansion from a source tile.
///
/// `parent` points one step closer to the source for every reached tile, so
/// walking parents from any leaf ends at the source.
#[derive(Clone, Debug, Default)]
pub struct PathTree {
    pub src: Coord,
    pub parent: BTreeMap<usize, Coord>,
    pub dist: BTreeMap<usize, u32>,
}

/// The game map.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Map {
    /// Map width in tiles.
    pub width: u32,
    /// Map height in tiles.
    pub height: u32,
    /// All tiles, row-major.
    pub tiles: Vec<Tile>,
    /// All cities, indexed by id.
    pub cities: BTreeMap<CityId, City>,
    /// All live traders.
    pub traders: Vec<Trader>,
    /// Next available city id.
    next_city_id: CityId,
    /// Next available trader id.
    next_trader_id: TraderId,
    /// Pending tile-update notices, in mutation order.
    #[serde(skip)]
    updates: Vec<Coord>,
}

impl Map {
    /// Create a map filled with a single terrain type.
    pub fn filled(width: u32, height: u32, terrain: Terrain) -> Self {
        let tiles = (0..(width as usize * height as usize))
            .map(|_| Tile::new(terrain))
            .collect();
        Self::from_tiles(width, height, tiles)
    }

    /// Create a map from pre-generated tiles (row-major, width*height).
    pub fn from_tiles(width: u32, height: u32, tiles: Vec<Tile>) -> Self {
        debug_assert_eq!(tiles.len(), width as usize * height as usize);
        Self {
            width,
            height,
            tiles,
            cities: BTreeMap::new(),
            traders: Vec::new(),
            next_city_id: 1,
            next_trader_id: 1,
            updates: Vec::new(),
        }
    }

    // =========================================================================
    // Coordinates and tile access
    // =========================================================================

    /// Normalize a coordinate: wrap x, bounds-check y.
    pub fn normalize(&self, c: Coord) -> Option<Coord> {
        if c.y < 0 || c.y >= self.height as i32 {
            return None;
        }
        Some(Coord::new(c.x.rem_euclid(self.width as i32), c.y))
    }

    /// Flat tile index for a coordinate.
    pub fn pos(&self, c: Coord) -> Option<usize> {
        let norm = self.normalize(c)?;
        Some(norm.y as usize * self.width as usize + norm.x as usize)
    }

    /// Coordinate of a flat tile index.
    pub fn coord_of(&self, pos: usize) -> Coord {
        Coord::new(
            (pos % self.width as usize) as i32,
            (pos / self.width as usize) as i32,
        )
    }

    /// Get a tile.
    pub fn get(&self, c: Coord) -> Option<&Tile> {
        let pos = self.pos(c)?;
        self.tiles.get(pos)
    }

    /// Get a tile mutably.
    pub fn get_mut(&mut self, c: Coord) -> Option<&mut Tile> {
        let pos = self.pos(c)?;
        self.tiles.get_mut(pos)
    }

    // =========================================================================
    // Update queue and per-civ views
    // =========================================================================

    /// Record that a tile's published state changed.
    pub fn tile_update(&mut self, c: Coord) {
        if let Some(norm) = self.normalize(c) {
            self.updates.push(norm);
        }
    }

    /// Drain the pending tile updates, in mutation order.
    pub fn drain_updates(&mut self) -> Vec<Coord> {
        std::mem::take(&mut self.updates)
    }

    /// Civ-facing snapshot of a tile: `None` while undiscovered, a full
    /// snapshot while visible, and a unit-less snapshot in between.
    pub fn civ_tile(
        &self,
        civ_id: CivId,
        c: Coord,
        units: &BTreeMap<UnitId, Unit>,
    ) -> Option<TileData> {
        let tile = self.get(c)?;
        if !tile.is_discovered_by(civ_id) {
            return None;
        }
        let visible = tile.is_visible_to(civ_id);
        let unit = if visible {
            tile.unit.and_then(|id| units.get(&id)).map(|u| UnitData {
                id: u.id,
                kind: u.kind,
                civ_id: u.civ_id,
                hp: u.hp,
            })
        } else {
            None
        };
        Some(TileData {
            terrain: tile.terrain,
            elevation: tile.elevation(),
            tile_yield: tile.total_yield(),
            improvement: tile.improvement.as_ref().map(|imp| ImprovementData {
                kind: imp.kind,
                pillaged: imp.pillaged,
            }),
            owner: tile.owner.map(|o| o.civ_id),
            unit,
            visible,
        })
    }

    /// Full per-civ map view, row-major, `None` for undiscovered tiles.
    pub fn civ_map(&self, civ_id: CivId, units: &BTreeMap<UnitId, Unit>) -> Vec<Option<TileData>> {
        (0..self.tiles.len())
            .map(|pos| self.civ_tile(civ_id, self.coord_of(pos), units))
            .collect()
    }

    // =========================================================================
    // Neighborhood expansion
    // =========================================================================

    /// Every coordinate reachable within `r` hex steps of `origin`,
    /// including the origin itself.
    pub fn neighbors_within(&self, origin: Coord, r: u32) -> Vec<Coord> {
        self.neighbors_within_filtered(origin, r, |_, _| true)
    }

    /// Filtered neighborhood expansion. The filter gates both inclusion of a
    /// tile and recursion through it.
    ///
    /// Expansion memoizes the best remaining range per tile and re-expands a
    /// tile only when revisited with more range left. The output order is
    /// the expansion order from the origin outward, not breadth-first order.
    pub fn neighbors_within_filtered<F>(&self, origin: Coord, r: u32, filter: F) -> Vec<Coord>
    where
        F: Fn(&Tile, Coord) -> bool,
    {
        let mut out = Vec::new();
        let mut range_map: HashMap<usize, u32> = HashMap::new();
        let mut stack = vec![(origin, r)];

        while let Some((coord, remaining)) = stack.pop() {
            let Some(norm) = self.normalize(coord) else {
                continue;
            };
            let pos = self.pos(norm).expect("normalized coord is indexable");
            if !filter(&self.tiles[pos], norm) {
                continue;
            }
            if let Some(&best) = range_map.get(&pos) {
                if best >= remaining {
                    continue;
                }
            } else {
                out.push(norm);
            }
            range_map.insert(pos, remaining);
            if remaining > 0 {
                for neighbor in norm.adjacent() {
                    stack.push((neighbor, remaining - 1));
                }
            }
        }
        out
    }

    // =========================================================================
    // Pathfinding
    // =========================================================================

    /// Breadth-first expansion of movement costs from `src`.
    ///
    /// Per-step costs come from the terrain table for `mode` (zero means
    /// impassable); Air moves at cost 1 everywhere. The search uses a FIFO
    /// queue and relaxes on strict improvement, which is adequate because
    /// per-step costs are small nonnegative integers. Only tiles with
    /// `dist <= range` are kept.
    pub fn path_tree(&self, src: Coord, range: u32, mode: MovementClass) -> PathTree {
        let mut tree = PathTree {
            src,
            ..Default::default()
        };
        let Some(src_norm) = self.normalize(src) else {
            return tree;
        };
        let src_pos = self.pos(src_norm).expect("normalized coord is indexable");
        tree.src = src_norm;
        tree.dist.insert(src_pos, 0);

        let mut queue = VecDeque::new();
        queue.push_back(src_norm);

        while let Some(coord) = queue.pop_front() {
            let pos = self.pos(coord).expect("queued coords are normalized");
            let here = tree.dist[&pos];
            for neighbor in coord.adjacent() {
                let Some(norm) = self.normalize(neighbor) else {
                    continue;
                };
                let npos = self.pos(norm).expect("normalized coord is indexable");
                let cost = match mode {
                    MovementClass::Air => 1,
                    _ => self.tiles[npos].movement_cost(mode),
                };
                if cost == 0 {
                    continue; // impassable
                }
                let next = here + cost;
                if next > range {
                    continue;
                }
                if next < tree.dist.get(&npos).copied().unwrap_or(u32::MAX) {
                    tree.dist.insert(npos, next);
                    tree.parent.insert(npos, coord);
                    queue.push_back(norm);
                }
            }
        }
        tree
    }

    /// Walk parent pointers from `src_pos` until the parent equals `target`,
    /// returning the coords from the first hop through the target. `None`
    /// when the chain never reaches the target.
    pub fn find_path(&self, tree: &PathTree, src_pos: usize, target: Coord) -> Option<Vec<Coord>> {
        let target_pos = self.pos(target)?;
        let mut path = Vec::new();
        let mut cur = src_pos;
        loop {
            let parent = *tree.parent.get(&cur)?;
            let parent_pos = self.pos(parent)?;
            path.push(parent);
            if parent_pos == target_pos {
                return Some(path);
            }
            cur = parent_pos;
        }
    }

    /// Full route from `src` to `target` through the tree, source included.
    /// Verifies that both endpoints resolve to the requested tiles; on any
    /// mismatch the route is discarded.
    pub fn find_route(&self, tree: &PathTree, src: Coord, target: Coord) -> Option<Route> {
        let src_norm = self.normalize(src)?;
        let src_pos = self.pos(src_norm)?;
        let mut path = self.find_path(tree, src_pos, target)?;
        path.insert(0, src_norm);

        let first = self.pos(*path.first()?)?;
        let last = self.pos(*path.last()?)?;
        if first != src_pos || last != self.pos(target)? {
            return None;
        }
        let distance = tree.dist.get(&src_pos).copied()?;
        Some(Route::new(path, distance))
    }

    // =========================================================================
    // Line of sight
    // =========================================================================

    /// Coordinates visible from `origin` out to `range`, with the default
    /// branch step length of 1 (a dense filled wedge per direction).
    pub fn visible_tiles(&self, origin: Coord, range: u32) -> Vec<Coord> {
        self.visible_tiles_with(origin, range, 1)
    }

    /// Hex raycast in six wedges.
    ///
    /// Per wedge a straight primary ray runs outward and, every
    /// `step_length` steps, spawns left/right branch rays that continue
    /// straight. Each ray carries a running elevation ceiling and a
    /// per-step slope; a tile is added only when its total elevation reaches
    /// the ceiling, and a blocker rising above the ceiling raises the slope
    /// to its excess, hiding lower ground behind it. Rays never stop at
    /// blockers, they just see less behind them.
    pub fn visible_tiles_with(&self, origin: Coord, range: u32, step_length: u32) -> Vec<Coord> {
        struct Ray {
            coord: Coord,
            dir: i32,
            remaining: u32,
            ceiling: i32,
            slope: i32,
            branching: bool,
            since_branch: u32,
        }

        let mut out = Vec::new();
        let mut seen: HashSet<usize> = HashSet::new();
        let Some(origin_norm) = self.normalize(origin) else {
            return out;
        };
        let origin_pos = self.pos(origin_norm).expect("normalized coord is indexable");
        seen.insert(origin_pos);
        out.push(origin_norm);

        let step_length = step_length.max(1);
        let mut rays: Vec<Ray> = (0..6)
            .map(|d| Ray {
                coord: origin_norm,
                dir: d,
                remaining: range,
                ceiling: 0,
                slope: 0,
                branching: true,
                since_branch: 0,
            })
            .collect();

        while let Some(mut ray) = rays.pop() {
            while ray.remaining > 0 {
                let Some(next) = self.normalize(ray.coord.in_direction(ray.dir)) else {
                    break;
                };
                ray.coord = next;
                ray.remaining -= 1;
                ray.ceiling += ray.slope;

                let pos = self.pos(next).expect("normalized coord is indexable");
                let elevation = self.tiles[pos].elevation();
                if elevation >= ray.ceiling {
                    if seen.insert(pos) {
                        out.push(next);
                    }
                    if elevation > ray.ceiling {
                        ray.slope = ray.slope.max(elevation - ray.ceiling);
                    }
                }

                if ray.branching {
                    ray.since_branch += 1;
                    if ray.since_branch >= step_length {
                        ray.since_branch = 0;
                        for side in [-1, 1] {
                            rays.push(Ray {
                                coord: ray.coord,
                                dir: ray.dir + side,
                                remaining: ray.remaining,
                                ceiling: ray.ceiling,
                                slope: ray.slope,
                                branching: false,
                                since_branch: 0,
                            });
                        }
                    }
                }
            }
        }
        out
    }

    // =========================================================================
    // Visibility bookkeeping
    // =========================================================================

    /// Adjust one tile's visibility counter for a civ.
    pub fn set_tile_visibility(&mut self, civ_id: CivId, c: Coord, on: bool) {
        if let Some(tile) = self.get_mut(c) {
            tile.set_visibility(civ_id, on);
        }
    }

    /// Light every tile in a vision cone on or off.
    pub fn light_cone(&mut self, civ_id: CivId, origin: Coord, range: u32, on: bool) {
        for coord in self.visible_tiles(origin, range) {
            self.set_tile_visibility(civ_id, coord, on);
        }
    }

    /// Drop every visibility counter a civ holds (turn-start relight).
    pub fn clear_civ_visibility(&mut self, civ_id: CivId) {
        for tile in &mut self.tiles {
            tile.clear_visibility(civ_id);
        }
    }

    // =========================================================================
    // Action gates and settlement
    // =========================================================================

    /// Can a city be founded here? Excludes water, mountains, rivers, and
    /// any tile already owned.
    pub fn can_settle_on(&self, c: Coord) -> bool {
        self.get(c).map_or(false, |tile| tile.can_settle())
    }

    /// Can an improvement be built here? Excludes deep water and mountains.
    pub fn can_build_on(&self, c: Coord) -> bool {
        self.get(c).map_or(false, |tile| tile.can_build())
    }

    /// Found a city: claim the center and its neighbors, and place the
    /// settlement improvement. Returns `None` when the settle gate fails.
    pub fn settle_city_at(&mut self, civ_id: CivId, c: Coord, name: &str) -> Option<CityId> {
        let center = self.normalize(c)?;
        if !self.can_settle_on(center) {
            return None;
        }
        let city_id = self.next_city_id;
        self.next_city_id += 1;
        self.cities
            .insert(city_id, City::new(city_id, name.to_string(), civ_id, center));

        self.set_tile_owner(city_id, civ_id, center, false);
        for neighbor in center.adjacent() {
            self.set_tile_owner(city_id, civ_id, neighbor, false);
        }
        self.build_improvement_at(center, ImprovementKind::Settlement);
        Some(city_id)
    }

    /// Assign a tile to a city. Without `overwrite`, owned tiles keep their
    /// owner; non-settleable tiles are never claimed.
    pub fn set_tile_owner(
        &mut self,
        city_id: CityId,
        civ_id: CivId,
        c: Coord,
        overwrite: bool,
    ) -> bool {
        let Some(norm) = self.normalize(c) else {
            return false;
        };
        let Some(tile) = self.get_mut(norm) else {
            return false;
        };
        if !tile.terrain.settleable() {
            return false;
        }
        if tile.owner.is_some() && !overwrite {
            return false;
        }
        tile.owner = Some(TileOwner { civ_id, city_id });
        if let Some(city) = self.cities.get_mut(&city_id) {
            city.add_tile(norm);
        }
        self.tile_update(norm);
        true
    }

    /// Place an improvement, replacing any prior one. Returns false when the
    /// build gate fails.
    pub fn build_improvement_at(&mut self, c: Coord, kind: ImprovementKind) -> bool {
        if !self.can_build_on(c) {
            return false;
        }
        if let Some(tile) = self.get_mut(c) {
            tile.improvement = Some(Improvement::new(kind));
            self.tile_update(c);
            true
        } else {
            false
        }
    }

    /// Start a construction errand: place a worksite, then attach the errand
    /// for the target improvement.
    pub fn start_construction_at(
        &mut self,
        civ_id: CivId,
        c: Coord,
        target: ImprovementKind,
    ) -> bool {
        if !self.build_improvement_at(c, ImprovementKind::Worksite) {
            return false;
        }
        let errand = WorkErrand::new(ErrandAction::Construction { kind: target }, civ_id, None);
        self.get_mut(c)
            .and_then(|tile| tile.improvement.as_mut())
            .map_or(false, |imp| imp.start_errand(errand))
    }

    // =========================================================================
    // Trade routes
    // =========================================================================

    /// Create traders feeding `requirement` into the improvement at
    /// `sink_coords`, from every civ-owned supplier reachable within
    /// `range`. Suppliers closest to the sink are routed first. Candidates
    /// whose route cannot be verified are skipped.
    pub fn create_trade_routes(
        &mut self,
        civ_id: CivId,
        sink_coords: Coord,
        requirement: Yield,
        range: u32,
        mode: MovementClass,
    ) {
        let Some(sink_norm) = self.normalize(sink_coords) else {
            return;
        };
        let Some(sink_pos) = self.pos(sink_norm) else {
            return;
        };
        let tree = self.path_tree(sink_norm, range, mode);

        let mut reachable: Vec<(u32, usize)> = tree
            .dist
            .iter()
            .map(|(&pos, &dist)| (dist, pos))
            .collect();
        reachable.sort_unstable();

        for (_, pos) in reachable {
            if pos == sink_pos {
                continue;
            }
            let coord = self.coord_of(pos);
            let tile = &self.tiles[pos];
            let owned = tile.owner.map_or(false, |o| o.civ_id == civ_id);
            let supplies = tile
                .improvement
                .as_ref()
                .map_or(false, |imp| imp.can_supply(&requirement));
            if !owned || !supplies {
                continue;
            }
            let Some(route) = self.find_route(&tree, coord, sink_norm) else {
                trace!(%coord, "trade route candidate skipped: no verifiable route");
                continue;
            };
            let trader_id = self.next_trader_id;
            self.next_trader_id += 1;
            let capacity = TRADER_CAPACITY.min(&requirement);
            self.traders
                .push(Trader::new(trader_id, civ_id, route, capacity));
            if let Some(imp) = self.tiles[pos].improvement.as_mut() {
                imp.traders.push(trader_id);
            }
            if let Some(imp) = self.tiles[sink_pos].improvement.as_mut() {
                imp.suppliers.push(trader_id);
            }
        }
    }

    fn trader_index(&self, id: TraderId) -> Option<usize> {
        self.traders.iter().position(|t| t.id == id)
    }

    fn expire_trader(&mut self, id: TraderId) {
        if let Some(idx) = self.trader_index(id) {
            self.traders[idx].expire();
        }
    }

    // =========================================================================
    // Per-turn progression
    // =========================================================================

    /// Advance the whole map by one turn: tick every improvement, apply
    /// completed errands, spread knowledge, move traders, reap the expired.
    /// Unit-training completions are returned for the world to spawn.
    pub fn turn(&mut self) -> Vec<UnitSpawn> {
        let completions = self.tick_improvements();
        let mut spawns = Vec::new();
        for (coords, errand) in completions {
            match errand.action {
                ErrandAction::Construction { kind } => {
                    self.build_improvement_at(coords, kind);
                }
                ErrandAction::Research { ref branch } => {
                    if let Some(tile) = self.get_mut(coords) {
                        tile.knowledge
                            .add(branch, RESEARCH_KNOWLEDGE_POINTS, 0.0, KNOWLEDGE_MAX_POINTS);
                    }
                }
                ErrandAction::UnitTraining { kind } => {
                    spawns.push(UnitSpawn {
                        civ_id: errand.civ_id,
                        kind,
                        coords: errand.location.unwrap_or(coords),
                    });
                }
            }
        }
        self.spread_knowledge();
        self.advance_traders();
        self.traders.retain(|t| !t.expired);
        spawns
    }

    /// Run the work sequence on every improvement; completed errands are
    /// detached and returned with their tile coordinate.
    fn tick_improvements(&mut self) -> Vec<(Coord, WorkErrand)> {
        let mut completed = Vec::new();
        for pos in 0..self.tiles.len() {
            let Some(mut imp) = self.tiles[pos].improvement.take() else {
                continue;
            };
            // 1. completion check; suppliers of a finished errand expire
            for supplier in imp.check_completion() {
                self.expire_trader(supplier);
            }
            // 2. a fresh turn of deliveries starts now
            if let Some(errand) = imp.errand.as_mut() {
                errand.stored_this_turn = Yield::zero();
            }
            // 3. share the store among live outbound traders at the producer
            self.distribute_to_traders(&mut imp);
            // 4.+5. own yield in, cap to capacity
            imp.accrue();

            let coords = self.coord_of(pos);
            if imp.errand_completed() {
                let errand = imp.errand.take().expect("completed errand is present");
                completed.push((coords, errand));
                self.tile_update(coords);
            }
            self.tiles[pos].improvement = Some(imp);
        }
        completed
    }

    /// Split the improvement's store among its live traders that are
    /// currently loading at the producer; expired entries are pruned.
    fn distribute_to_traders(&mut self, imp: &mut Improvement) {
        let live: Vec<TraderId> = imp
            .traders
            .iter()
            .copied()
            .filter(|&id| {
                self.trader_index(id)
                    .map_or(false, |idx| !self.traders[idx].expired)
            })
            .collect();
        let mut remaining = live.len() as u32;
        for id in &live {
            let share = imp.store.div_number(remaining);
            let idx = self.trader_index(*id).expect("live trader exists");
            let surplus = self.traders[idx].store(share);
            imp.store.deduct(&(share - surplus));
            remaining -= 1;
        }
        imp.traders = live;
    }

    /// End-of-turn knowledge spillover: every branch still below its cap
    /// emits its points to the six neighbors with one step of decay;
    /// branches already at the cap stay put, and receivers at their cap
    /// ignore the emission.
    fn spread_knowledge(&mut self) {
        let mut emissions: Vec<(usize, String, u32)> = Vec::new();
        for pos in 0..self.tiles.len() {
            if self.tiles[pos].knowledge.is_empty() {
                continue;
            }
            let coord = self.coord_of(pos);
            for neighbor in coord.adjacent() {
                let Some(npos) = self.pos(neighbor) else {
                    continue;
                };
                for (branch, &points) in self.tiles[pos].knowledge.iter() {
                    if points >= KNOWLEDGE_MAX_POINTS {
                        continue;
                    }
                    emissions.push((npos, branch.clone(), points));
                }
            }
        }
        for (npos, branch, points) in emissions {
            self.tiles[npos].knowledge.add(
                &branch,
                points,
                KNOWLEDGE_SPILLOVER_DECAY,
                KNOWLEDGE_MAX_POINTS,
            );
        }
    }

    /// Move every trader one turn along its route and deposit deliveries at
    /// the sinks. Traders whose endpoints no longer hold up expire instead
    /// of moving.
    fn advance_traders(&mut self) {
        // expiry pre-pass: endpoint improvements must still exist, and the
        // sink must still be waiting on an errand
        let mut expire: Vec<TraderId> = Vec::new();
        for trader in &self.traders {
            if trader.expired {
                continue;
            }
            let producer_alive = self
                .get(trader.route.producer())
                .and_then(|t| t.improvement.as_ref())
                .is_some();
            let sink_needs = self
                .get(trader.route.sink())
                .and_then(|t| t.improvement.as_ref())
                .and_then(|imp| imp.errand.as_ref())
                .map_or(false, |errand| !errand.completed);
            if !producer_alive || !sink_needs {
                expire.push(trader.id);
            }
        }
        for id in expire {
            self.expire_trader(id);
        }

        let mut deliveries: Vec<(Coord, Yield)> = Vec::new();
        for trader in &mut self.traders {
            if trader.expired {
                continue;
            }
            let delivered = trader.shunt();
            if !delivered.is_zero() {
                deliveries.push((trader.route.sink(), delivered));
            }
        }
        for (sink, delivered) in deliveries {
            if let Some(imp) = self.get_mut(sink).and_then(|t| t.improvement.as_mut()) {
                let overflow = imp.store.incr(delivered);
                if let Some(errand) = imp.errand.as_mut() {
                    errand.stored_this_turn += delivered - overflow;
                }
            }
        }
    }
}
