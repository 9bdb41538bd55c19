//! The world: map, civilizations, and the unit arena.
//!
//! Every player action funnels through a handler here. Handlers run all of
//! their predicate checks before any mutation; an illegal action is a silent
//! no-op. Unit moves keep the civ roster, the tile slot, and the visibility
//! counters in step with the light-off / relocate / light-on pattern.

use crate::civilization::Civilization;
use crate::errand::{ErrandAction, WorkErrand};
use crate::events::CivSummary;
use crate::hex::Coord;
use crate::improvement::ImprovementKind;
use crate::map::{Map, TRADE_ROUTE_RANGE};
use crate::types::{CivId, KnowledgeBranch, MovementClass, UnitId};
use crate::unit::{Unit, UnitKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Vision range used when a civ's visibility is rebuilt at turn start.
pub const TURN_VISION_RANGE: u32 = 3;

/// The complete simulation state below the player/transport layer.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct World {
    /// The game map (tiles, cities, traders).
    pub map: Map,
    /// All civilizations, by id.
    pub civs: BTreeMap<CivId, Civilization>,
    /// All units, by id.
    pub units: BTreeMap<UnitId, Unit>,
    /// Next available unit id.
    next_unit_id: UnitId,
    /// Completed turn count.
    pub turn_count: u32,
}

impl World {
    /// Create a world over a map with `civ_count` civilizations.
    pub fn new(map: Map, civ_count: u8) -> Self {
        let civs = (0..civ_count)
            .map(|id| (id, Civilization::new(id)))
            .collect();
        Self {
            map,
            civs,
            units: BTreeMap::new(),
            next_unit_id: 1,
            turn_count: 0,
        }
    }

    /// Per-civ display data for the `civData` event.
    pub fn civ_summaries(&self) -> BTreeMap<CivId, CivSummary> {
        self.civs
            .iter()
            .map(|(&id, civ)| {
                (
                    id,
                    CivSummary {
                        id,
                        color: civ.color.to_hex(),
                    },
                )
            })
            .collect()
    }

    /// Positions of a civ's placed units, in roster order.
    pub fn unit_positions(&self, civ_id: CivId) -> Vec<Coord> {
        let Some(civ) = self.civs.get(&civ_id) else {
            return Vec::new();
        };
        civ.units
            .iter()
            .filter_map(|id| self.units.get(id))
            .filter_map(|unit| unit.coords)
            .collect()
    }

    // =========================================================================
    // Unit lifecycle
    // =========================================================================

    /// Spawn a unit onto the map. Fails when the tile is missing, occupied,
    /// or impassable for the unit's movement class.
    pub fn spawn_unit(&mut self, civ_id: CivId, kind: UnitKind, c: Coord) -> Option<UnitId> {
        let coords = self.map.normalize(c)?;
        let tile = self.map.get(coords)?;
        if tile.unit.is_some() {
            return None;
        }
        let class = kind.stats().movement_class;
        if class != MovementClass::Air && tile.movement_cost(class) == 0 {
            return None;
        }
        if !self.civs.contains_key(&civ_id) {
            return None;
        }

        let id = self.next_unit_id;
        self.next_unit_id += 1;
        let mut unit = Unit::new(id, civ_id, kind);
        unit.coords = Some(coords);
        let vision = unit.vision_range();
        self.units.insert(id, unit);
        self.civs
            .get_mut(&civ_id)
            .expect("civ checked above")
            .add_unit(id);
        self.map
            .get_mut(coords)
            .expect("tile checked above")
            .unit = Some(id);
        self.map.light_cone(civ_id, coords, vision, true);
        self.map.tile_update(coords);
        Some(id)
    }

    /// Remove a unit from the world: tile slot, roster, vision, arena.
    pub fn remove_unit(&mut self, unit_id: UnitId) {
        let Some(unit) = self.units.remove(&unit_id) else {
            return;
        };
        if let Some(coords) = unit.coords {
            self.map.light_cone(unit.civ_id, coords, unit.vision_range(), false);
            if let Some(tile) = self.map.get_mut(coords) {
                if tile.unit == Some(unit_id) {
                    tile.unit = None;
                }
            }
            self.map.tile_update(coords);
        }
        if let Some(civ) = self.civs.get_mut(&unit.civ_id) {
            civ.remove_unit(unit_id);
        }
    }

    /// Move a unit to a reachable target tile.
    ///
    /// The target must be within the unit's remaining movement on the path
    /// tree for its movement class, and its slot must be free. Vision is
    /// carried over with light-off at the old cone and light-on at the new.
    pub fn move_unit(&mut self, civ_id: CivId, unit_id: UnitId, target: Coord) -> bool {
        let Some(unit) = self.units.get(&unit_id) else {
            return false;
        };
        if unit.civ_id != civ_id {
            return false;
        }
        let Some(from) = unit.coords else {
            return false;
        };
        let Some(to) = self.map.normalize(target) else {
            return false;
        };
        let Some(target_pos) = self.map.pos(to) else {
            return false;
        };
        if self.map.get(to).map_or(true, |t| t.unit.is_some()) {
            return false;
        }

        let mode = unit.movement_class();
        let vision = unit.vision_range();
        let budget = unit.movement;
        let tree = self.map.path_tree(from, budget, mode);
        let Some(&cost) = tree.dist.get(&target_pos) else {
            return false;
        };
        if cost == 0 {
            return false; // already there
        }

        self.map.light_cone(civ_id, from, vision, false);
        if let Some(tile) = self.map.get_mut(from) {
            tile.unit = None;
        }
        let unit = self.units.get_mut(&unit_id).expect("unit checked above");
        unit.coords = Some(to);
        unit.use_movement(cost);
        self.map
            .get_mut(to)
            .expect("target checked above")
            .unit = Some(unit_id);
        self.map.light_cone(civ_id, to, vision, true);
        self.map.tile_update(from);
        self.map.tile_update(to);
        true
    }

    /// Resolve an attack against the unit on `target`.
    ///
    /// Melee units strike adjacent tiles and take retaliation damage; ranged
    /// units need attack-mode line of sight within their attack range and
    /// strike one-way. Attacking consumes the rest of the turn's movement.
    pub fn attack(&mut self, civ_id: CivId, attacker_id: UnitId, target: Coord) -> bool {
        let Some(attacker) = self.units.get(&attacker_id) else {
            return false;
        };
        if attacker.civ_id != civ_id || !attacker.can_attack() || attacker.movement == 0 {
            return false;
        }
        let Some(from) = attacker.coords else {
            return false;
        };
        let Some(to) = self.map.normalize(target) else {
            return false;
        };
        let Some(target_pos) = self.map.pos(to) else {
            return false;
        };
        let Some(defender_id) = self.map.get(to).and_then(|t| t.unit) else {
            return false;
        };
        let Some(defender) = self.units.get(&defender_id) else {
            return false;
        };
        if defender.civ_id == civ_id {
            return false;
        }

        let attack_strength = attacker.effective_strength();
        let defense_strength = defender.effective_strength();
        let melee = match attacker.attack_range() {
            None => {
                let adjacent = from
                    .adjacent()
                    .iter()
                    .filter_map(|&c| self.map.pos(c))
                    .any(|pos| pos == target_pos);
                if !adjacent {
                    return false;
                }
                true
            }
            Some(range) => {
                let sight = self.map.visible_tiles(from, range);
                if !sight.iter().any(|&c| self.map.pos(c) == Some(target_pos)) {
                    return false;
                }
                false
            }
        };

        self.units
            .get_mut(&defender_id)
            .expect("defender checked above")
            .take_damage(attack_strength);
        let defender_dead = self.units[&defender_id].is_dead();
        if melee && !defender_dead {
            self.units
                .get_mut(&attacker_id)
                .expect("attacker checked above")
                .take_damage(defense_strength);
        }
        let attacker_dead = self.units[&attacker_id].is_dead();

        if defender_dead {
            self.remove_unit(defender_id);
        } else {
            self.map.tile_update(to);
        }
        if attacker_dead {
            self.remove_unit(attacker_id);
        } else {
            let attacker = self.units.get_mut(&attacker_id).expect("attacker alive");
            attacker.movement = 0;
            self.map.tile_update(from);
        }
        true
    }

    // =========================================================================
    // Economy handlers
    // =========================================================================

    /// Found a city with a settler standing on the tile; the settler is
    /// consumed.
    pub fn settle_city(&mut self, civ_id: CivId, c: Coord, name: &str) -> bool {
        let Some(coords) = self.map.normalize(c) else {
            return false;
        };
        let Some(settler_id) = self.map.get(coords).and_then(|t| t.unit) else {
            return false;
        };
        let settler_ok = self
            .units
            .get(&settler_id)
            .map_or(false, |u| u.civ_id == civ_id && u.kind == UnitKind::Settler);
        if !settler_ok || !self.map.can_settle_on(coords) {
            return false;
        }

        self.remove_unit(settler_id);
        self.map.settle_city_at(civ_id, coords, name).is_some()
    }

    /// Build an improvement on an owned tile.
    pub fn build_improvement(&mut self, civ_id: CivId, c: Coord, kind: ImprovementKind) -> bool {
        if !self.owns_tile(civ_id, c) || !self.map.can_build_on(c) {
            return false;
        }
        self.map.build_improvement_at(c, kind)
    }

    /// Start constructing `target` on an owned tile via a worksite errand,
    /// and route suppliers toward it.
    pub fn start_construction(
        &mut self,
        civ_id: CivId,
        c: Coord,
        target: ImprovementKind,
    ) -> bool {
        if !self.owns_tile(civ_id, c) || !self.map.can_build_on(c) {
            return false;
        }
        let cost = target.construction_cost();
        if cost.is_zero() {
            return false; // not constructible
        }
        if !self.map.start_construction_at(civ_id, c, target) {
            return false;
        }
        self.map
            .create_trade_routes(civ_id, c, cost, TRADE_ROUTE_RANGE, MovementClass::Land);
        true
    }

    /// Start training a unit at a settlement or encampment.
    pub fn train_unit(
        &mut self,
        civ_id: CivId,
        c: Coord,
        kind: UnitKind,
        location: Option<Coord>,
    ) -> bool {
        let cost = kind.training_cost();
        let errand = WorkErrand::new(ErrandAction::UnitTraining { kind }, civ_id, location);
        if !self.start_errand_at(civ_id, c, errand, |imp| imp.hosts_training()) {
            return false;
        }
        self.map
            .create_trade_routes(civ_id, c, cost, TRADE_ROUTE_RANGE, MovementClass::Land);
        true
    }

    /// Start a research errand at a campus.
    pub fn research(&mut self, civ_id: CivId, c: Coord, branch: KnowledgeBranch) -> bool {
        let errand = WorkErrand::new(ErrandAction::Research { branch }, civ_id, None);
        let cost = errand.cost;
        if !self.start_errand_at(civ_id, c, errand, |imp| imp.hosts_research()) {
            return false;
        }
        self.map
            .create_trade_routes(civ_id, c, cost, TRADE_ROUTE_RANGE, MovementClass::Land);
        true
    }

    fn start_errand_at<F>(&mut self, civ_id: CivId, c: Coord, errand: WorkErrand, host: F) -> bool
    where
        F: Fn(&ImprovementKind) -> bool,
    {
        if !self.owns_tile(civ_id, c) {
            return false;
        }
        let Some(imp) = self.map.get_mut(c).and_then(|t| t.improvement.as_mut()) else {
            return false;
        };
        if !host(&imp.kind) {
            return false;
        }
        imp.start_errand(errand)
    }

    fn owns_tile(&self, civ_id: CivId, c: Coord) -> bool {
        self.map
            .get(c)
            .and_then(|t| t.owner)
            .map_or(false, |o| o.civ_id == civ_id)
    }

    // =========================================================================
    // Turn lifecycle
    // =========================================================================

    /// Refresh a civ for its new turn: movement back to full.
    pub fn civ_new_turn(&mut self, civ_id: CivId) {
        let Some(civ) = self.civs.get_mut(&civ_id) else {
            return;
        };
        civ.turns_played += 1;
        let roster = civ.units.clone();
        for unit_id in roster {
            if let Some(unit) = self.units.get_mut(&unit_id) {
                unit.new_turn();
            }
        }
    }

    /// Rebuild a civ's visibility from scratch: clear every counter it
    /// holds, then relight from each placed unit with the turn vision range.
    pub fn update_civ_visibility(&mut self, civ_id: CivId) {
        self.map.clear_civ_visibility(civ_id);
        let cones: Vec<Coord> = self
            .civs
            .get(&civ_id)
            .map(|civ| {
                civ.units
                    .iter()
                    .filter_map(|id| self.units.get(id))
                    .filter_map(|unit| unit.coords)
                    .collect()
            })
            .unwrap_or_default();
        for origin in cones {
            self.map
                .light_cone(civ_id, origin, TURN_VISION_RANGE, true);
        }
    }

    /// Advance the simulation one turn: map economy first, then spawn the
    /// units whose training completed.
    pub fn turn(&mut self) {
        self.turn_count += 1;
        debug!(turn = self.turn_count, "advancing world");
        for spawn in self.map.turn() {
            if self.spawn_unit(spawn.civ_id, spawn.kind, spawn.coords).is_none() {
                warn!(
                    civ = spawn.civ_id,
                    coords = %spawn.coords,
                    "trained unit could not be placed, dropping"
                );
            }
        }
    }
}
