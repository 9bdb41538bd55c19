//! The game wrapper: world + seated players + turn broadcast.
//!
//! This is the outermost simulation object: it owns the [`World`], the seats
//! binding civs to transports, and the turn lifecycle that composes per-civ
//! update batches. It is also the unit of persistence; see [`Game::export`]
//! and [`Game::import`].

use crate::events::{update_message, Event};
use crate::hex::Coord;
use crate::player::Player;
use crate::types::CivId;
use crate::world::World;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

/// Errors from seating players and starting the game.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameError {
    GameAlreadyStarted,
    TooManyPlayers,
    UnknownCiv,
    CivAlreadySeated,
}

impl std::fmt::Display for GameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameError::GameAlreadyStarted => write!(f, "Game has already started"),
            GameError::TooManyPlayers => write!(f, "All seats are taken"),
            GameError::UnknownCiv => write!(f, "No such civilization"),
            GameError::CivAlreadySeated => write!(f, "Civilization already has a player"),
        }
    }
}

impl std::error::Error for GameError {}

/// Errors from snapshot import. Fatal at load time; no partial state is
/// ever published.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SaveError {
    /// The snapshot is not valid JSON for the expected shape.
    Parse(String),
    /// The snapshot parsed but cannot be reconstructed into a consistent
    /// simulation.
    Mismatch(String),
}

impl std::fmt::Display for SaveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveError::Parse(e) => write!(f, "Snapshot parse error: {}", e),
            SaveError::Mismatch(e) => write!(f, "Snapshot mismatch: {}", e),
        }
    }
}

impl std::error::Error for SaveError {}

/// Snapshot metadata.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameMeta {
    /// Display name for the game.
    pub game_name: String,
}

/// A running game.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    /// The simulation state.
    pub world: World,
    /// Seated players, one per controlled civ.
    pub players: Vec<Player>,
    /// Number of seats this game was created with.
    pub player_count: u8,
    /// Snapshot metadata.
    #[serde(rename = "metaData")]
    pub meta: GameMeta,
    /// Set once `start` has run.
    pub has_started: bool,
}

impl Game {
    /// Create a game over a world. Seats start empty.
    pub fn new(world: World, game_name: String, player_count: u8) -> Self {
        Self {
            world,
            players: Vec::new(),
            player_count,
            meta: GameMeta { game_name },
            has_started: false,
        }
    }

    /// Seat a player. The civ must exist and be unseated.
    pub fn seat_player(&mut self, player: Player) -> Result<(), GameError> {
        if self.players.len() >= self.player_count as usize {
            return Err(GameError::TooManyPlayers);
        }
        if !self.world.civs.contains_key(&player.civ_id) {
            return Err(GameError::UnknownCiv);
        }
        if self.players.iter().any(|p| p.civ_id == player.civ_id) {
            return Err(GameError::CivAlreadySeated);
        }
        self.players.push(player);
        Ok(())
    }

    /// Convert a player's seat to AI after a disconnect. The civ keeps
    /// ticking and no in-flight action is rolled back.
    pub fn disconnect_player(&mut self, civ_id: CivId) {
        if let Some(player) = self.players.iter_mut().find(|p| p.civ_id == civ_id) {
            player.disconnect();
            debug!(civ = civ_id, "player disconnected, seat converted to AI");
        }
    }

    /// Send a batch of events to one civ's player, if any is seated.
    pub fn send_to_civ(&mut self, civ_id: CivId, events: &[Event]) {
        let Some(player) = self.players.iter_mut().find(|p| p.civ_id == civ_id) else {
            warn!(civ = civ_id, "no player seated for civ, dropping message");
            return;
        };
        player.send(update_message(events));
    }

    /// Start the game: announce it to every human seat and run the first
    /// turn start for each.
    pub fn start(&mut self) {
        self.has_started = true;
        let announce = [
            Event::BeginGame {
                width: self.world.map.width,
                height: self.world.map.height,
                player_count: self.player_count,
            },
            Event::CivData(self.world.civ_summaries()),
        ];
        for civ_id in self.human_civs() {
            self.send_to_civ(civ_id, &announce);
        }
        let updates = self.world.map.drain_updates();
        for civ_id in self.human_civs() {
            self.begin_turn(civ_id, &updates);
        }
    }

    /// Finish the current turn and start the next one.
    ///
    /// Sequence: `endTurn` to every human seat; the world advances (AI
    /// actions would run between the two, outside the core); then each human
    /// seat gets its pending tile updates, a fresh map, and `beginTurn`.
    pub fn end_turn(&mut self) {
        for civ_id in self.human_civs() {
            self.send_to_civ(civ_id, &[Event::EndTurn]);
        }
        self.world.turn();
        let updates = self.world.map.drain_updates();
        for civ_id in self.human_civs() {
            self.begin_turn(civ_id, &updates);
        }
    }

    /// Start a civ's turn: refresh its units, rebuild its visibility, then
    /// send any pending tile updates followed by the full map and
    /// `beginTurn`.
    pub fn begin_turn(&mut self, civ_id: CivId, updates: &[Coord]) {
        self.world.civ_new_turn(civ_id);
        self.world.update_civ_visibility(civ_id);

        let mut events = Vec::with_capacity(updates.len() + 3);
        for &coords in updates {
            events.push(Event::TileUpdate {
                coords,
                tile: self.world.map.civ_tile(civ_id, coords, &self.world.units),
            });
        }
        events.push(Event::SetMap(
            self.world.map.civ_map(civ_id, &self.world.units),
        ));
        events.push(Event::UnitPositions(self.world.unit_positions(civ_id)));
        events.push(Event::BeginTurn);
        self.send_to_civ(civ_id, &events);
    }

    fn human_civs(&self) -> Vec<CivId> {
        self.players
            .iter()
            .filter(|p| !p.is_ai)
            .map(|p| p.civ_id)
            .collect()
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Export the full game snapshot as JSON.
    pub fn export(&self) -> Value {
        serde_json::to_value(self).expect("game state serializes")
    }

    /// Import a snapshot produced by `export`, rebuilding the runtime links
    /// that are not serialized: tile owners from each city's owned set, and
    /// trader subscriptions from each route's endpoints.
    pub fn import(value: Value) -> Result<Game, SaveError> {
        let mut game: Game =
            serde_json::from_value(value).map_err(|e| SaveError::Parse(e.to_string()))?;
        game.rebuild()?;
        Ok(game)
    }

    fn rebuild(&mut self) -> Result<(), SaveError> {
        let map = &self.world.map;
        let expected = map.width as usize * map.height as usize;
        if map.tiles.len() != expected {
            return Err(SaveError::Mismatch(format!(
                "tile count {} does not match {}x{} map",
                map.tiles.len(),
                map.width,
                map.height
            )));
        }
        for player in &self.players {
            if !self.world.civs.contains_key(&player.civ_id) {
                return Err(SaveError::Mismatch(format!(
                    "player {} references unknown civ {}",
                    player.name, player.civ_id
                )));
            }
        }

        // re-run tile ownership from each city's owned set
        let claims: Vec<(crate::types::CityId, CivId, Vec<Coord>)> = self
            .world
            .map
            .cities
            .iter()
            .map(|(&id, city)| (id, city.civ_id, city.tiles.iter().copied().collect()))
            .collect();
        for (city_id, civ_id, coords) in claims {
            for coord in coords {
                self.world.map.set_tile_owner(city_id, civ_id, coord, false);
            }
        }

        // reattach traders to the improvements at their route endpoints
        let endpoints: Vec<(crate::types::TraderId, Coord, Coord)> = self
            .world
            .map
            .traders
            .iter()
            .map(|t| (t.id, t.route.producer(), t.route.sink()))
            .collect();
        for (trader_id, producer, sink) in endpoints {
            let producer_imp = self
                .world
                .map
                .get_mut(producer)
                .and_then(|t| t.improvement.as_mut());
            match producer_imp {
                Some(imp) => imp.traders.push(trader_id),
                None => {
                    return Err(SaveError::Mismatch(format!(
                        "trader {} has no producer improvement at {}",
                        trader_id, producer
                    )))
                }
            }
            let sink_imp = self
                .world
                .map
                .get_mut(sink)
                .and_then(|t| t.improvement.as_mut());
            match sink_imp {
                Some(imp) => imp.suppliers.push(trader_id),
                None => {
                    return Err(SaveError::Mismatch(format!(
                        "trader {} has no sink improvement at {}",
                        trader_id, sink
                    )))
                }
            }
        }

        // rebuilding pushed tile updates; a fresh load has none pending
        self.world.map.drain_updates();
        Ok(())
    }
}
