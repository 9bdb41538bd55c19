//! Hexarchy Core Library
//!
//! This crate contains the authoritative simulation core of Hexarchy, a
//! turn-based hex-grid strategy game. It owns the world state, advances it
//! in discrete turns, enforces legality of player actions, and produces
//! per-player views that honor fog of war.
//!
//! # Design Principles
//!
//! - **No transport dependencies**: outbound messages go through the
//!   `MessageSink` trait; sockets live elsewhere
//! - **Single writer**: all mutation happens on one logical thread
//! - **Deterministic**: ordered containers everywhere state is iterated
//! - **Serializable**: a game snapshot round-trips through serde

// Core modules
pub mod hex;
pub mod terrain;
pub mod tile;
pub mod types;
pub mod yields;

// Economy
pub mod errand;
pub mod improvement;
pub mod knowledge;
pub mod trader;

// Map and spatial queries
pub mod map;
pub mod mapgen;

// Units and factions
pub mod city;
pub mod civilization;
pub mod unit;

// Orchestration and transport boundary
pub mod events;
pub mod game;
pub mod player;
pub mod settings;
pub mod world;

// Re-exports for convenience
pub use city::City;
pub use civilization::Civilization;
pub use errand::{ErrandAction, ErrandKind, WorkErrand};
pub use events::{update_message, CivSummary, Event, ImprovementData, TileData, UnitData};
pub use game::{Game, GameError, GameMeta, SaveError};
pub use hex::{Coord, DIRECTION_COUNT};
pub use improvement::{Improvement, ImprovementKind};
pub use knowledge::{
    KnowledgeMap, KNOWLEDGE_MAX_POINTS, KNOWLEDGE_SPILLOVER_DECAY, RESEARCH_KNOWLEDGE_POINTS,
};
pub use map::{Map, PathTree, UnitSpawn, TRADE_ROUTE_RANGE};
pub use mapgen::{MapGenConfig, MapGenerator, SeededRng};
pub use player::{MessageSink, Player};
pub use settings::{GameSettings, SettingsError};
pub use terrain::Terrain;
pub use tile::{Tile, TileOwner};
pub use trader::{Route, TradeLeg, Trader, TRADER_CAPACITY, TRADER_SPEED};
pub use types::{
    CityId, CivColor, CivId, KnowledgeBranch, MovementClass, TraderId, UnitId,
};
pub use unit::{PromotionClass, Unit, UnitKind, UnitStats};
pub use world::{World, TURN_VISION_RANGE};
pub use yields::{ResourceStore, Yield};
