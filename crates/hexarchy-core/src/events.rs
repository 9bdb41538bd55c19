//! Outbound wire events.
//!
//! Every message the core sends to a player is a JSON object of the shape
//! `{ "update": [[name, args], ...] }` where each event serializes as a
//! two-element array: the event name and its argument list. The event set is
//! closed; see [`Event`].

use crate::hex::Coord;
use crate::improvement::ImprovementKind;
use crate::types::{CivId, UnitId};
use crate::unit::UnitKind;
use crate::yields::Yield;
use serde::ser::SerializeSeq;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// Civ-facing summary of a civilization.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CivSummary {
    pub id: CivId,
    pub color: String,
}

/// Civ-facing snapshot of a unit on a visible tile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitData {
    pub id: UnitId,
    pub kind: UnitKind,
    pub civ_id: CivId,
    pub hp: u32,
}

/// Civ-facing snapshot of an improvement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImprovementData {
    pub kind: ImprovementKind,
    pub pillaged: bool,
}

/// Civ-facing snapshot of a tile.
///
/// A visible snapshot carries the unit; a merely-discovered snapshot omits
/// it and sets `visible` to false. Undiscovered tiles are not snapshotted at
/// all (`None` on the wire).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileData {
    pub terrain: crate::terrain::Terrain,
    pub elevation: i32,
    #[serde(rename = "yield")]
    pub tile_yield: Yield,
    pub improvement: Option<ImprovementData>,
    pub owner: Option<CivId>,
    pub unit: Option<UnitData>,
    pub visible: bool,
}

/// The closed set of events the core emits.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    BeginGame {
        width: u32,
        height: u32,
        player_count: u8,
    },
    CivData(BTreeMap<CivId, CivSummary>),
    SetMap(Vec<Option<TileData>>),
    BeginTurn,
    EndTurn,
    TileUpdate {
        coords: Coord,
        tile: Option<TileData>,
    },
    UnitPositions(Vec<Coord>),
}

impl Event {
    /// Wire name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            Event::BeginGame { .. } => "beginGame",
            Event::CivData(_) => "civData",
            Event::SetMap(_) => "setMap",
            Event::BeginTurn => "beginTurn",
            Event::EndTurn => "endTurn",
            Event::TileUpdate { .. } => "tileUpdate",
            Event::UnitPositions(_) => "unitPositions",
        }
    }

    /// Argument list of the event, as a JSON array.
    pub fn args(&self) -> Value {
        match self {
            Event::BeginGame {
                width,
                height,
                player_count,
            } => json!([[width, height], player_count]),
            Event::CivData(civs) => json!([civs]),
            Event::SetMap(tiles) => json!([tiles]),
            Event::BeginTurn => json!([]),
            Event::EndTurn => json!([]),
            Event::TileUpdate { coords, tile } => json!([coords, tile]),
            Event::UnitPositions(coords) => json!([coords]),
        }
    }
}

impl Serialize for Event {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(2))?;
        seq.serialize_element(self.name())?;
        seq.serialize_element(&self.args())?;
        seq.end()
    }
}

/// Compose the outbound `{ "update": [...] }` message for a batch of events.
pub fn update_message(events: &[Event]) -> String {
    json!({ "update": events }).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::Terrain;

    #[test]
    fn test_event_shape() {
        let event = Event::BeginGame {
            width: 20,
            height: 10,
            player_count: 2,
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value, json!(["beginGame", [[20, 10], 2]]));
    }

    #[test]
    fn test_empty_arg_events() {
        assert_eq!(
            serde_json::to_value(Event::BeginTurn).unwrap(),
            json!(["beginTurn", []])
        );
        assert_eq!(
            serde_json::to_value(Event::EndTurn).unwrap(),
            json!(["endTurn", []])
        );
    }

    #[test]
    fn test_tile_update_null_for_undiscovered() {
        let event = Event::TileUpdate {
            coords: Coord::new(2, 3),
            tile: None,
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value[0], "tileUpdate");
        assert_eq!(value[1][1], Value::Null);
    }

    #[test]
    fn test_update_message_envelope() {
        let msg = update_message(&[Event::BeginTurn]);
        let value: Value = serde_json::from_str(&msg).unwrap();
        assert_eq!(value["update"], json!([["beginTurn", []]]));
    }

    #[test]
    fn test_tile_data_yield_key() {
        let tile = TileData {
            terrain: Terrain::Grassland,
            elevation: 0,
            tile_yield: Yield::food(2),
            improvement: None,
            owner: None,
            unit: None,
            visible: true,
        };
        let value = serde_json::to_value(&tile).unwrap();
        assert!(value.get("yield").is_some());
    }
}
