//! Player-issued actions, as they arrive from a transport.

use hexarchy_core::{Coord, ImprovementKind, KnowledgeBranch, UnitId, UnitKind};
use serde::{Deserialize, Serialize};

/// One action a player may take during their turn.
///
/// Dispatch is fire-and-forget: the core validates every gate itself and an
/// illegal action is a silent no-op, so a malicious or stale client cannot
/// corrupt the simulation.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PlayerAction {
    MoveUnit {
        unit_id: UnitId,
        target: Coord,
    },
    Attack {
        unit_id: UnitId,
        target: Coord,
    },
    SettleCity {
        coords: Coord,
        name: String,
    },
    BuildImprovement {
        coords: Coord,
        kind: ImprovementKind,
    },
    StartConstruction {
        coords: Coord,
        kind: ImprovementKind,
    },
    TrainUnit {
        coords: Coord,
        kind: UnitKind,
        location: Option<Coord>,
    },
    Research {
        coords: Coord,
        branch: KnowledgeBranch,
    },
}
