//! Work errands - in-progress production tasks hosted by improvements.
//!
//! An errand exists only while incomplete. It shares the host improvement's
//! resource store: the store's capacity is raised to the errand cost while
//! the errand is live and restored when it completes. Completion effects are
//! applied during the map turn and the errand is then removed.

use crate::hex::Coord;
use crate::improvement::ImprovementKind;
use crate::types::{CivId, KnowledgeBranch};
use crate::unit::UnitKind;
use crate::yields::Yield;
use serde::{Deserialize, Serialize};

/// The three kinds of errand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrandKind {
    Construction,
    UnitTraining,
    Research,
}

/// What an errand produces when it completes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ErrandAction {
    /// Replace the hosting worksite with the target improvement.
    Construction { kind: ImprovementKind },
    /// Spawn a unit, at `location` if set or at the hosting tile.
    UnitTraining { kind: UnitKind },
    /// Credit knowledge points to the hosting tile.
    Research { branch: KnowledgeBranch },
}

impl ErrandAction {
    /// The errand kind this action belongs to.
    pub fn kind(&self) -> ErrandKind {
        match self {
            ErrandAction::Construction { .. } => ErrandKind::Construction,
            ErrandAction::UnitTraining { .. } => ErrandKind::UnitTraining,
            ErrandAction::Research { .. } => ErrandKind::Research,
        }
    }

    /// Resource cost of this action.
    pub fn cost(&self) -> Yield {
        match self {
            ErrandAction::Construction { kind } => kind.construction_cost(),
            ErrandAction::UnitTraining { kind } => kind.training_cost(),
            ErrandAction::Research { .. } => Yield::science(10),
        }
    }
}

/// A work-in-progress task attached to an improvement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkErrand {
    /// What happens on completion.
    pub action: ErrandAction,
    /// Civilization that commissioned the errand.
    pub civ_id: CivId,
    /// Full resource cost; completion requires the host store to cover it.
    pub cost: Yield,
    /// Resources delivered during the current turn (reset by `work`).
    pub stored_this_turn: Yield,
    /// Set once the host store covers the cost; cleared by removal.
    pub completed: bool,
    /// Optional placement override for unit training.
    pub location: Option<Coord>,
}

impl WorkErrand {
    /// Create a new errand for an action.
    pub fn new(action: ErrandAction, civ_id: CivId, location: Option<Coord>) -> Self {
        let cost = action.cost();
        Self {
            action,
            civ_id,
            cost,
            stored_this_turn: Yield::zero(),
            completed: false,
            location,
        }
    }
}
