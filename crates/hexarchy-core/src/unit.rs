//! Units - military and civilian pieces on the map.

use crate::hex::Coord;
use crate::types::{CivId, MovementClass, UnitId};
use crate::yields::Yield;
use serde::{Deserialize, Serialize};

/// What a unit is allowed to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PromotionClass {
    Civilian,
    Melee,
    Ranged,
    Recon,
}

/// Closed set of unit kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    Settler,
    Builder,
    Scout,
    Warrior,
    Slinger,
    Galley,
}

/// Static stats for a unit kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnitStats {
    pub promotion_class: PromotionClass,
    pub movement_class: MovementClass,
    pub max_hp: u32,
    pub movement: u32,
    pub vision_range: u32,
    pub attack_range: Option<u32>,
    pub combat_strength: u32,
}

impl UnitKind {
    /// Get the stat table entry for this kind.
    pub const fn stats(&self) -> UnitStats {
        match self {
            UnitKind::Settler => UnitStats {
                promotion_class: PromotionClass::Civilian,
                movement_class: MovementClass::Land,
                max_hp: 50,
                movement: 3,
                vision_range: 2,
                attack_range: None,
                combat_strength: 0,
            },
            UnitKind::Builder => UnitStats {
                promotion_class: PromotionClass::Civilian,
                movement_class: MovementClass::Land,
                max_hp: 50,
                movement: 2,
                vision_range: 2,
                attack_range: None,
                combat_strength: 0,
            },
            UnitKind::Scout => UnitStats {
                promotion_class: PromotionClass::Recon,
                movement_class: MovementClass::Land,
                max_hp: 80,
                movement: 3,
                vision_range: 3,
                attack_range: None,
                combat_strength: 10,
            },
            UnitKind::Warrior => UnitStats {
                promotion_class: PromotionClass::Melee,
                movement_class: MovementClass::Land,
                max_hp: 100,
                movement: 2,
                vision_range: 2,
                attack_range: None,
                combat_strength: 20,
            },
            UnitKind::Slinger => UnitStats {
                promotion_class: PromotionClass::Ranged,
                movement_class: MovementClass::Land,
                max_hp: 80,
                movement: 2,
                vision_range: 2,
                attack_range: Some(2),
                combat_strength: 15,
            },
            UnitKind::Galley => UnitStats {
                promotion_class: PromotionClass::Melee,
                movement_class: MovementClass::Water,
                max_hp: 90,
                movement: 3,
                vision_range: 2,
                attack_range: None,
                combat_strength: 17,
            },
        }
    }

    /// Resource cost of training this unit.
    pub const fn training_cost(&self) -> Yield {
        match self {
            UnitKind::Settler => Yield::new(6, 6, 0, 0),
            UnitKind::Builder => Yield::new(2, 4, 0, 0),
            UnitKind::Scout => Yield::new(1, 4, 0, 0),
            UnitKind::Warrior => Yield::new(2, 6, 0, 0),
            UnitKind::Slinger => Yield::new(2, 5, 0, 0),
            UnitKind::Galley => Yield::new(1, 8, 0, 0),
        }
    }

    /// Get all unit kind variants.
    pub const fn all() -> &'static [UnitKind] {
        &[
            UnitKind::Settler,
            UnitKind::Builder,
            UnitKind::Scout,
            UnitKind::Warrior,
            UnitKind::Slinger,
            UnitKind::Galley,
        ]
    }
}

/// A unit on the game map.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    /// Unique identifier.
    pub id: UnitId,
    /// Owning civilization.
    pub civ_id: CivId,
    /// Kind of unit.
    pub kind: UnitKind,
    /// Current health.
    pub hp: u32,
    /// Remaining movement points this turn.
    pub movement: u32,
    /// Position on the map; absent until the unit is placed.
    pub coords: Option<Coord>,
}

impl Unit {
    /// Create a new, unplaced unit.
    pub fn new(id: UnitId, civ_id: CivId, kind: UnitKind) -> Self {
        let stats = kind.stats();
        Self {
            id,
            civ_id,
            kind,
            hp: stats.max_hp,
            movement: stats.movement,
            coords: None,
        }
    }

    /// Refresh movement at the start of the owner's turn.
    pub fn new_turn(&mut self) {
        self.movement = self.kind.stats().movement;
    }

    /// Vision range in tiles.
    pub fn vision_range(&self) -> u32 {
        self.kind.stats().vision_range
    }

    /// Attack range in tiles; `None` for melee-only and civilian units.
    pub fn attack_range(&self) -> Option<u32> {
        self.kind.stats().attack_range
    }

    /// Movement class for pathfinding.
    pub fn movement_class(&self) -> MovementClass {
        self.kind.stats().movement_class
    }

    /// Effective combat strength, scaled by remaining health.
    pub fn effective_strength(&self) -> u32 {
        let stats = self.kind.stats();
        if stats.combat_strength == 0 {
            return 0;
        }
        (stats.combat_strength * self.hp / stats.max_hp).max(1)
    }

    /// Can this unit initiate an attack at all?
    pub fn can_attack(&self) -> bool {
        !matches!(self.kind.stats().promotion_class, PromotionClass::Civilian)
            && self.kind.stats().combat_strength > 0
    }

    /// Take damage, flooring at zero.
    pub fn take_damage(&mut self, damage: u32) {
        self.hp = self.hp.saturating_sub(damage);
    }

    /// Check if the unit has been destroyed.
    pub fn is_dead(&self) -> bool {
        self.hp == 0
    }

    /// Spend movement points.
    pub fn use_movement(&mut self, cost: u32) {
        self.movement = self.movement.saturating_sub(cost);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_unit_is_unplaced() {
        let unit = Unit::new(1, 0, UnitKind::Scout);
        assert!(unit.coords.is_none());
        assert_eq!(unit.hp, 80);
        assert_eq!(unit.movement, 3);
    }

    #[test]
    fn test_new_turn_refreshes_movement() {
        let mut unit = Unit::new(1, 0, UnitKind::Warrior);
        unit.use_movement(2);
        assert_eq!(unit.movement, 0);
        unit.new_turn();
        assert_eq!(unit.movement, 2);
    }

    #[test]
    fn test_civilians_cannot_attack() {
        assert!(!Unit::new(1, 0, UnitKind::Settler).can_attack());
        assert!(!Unit::new(2, 0, UnitKind::Builder).can_attack());
        assert!(Unit::new(3, 0, UnitKind::Warrior).can_attack());
    }

    #[test]
    fn test_strength_scales_with_health() {
        let mut unit = Unit::new(1, 0, UnitKind::Warrior);
        assert_eq!(unit.effective_strength(), 20);
        unit.take_damage(50);
        assert_eq!(unit.effective_strength(), 10);
        unit.take_damage(99);
        assert!(unit.is_dead());
    }

    #[test]
    fn test_only_slinger_has_attack_range() {
        for kind in UnitKind::all() {
            let unit = Unit::new(1, 0, *kind);
            if *kind == UnitKind::Slinger {
                assert_eq!(unit.attack_range(), Some(2));
            } else {
                assert_eq!(unit.attack_range(), None);
            }
        }
    }
}
