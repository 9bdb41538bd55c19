//! Economy tests: worksites, errands, traders, and trade routes.
//!
//! These cover the full chain from starting a construction errand through
//! supplier routing, per-turn deliveries, completion, and trader reaping.

use hexarchy_core::{
    hex::Coord,
    improvement::ImprovementKind,
    knowledge::KNOWLEDGE_MAX_POINTS,
    map::Map,
    terrain::Terrain,
    unit::UnitKind,
    world::World,
};

// =============================================================================
// Test Helpers
// =============================================================================

/// A world with one civ owning a city at `center` on flat grassland.
fn city_world(center: Coord) -> World {
    let mut world = World::new(Map::filled(20, 20, Terrain::Grassland), 1);
    world.spawn_unit(0, UnitKind::Settler, center).unwrap();
    assert!(world.settle_city(0, center, "Thebes"));
    world
}

fn improvement_kind(world: &World, coord: Coord) -> Option<ImprovementKind> {
    world
        .map
        .get(coord)
        .and_then(|t| t.improvement.as_ref())
        .map(|imp| imp.kind)
}

// =============================================================================
// Scenario: worksite -> farm via supplier chain
// =============================================================================

#[test]
fn test_construction_completes_from_supplier_deliveries() {
    let mut world = city_world(Coord::new(5, 5));
    let site = Coord::new(4, 5);

    // a farm next door feeds the construction; the settlement helps too
    assert!(world.build_improvement(0, Coord::new(6, 5), ImprovementKind::Farm));
    assert!(world.start_construction(0, site, ImprovementKind::Farm));
    assert_eq!(improvement_kind(&world, site), Some(ImprovementKind::Worksite));
    assert!(!world.map.traders.is_empty(), "suppliers should be routed");

    // a handful of turns of deliveries completes the farm
    for _ in 0..10 {
        world.turn();
    }

    assert_eq!(improvement_kind(&world, site), Some(ImprovementKind::Farm));
    let farm = world.map.get(site).unwrap().improvement.as_ref().unwrap();
    assert!(farm.errand.is_none(), "errand is removed on completion");
    assert_eq!(farm.store.capacity, ImprovementKind::Farm.store_capacity());
    // published yield is the tile baseline plus the farm's own
    let tile = world.map.get(site).unwrap();
    assert_eq!(
        tile.total_yield(),
        tile.base_yield + ImprovementKind::Farm.per_turn_yield()
    );
}

#[test]
fn test_completed_errand_reaps_suppliers() {
    let mut world = city_world(Coord::new(5, 5));
    let site = Coord::new(4, 5);
    world.start_construction(0, site, ImprovementKind::Farm);
    assert!(!world.map.traders.is_empty());

    for _ in 0..12 {
        world.turn();
    }
    assert_eq!(improvement_kind(&world, site), Some(ImprovementKind::Farm));
    assert!(
        world.map.traders.is_empty(),
        "traders feeding a finished errand are reaped"
    );
}

#[test]
fn test_trader_routes_start_and_end_on_endpoint_tiles() {
    let mut world = city_world(Coord::new(5, 5));
    world.build_improvement(0, Coord::new(6, 5), ImprovementKind::Farm);
    world.start_construction(0, Coord::new(4, 5), ImprovementKind::Farm);

    for trader in &world.map.traders {
        let producer = trader.route.producer();
        let sink = trader.route.sink();
        assert_eq!(trader.route.path.first(), Some(&producer));
        assert_eq!(trader.route.path.last(), Some(&sink));
        assert!(world.map.get(producer).unwrap().improvement.is_some());
        assert!(world.map.get(sink).unwrap().improvement.is_some());
        for window in trader.route.path.windows(2) {
            assert_eq!(window[0].distance(&window[1]), 1);
        }
    }
}

#[test]
fn test_stores_never_exceed_capacity() {
    let mut world = city_world(Coord::new(5, 5));
    world.build_improvement(0, Coord::new(6, 5), ImprovementKind::Farm);
    world.build_improvement(0, Coord::new(4, 5), ImprovementKind::Mine);
    world.start_construction(0, Coord::new(5, 4), ImprovementKind::Campus);

    for _ in 0..15 {
        world.turn();
        for tile in &world.map.tiles {
            if let Some(imp) = &tile.improvement {
                assert!(
                    imp.store.capacity.fulfills(&imp.store.stored),
                    "store exceeds capacity on {:?}",
                    imp.kind
                );
            }
        }
    }
}

#[test]
fn test_trader_capacity_capped_by_requirement() {
    let mut world = city_world(Coord::new(5, 5));
    world.start_construction(0, Coord::new(4, 5), ImprovementKind::Farm);
    let requirement = ImprovementKind::Farm.construction_cost();
    for trader in &world.map.traders {
        assert!(requirement.fulfills(&trader.capacity));
    }
}

// =============================================================================
// Training and research errands
// =============================================================================

#[test]
fn test_training_errand_spawns_unit() {
    let mut world = city_world(Coord::new(5, 5));
    let center = Coord::new(5, 5);
    // keep the settlement fed by two farms
    world.build_improvement(0, Coord::new(4, 5), ImprovementKind::Farm);
    world.build_improvement(0, Coord::new(6, 5), ImprovementKind::Farm);
    assert!(world.train_unit(0, center, UnitKind::Scout, Some(Coord::new(5, 6))));

    let before = world.units.len();
    for _ in 0..20 {
        world.turn();
    }
    assert_eq!(world.units.len(), before + 1, "training should finish");
    let spawned = world.units.values().find(|u| u.kind == UnitKind::Scout).unwrap();
    assert_eq!(spawned.coords, Some(Coord::new(5, 6)));
}

#[test]
fn test_second_errand_refused_while_live() {
    let mut world = city_world(Coord::new(5, 5));
    let center = Coord::new(5, 5);
    assert!(world.train_unit(0, center, UnitKind::Scout, None));
    assert!(!world.train_unit(0, center, UnitKind::Warrior, None));
}

#[test]
fn test_research_errand_credits_knowledge() {
    let mut world = city_world(Coord::new(5, 5));
    let campus_at = Coord::new(4, 5);
    world.build_improvement(0, campus_at, ImprovementKind::Campus);
    assert!(world.research(0, campus_at, "astronomy".to_string()));

    // the campus generates its own science; no suppliers needed
    for _ in 0..8 {
        world.turn();
    }
    let tile = world.map.get(campus_at).unwrap();
    assert!(tile.knowledge.get("astronomy") > 0);
    assert!(tile
        .improvement
        .as_ref()
        .map_or(false, |imp| imp.errand.is_none()));
}

#[test]
fn test_research_refused_outside_campus() {
    let mut world = city_world(Coord::new(5, 5));
    assert!(!world.research(0, Coord::new(5, 5), "astronomy".to_string()));
}

// =============================================================================
// Knowledge spillover
// =============================================================================

#[test]
fn test_knowledge_spills_to_neighbors_with_decay() {
    let mut world = city_world(Coord::new(5, 5));
    let campus_at = Coord::new(4, 5);
    world.build_improvement(0, campus_at, ImprovementKind::Campus);
    world.research(0, campus_at, "astronomy".to_string());

    // run until the errand completes and credits the campus tile
    let mut source = 0;
    for _ in 0..10 {
        world.turn();
        source = world.map.get(campus_at).unwrap().knowledge.get("astronomy");
        if source > 0 {
            break;
        }
    }
    assert!(source > 0);

    // the completing turn's own spillover already reached the neighbors
    for neighbor in campus_at.adjacent() {
        let points = world.map.get(neighbor).unwrap().knowledge.get("astronomy");
        assert!(points > 0, "neighbor {} should receive spillover", neighbor);
        assert!(points < source, "spillover decays outward");
    }
}

#[test]
fn test_capped_branch_stops_spilling() {
    let mut world = city_world(Coord::new(5, 5));
    let hearth = Coord::new(15, 15);
    world
        .map
        .get_mut(hearth)
        .unwrap()
        .knowledge
        .add("pottery", KNOWLEDGE_MAX_POINTS, 0.0, KNOWLEDGE_MAX_POINTS);

    world.turn();

    // a branch at its cap stays put; nothing arrives next door
    for neighbor in hearth.adjacent() {
        assert_eq!(
            world.map.get(neighbor).unwrap().knowledge.get("pottery"),
            0
        );
    }
}

// =============================================================================
// Action gates
// =============================================================================

#[test]
fn test_illegal_actions_leave_no_trace() {
    let mut world = city_world(Coord::new(5, 5));
    let foreign = Coord::new(15, 15);

    assert!(!world.build_improvement(0, foreign, ImprovementKind::Farm));
    assert!(!world.start_construction(0, foreign, ImprovementKind::Farm));
    assert!(!world.train_unit(0, foreign, UnitKind::Scout, None));

    assert!(world.map.get(foreign).unwrap().improvement.is_none());
    assert!(world.map.traders.is_empty());
}

#[test]
fn test_forest_cannot_be_started_as_construction() {
    let mut world = city_world(Coord::new(5, 5));
    assert!(!world.start_construction(0, Coord::new(4, 5), ImprovementKind::Forest));
    assert!(world.map.get(Coord::new(4, 5)).unwrap().improvement.is_none());
}
