//! Snapshot round-trip tests.
//!
//! A snapshot must reload into a bit-equivalent simulation: re-exporting the
//! imported game yields the original JSON, tile owners are re-derived from
//! the city tile sets, and traders reattach to their endpoint improvements.

use hexarchy_core::{
    game::{Game, SaveError},
    hex::Coord,
    improvement::ImprovementKind,
    map::Map,
    player::Player,
    terrain::Terrain,
    unit::UnitKind,
    world::World,
};

// =============================================================================
// Test Helpers
// =============================================================================

/// A game exercising every persistent entity: city, units, improvements,
/// a live errand, and routed traders.
fn rich_game() -> Game {
    let mut world = World::new(Map::filled(20, 20, Terrain::Grassland), 2);
    world.spawn_unit(0, UnitKind::Settler, Coord::new(5, 5)).unwrap();
    world.settle_city(0, Coord::new(5, 5), "Thebes");
    world.build_improvement(0, Coord::new(6, 5), ImprovementKind::Farm);
    world.start_construction(0, Coord::new(4, 5), ImprovementKind::Mine);
    world.spawn_unit(0, UnitKind::Scout, Coord::new(8, 8)).unwrap();
    world.spawn_unit(1, UnitKind::Warrior, Coord::new(15, 15)).unwrap();
    // advance a couple of turns so stores and trader positions are nonzero
    world.turn();
    world.turn();

    let mut game = Game::new(world, "Save Test".to_string(), 2);
    game.seat_player(Player::ai("Player 1".to_string(), 0)).unwrap();
    game.seat_player(Player::ai("Player 2".to_string(), 1)).unwrap();
    game.has_started = true;
    game
}

// =============================================================================
// Round trip
// =============================================================================

#[test]
fn test_export_import_export_is_identity() {
    let game = rich_game();
    let exported = game.export();
    let imported = Game::import(exported.clone()).unwrap();
    assert_eq!(imported.export(), exported);
}

#[test]
fn test_import_rebuilds_tile_owners() {
    let game = rich_game();
    let imported = Game::import(game.export()).unwrap();

    for (city_id, city) in &imported.world.map.cities {
        for coord in &city.tiles {
            let owner = imported.world.map.get(*coord).unwrap().owner;
            assert_eq!(owner.map(|o| o.city_id), Some(*city_id));
            assert_eq!(owner.map(|o| o.civ_id), Some(city.civ_id));
        }
    }
}

#[test]
fn test_import_reattaches_traders() {
    let game = rich_game();
    assert!(!game.world.map.traders.is_empty());
    let imported = Game::import(game.export()).unwrap();

    for trader in &imported.world.map.traders {
        let producer = imported
            .world
            .map
            .get(trader.route.producer())
            .unwrap()
            .improvement
            .as_ref()
            .unwrap();
        assert!(producer.traders.contains(&trader.id));
        let sink = imported
            .world
            .map
            .get(trader.route.sink())
            .unwrap()
            .improvement
            .as_ref()
            .unwrap();
        assert!(sink.suppliers.contains(&trader.id));
    }
}

#[test]
fn test_imported_game_keeps_simulating() {
    let game = rich_game();
    let mut imported = Game::import(game.export()).unwrap();
    let turn = imported.world.turn_count;
    for _ in 0..5 {
        imported.end_turn();
    }
    assert_eq!(imported.world.turn_count, turn + 5);
}

#[test]
fn test_round_trip_preserves_fog_state() {
    let game = rich_game();
    let imported = Game::import(game.export()).unwrap();

    for (a, b) in game
        .world
        .map
        .tiles
        .iter()
        .zip(imported.world.map.tiles.iter())
    {
        assert_eq!(a.discovered_by, b.discovered_by);
        assert_eq!(a.visible_to, b.visible_to);
    }
}

// =============================================================================
// Load failures
// =============================================================================

#[test]
fn test_import_rejects_garbage() {
    let result = Game::import(serde_json::json!({"not": "a game"}));
    assert!(matches!(result, Err(SaveError::Parse(_))));
}

#[test]
fn test_import_rejects_orphaned_trader() {
    let game = rich_game();
    let producer = game.world.map.traders[0].route.producer();
    let pos = game.world.map.pos(producer).unwrap();

    let mut exported = game.export();
    // strip the improvement out from under the trader's producer endpoint
    exported["world"]["map"]["tiles"][pos]["improvement"] = serde_json::Value::Null;
    assert!(matches!(
        Game::import(exported),
        Err(SaveError::Mismatch(_))
    ));
}

#[test]
fn test_import_rejects_truncated_tiles() {
    let game = rich_game();
    let mut exported = game.export();
    let tiles = exported["world"]["map"]["tiles"].as_array_mut().unwrap();
    tiles.pop();
    assert!(matches!(
        Game::import(exported),
        Err(SaveError::Mismatch(_))
    ));
}
