//! Map query tests: wrap topology, pathfinding, and line of sight.

use hexarchy_core::{
    hex::Coord,
    map::Map,
    terrain::Terrain,
    types::MovementClass,
};

// =============================================================================
// Test Helpers
// =============================================================================

fn flat_map(width: u32, height: u32) -> Map {
    Map::filled(width, height, Terrain::Grassland)
}

/// Mark every tile at exactly `radius` hex steps from `center` as mountain.
fn mountain_ring(map: &mut Map, center: Coord, radius: u32) {
    let ring: Vec<Coord> = map
        .neighbors_within(center, radius)
        .into_iter()
        .filter(|c| center.distance(c) == radius)
        .collect();
    for coord in ring {
        map.get_mut(coord).unwrap().terrain = Terrain::Mountain;
    }
}

// =============================================================================
// Wrap topology
// =============================================================================

#[test]
fn test_neighbors_wrap_west_edge() {
    let map = flat_map(10, 10);
    let coords = map.neighbors_within(Coord::new(0, 5), 1);
    assert!(
        coords.iter().any(|c| c.x == 9),
        "west edge should wrap to x=9"
    );
}

#[test]
fn test_neighbors_do_not_wrap_north() {
    let map = flat_map(10, 10);
    let coords = map.neighbors_within(Coord::new(5, 0), 1);
    assert!(coords.iter().all(|c| c.y >= 0));
    assert!(coords.len() < 7, "top edge loses out-of-bounds neighbors");
}

#[test]
fn test_wrapped_coords_share_tiles() {
    let mut map = flat_map(10, 10);
    map.get_mut(Coord::new(-1, 4)).unwrap().terrain = Terrain::Desert;
    assert_eq!(map.get(Coord::new(9, 4)).unwrap().terrain, Terrain::Desert);
}

#[test]
fn test_path_tree_crosses_the_seam() {
    let map = flat_map(10, 10);
    let tree = map.path_tree(Coord::new(0, 5), 2, MovementClass::Land);
    let wrapped = map.pos(Coord::new(9, 5)).unwrap();
    assert_eq!(tree.dist.get(&wrapped), Some(&1));
}

// =============================================================================
// Path trees
// =============================================================================

#[test]
fn test_mountain_ring_blocks_expansion() {
    let mut map = flat_map(20, 20);
    let center = Coord::new(10, 10);
    mountain_ring(&mut map, center, 2);

    let tree = map.path_tree(center, 10, MovementClass::Land);
    for (&pos, _) in &tree.dist {
        let coord = map.coord_of(pos);
        assert!(
            center.distance(&coord) < 2,
            "tile {} beyond the ring should be unreachable",
            coord
        );
    }
}

#[test]
fn test_air_mode_ignores_the_ring() {
    let mut map = flat_map(20, 20);
    let center = Coord::new(10, 10);
    mountain_ring(&mut map, center, 2);

    let tree = map.path_tree(center, 4, MovementClass::Air);
    let outside = map.pos(Coord::new(10, 14)).unwrap();
    assert!(tree.dist.contains_key(&outside));
}

#[test]
fn test_costly_terrain_consumes_range() {
    let mut map = flat_map(20, 20);
    // tundra costs 2 to enter
    map.get_mut(Coord::new(10, 11)).unwrap().terrain = Terrain::Tundra;
    let tree = map.path_tree(Coord::new(10, 10), 2, MovementClass::Land);
    let through = map.pos(Coord::new(10, 11)).unwrap();
    assert_eq!(tree.dist.get(&through), Some(&2));
    // continuing past it exceeds the budget
    let beyond = map.pos(Coord::new(10, 12)).unwrap();
    assert!(!tree.dist.contains_key(&beyond));
}

#[test]
fn test_dist_never_exceeds_range() {
    let map = flat_map(20, 20);
    let tree = map.path_tree(Coord::new(10, 10), 4, MovementClass::Land);
    assert!(tree.dist.values().all(|&d| d <= 4));
}

#[test]
fn test_water_mode_stays_at_sea() {
    let mut map = flat_map(20, 20);
    for y in 0..20 {
        map.get_mut(Coord::new(15, y)).unwrap().terrain = Terrain::Coastal;
    }
    let tree = map.path_tree(Coord::new(15, 10), 3, MovementClass::Water);
    for (&pos, _) in &tree.dist {
        assert!(map.tiles[pos].terrain.is_water());
    }
}

#[test]
fn test_find_route_rejects_unreached_target() {
    let mut map = flat_map(20, 20);
    let center = Coord::new(10, 10);
    mountain_ring(&mut map, center, 2);
    let tree = map.path_tree(center, 10, MovementClass::Land);
    assert!(map
        .find_route(&tree, Coord::new(10, 14), center)
        .is_none());
}

// =============================================================================
// Line of sight
// =============================================================================

#[test]
fn test_flat_ground_vision_is_a_disc() {
    let map = flat_map(30, 30);
    let center = Coord::new(15, 15);
    let visible = map.visible_tiles(center, 3);
    for coord in map.neighbors_within(center, 3) {
        assert!(visible.contains(&coord), "tile {} should be visible", coord);
    }
}

#[test]
fn test_forest_improvement_blocks_like_terrain() {
    use hexarchy_core::improvement::{Improvement, ImprovementKind};
    let mut map = flat_map(30, 30);
    // forest (height 2) on the column line below the observer
    map.get_mut(Coord::new(15, 17)).unwrap().improvement =
        Some(Improvement::new(ImprovementKind::Forest));

    let visible = map.visible_tiles(Coord::new(15, 15), 5);
    assert!(visible.contains(&Coord::new(15, 17)));
    assert!(
        !visible.contains(&Coord::new(15, 18)),
        "ground right behind the forest is hidden"
    );
}

#[test]
fn test_taller_blocker_seen_over_shorter() {
    let mut map = flat_map(30, 30);
    map.get_mut(Coord::new(15, 17)).unwrap().terrain = Terrain::Mountain;
    map.get_mut(Coord::new(15, 19)).unwrap().terrain = Terrain::Mountain;

    let visible = map.visible_tiles(Coord::new(15, 15), 6);
    assert!(visible.contains(&Coord::new(15, 17)));
    // flat ground behind the first mountain is hidden...
    assert!(!visible.contains(&Coord::new(15, 18)));
    // ...and with the default slope growth even the second peak is shadowed
    assert!(!visible.contains(&Coord::new(15, 20)));
}

#[test]
fn test_vision_respects_map_edges() {
    let map = flat_map(10, 10);
    let visible = map.visible_tiles(Coord::new(5, 0), 3);
    assert!(visible.iter().all(|c| c.y >= 0 && c.y < 10));
    assert!(!visible.is_empty());
}

#[test]
fn test_wider_step_length_thins_the_wedge() {
    let map = flat_map(40, 40);
    let center = Coord::new(20, 20);
    let dense = map.visible_tiles_with(center, 6, 1);
    let sparse = map.visible_tiles_with(center, 6, 3);
    assert!(sparse.len() <= dense.len());
}

// =============================================================================
// Randomized consistency checks
// =============================================================================

#[test]
fn test_pos_and_coord_of_agree_on_random_coords() {
    use rand::{rngs::StdRng, Rng, SeedableRng};
    let map = flat_map(17, 11);
    let mut rng = StdRng::seed_from_u64(1234);
    for _ in 0..500 {
        let coord = Coord::new(rng.gen_range(-40..40), rng.gen_range(-5..16));
        match map.pos(coord) {
            Some(pos) => {
                assert!(pos < map.tiles.len());
                // re-indexing the resolved coordinate is stable
                assert_eq!(map.pos(map.coord_of(pos)), Some(pos));
            }
            None => assert!(coord.y < 0 || coord.y >= 11),
        }
    }
}

#[test]
fn test_random_path_trees_stay_within_budget() {
    use rand::{rngs::StdRng, Rng, SeedableRng};
    let mut map = flat_map(20, 20);
    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..60 {
        let coord = Coord::new(rng.gen_range(0..20), rng.gen_range(0..20));
        if rng.gen_bool(0.2) {
            map.get_mut(coord).unwrap().terrain = Terrain::Mountain;
        }
    }
    for _ in 0..20 {
        let src = Coord::new(rng.gen_range(0..20), rng.gen_range(0..20));
        let range = rng.gen_range(1..8);
        let tree = map.path_tree(src, range, MovementClass::Land);
        for (&pos, &dist) in &tree.dist {
            assert!(dist <= range);
            assert!(map.tiles[pos].terrain != Terrain::Mountain || dist == 0);
        }
    }
}
