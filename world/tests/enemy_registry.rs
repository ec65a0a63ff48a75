use std::collections::HashSet;

use gridpulse_core::{CellCoord, EnemyKind, SpawnCorner};
use gridpulse_world::{
    enemies::{Advance, EnemyRegistry, SpawnError},
    grid::Grid,
    navigation::PathField,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

#[test]
fn crowded_registry_never_overlaps() {
    let mut rng = ChaCha8Rng::seed_from_u64(0xc0ff_ee);
    let grid = Grid::standard();
    let mut registry = EnemyRegistry::new();
    let open: Vec<CellCoord> = grid.cells().filter(|cell| grid.is_open(*cell)).collect();

    for _ in 0..60 {
        let cell = open[rng.gen_range(0..open.len())];
        let kind = EnemyKind::from_roll(rng.gen_range(0..4));
        match registry.spawn_at(&grid, cell, kind) {
            Ok(_) | Err(SpawnError::Occupied { .. }) => {}
            Err(error) => panic!("unexpected spawn failure: {error}"),
        }
    }

    for turn in 0..40 {
        let goal = open[rng.gen_range(0..open.len())];
        let field = PathField::compute(&grid, goal);
        let outcomes = registry.advance_all(&field);
        assert_eq!(outcomes.len(), registry.len());

        let mut seen = HashSet::new();
        for enemy in registry.iter() {
            assert!(
                seen.insert(enemy.cell()),
                "turn {turn}: two enemies share {:?}",
                enemy.cell()
            );
        }

        for outcome in outcomes {
            if let Advance::Expired { enemy_id, .. } = outcome {
                let _ = registry.kill(enemy_id);
            }
        }
    }
}

#[test]
fn every_corner_spawns_once() {
    let grid = Grid::standard();
    let mut registry = EnemyRegistry::new();

    let cells: Vec<CellCoord> = SpawnCorner::ALL
        .iter()
        .map(|corner| {
            let id = registry
                .spawn(&grid, *corner, EnemyKind::Plain)
                .expect("corners start empty");
            registry.get(id).map(|enemy| enemy.cell()).expect("just spawned")
        })
        .collect();

    assert_eq!(
        cells,
        vec![
            CellCoord::new(1, 1),
            CellCoord::new(19, 1),
            CellCoord::new(19, 13),
            CellCoord::new(1, 13),
        ]
    );
    for corner in SpawnCorner::ALL {
        assert!(matches!(
            registry.spawn(&grid, corner, EnemyKind::WallForming),
            Err(SpawnError::Occupied { .. })
        ));
    }
}

#[test]
fn enemies_converge_on_goal_and_queue_behind_each_other() {
    let grid = Grid::standard();
    let goal = CellCoord::new(10, 7);
    let field = PathField::compute(&grid, goal);
    let mut registry = EnemyRegistry::new();
    for corner in SpawnCorner::ALL {
        let _ = registry
            .spawn(&grid, corner, EnemyKind::Plain)
            .expect("corners start empty");
    }

    let mut arrivals = 0;
    for _ in 0..200 {
        for outcome in registry.advance_all(&field) {
            if let Advance::ReachedGoal { enemy_id, cell } = outcome {
                assert_eq!(cell, goal);
                assert!(registry.kill(enemy_id).is_some());
                arrivals += 1;
            }
        }
    }

    assert_eq!(arrivals, 4);
    assert!(registry.is_empty());
}
