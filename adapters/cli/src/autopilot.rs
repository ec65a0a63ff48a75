//! Greedy player policy used to drive headless matches.

use gridpulse_core::{CellCoord, Direction, EnemyKind, CELL_SIZE, PULSE_RADIUS_PER_ENERGY};
use gridpulse_system_session::Action;
use gridpulse_world::{query, World};
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Energy the autopilot saves up before it considers firing.
const FIRE_ENERGY: u32 = 3;

/// Picks an action per turn: contact kills first, then a pulse when an enemy is
/// in reach, otherwise the step that keeps the most distance from enemies.
#[derive(Debug)]
pub(crate) struct Autopilot {
    rng: ChaCha8Rng,
}

impl Autopilot {
    pub(crate) fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub(crate) fn choose(&mut self, world: &World) -> Action {
        let player = query::player(world);
        let origin = player.cell();
        let enemies = query::enemies(world);

        for direction in Direction::ALL {
            let Some(target) = origin.step(direction) else {
                continue;
            };
            if enemies
                .find_in_cell(target)
                .is_some_and(|enemy| enemy.kind() == EnemyKind::Plain)
            {
                return Action::Move(direction);
            }
        }

        let nearest = nearest_enemy(world, origin);
        if player.energy() >= FIRE_ENERGY && query::charge_pulse(world).is_none() {
            let reach = player.energy().saturating_mul(PULSE_RADIUS_PER_ENERGY) / CELL_SIZE;
            if nearest.is_some_and(|distance| distance <= reach) {
                return Action::Fire;
            }
        }

        let mut best = Vec::new();
        let mut best_score = None;
        for direction in Direction::ALL {
            let Some(target) = origin
                .step(direction)
                .filter(|cell| query::grid(world).is_open(*cell))
            else {
                continue;
            };
            if enemies.find_in_cell(target).is_some() {
                continue;
            }

            let score = nearest_enemy(world, target).unwrap_or(u32::MAX);
            match best_score {
                Some(current) if score < current => {}
                Some(current) if score == current => best.push(direction),
                _ => {
                    best_score = Some(score);
                    best.clear();
                    best.push(direction);
                }
            }
        }

        best.choose(&mut self.rng)
            .copied()
            .map_or(Action::Wait, Action::Move)
    }
}

fn nearest_enemy(world: &World, cell: CellCoord) -> Option<u32> {
    query::enemies(world)
        .iter()
        .map(|enemy| enemy.cell().manhattan_distance(cell))
        .min()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walks_into_adjacent_plain_enemy() {
        let mut world = World::new();
        let _ = world
            .place_enemy(CellCoord::new(11, 7), EnemyKind::Plain)
            .expect("open cell");

        assert_eq!(
            Autopilot::new(1).choose(&world),
            Action::Move(Direction::East)
        );
    }

    #[test]
    fn fires_when_enemy_is_in_reach() {
        let mut world = World::new();
        world.set_player_energy(10);
        let _ = world
            .place_enemy(CellCoord::new(10, 4), EnemyKind::WallForming)
            .expect("open cell");

        assert_eq!(Autopilot::new(1).choose(&world), Action::Fire);
    }

    #[test]
    fn steps_away_from_enemies() {
        let mut world = World::new();
        let _ = world
            .place_enemy(CellCoord::new(10, 5), EnemyKind::WallForming)
            .expect("open cell");

        let choice = Autopilot::new(1).choose(&world);

        assert!(
            matches!(choice, Action::Move(direction) if direction != Direction::North),
            "{choice:?} moves toward the enemy"
        );
    }

    #[test]
    fn waits_when_boxed_in() {
        let mut world = World::new();
        world.set_player_cell(CellCoord::new(1, 1));
        world
            .raise_wall(CellCoord::new(2, 1))
            .expect("interior cell");
        world
            .raise_wall(CellCoord::new(1, 2))
            .expect("interior cell");

        assert_eq!(Autopilot::new(1).choose(&world), Action::Wait);
    }
}
