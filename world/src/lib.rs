#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Grid Pulse.
//!
//! The world owns the grid, the player, the enemy registry, the path field
//! and every live pulse. It only changes through [`apply`], and it answers
//! each command with the [`Event`] values describing what happened.

pub mod enemies;
pub mod grid;
pub mod navigation;
pub mod pulse;

use std::{collections::VecDeque, time::Duration};

use gridpulse_core::{
    CellCoord, ChargeLevel, Command, Direction, EnemyKind, Event, KillCause, MatchStatus,
    SpawnCorner, DEFAULT_WIN_ENERGY, GRID_COLUMNS, GRID_ROWS, WELCOME_BANNER,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::{
    enemies::{Advance, EnemyRegistry, SpawnError},
    grid::Grid,
    navigation::PathField,
    pulse::{Pulse, PulseProgress},
};

/// Seed used for shuffled tie breaks unless configured otherwise.
pub const DEFAULT_RNG_SEED: u64 = 0x42f0_e1eb_d4a5_3c21;

/// Strategy used to break ties between equally short routes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TieBreak {
    /// Neighbours are expanded in grid order, so routes are reproducible
    /// without a seed.
    #[default]
    Ordered,
    /// Neighbour lists are shuffled with the world's seeded generator.
    Shuffled,
}

/// Parameters fixed for the lifetime of a world.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Options {
    /// Tie-break strategy of every path field rebuild.
    pub tie_break: TieBreak,
    /// Seed of the generator used by [`TieBreak::Shuffled`].
    pub rng_seed: u64,
    /// Energy that wins the match. Zero is treated as one.
    pub win_energy: u32,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            tie_break: TieBreak::Ordered,
            rng_seed: DEFAULT_RNG_SEED,
            win_energy: DEFAULT_WIN_ENERGY,
        }
    }
}

/// The player's position and stored energy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Player {
    cell: CellCoord,
    energy: u32,
}

impl Player {
    /// Cell the player occupies.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }

    /// Energy collected since the last pulse.
    #[must_use]
    pub const fn energy(&self) -> u32 {
        self.energy
    }

    /// Charge level derived from the stored energy.
    #[must_use]
    pub fn charge_level(&self) -> ChargeLevel {
        ChargeLevel::from_energy(self.energy)
    }

    fn gain_energy(&mut self) {
        self.energy = self.energy.saturating_add(1);
    }
}

enum Step {
    Moved,
    Killed,
    Blocked,
}

/// Represents the authoritative Grid Pulse world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    grid: Grid,
    player: Player,
    enemies: EnemyRegistry,
    field: PathField,
    charge: Option<Pulse>,
    bursts: Vec<Pulse>,
    status: MatchStatus,
    options: Options,
    rng: ChaCha8Rng,
    spawn_backlog: [VecDeque<EnemyKind>; 4],
}

impl World {
    /// Creates a world on the standard grid with the player at its centre.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(Options::default())
    }

    /// Creates a world using the provided options.
    #[must_use]
    pub fn with_options(options: Options) -> Self {
        let grid = Grid::standard();
        let player = Player {
            cell: CellCoord::new(GRID_COLUMNS / 2, GRID_ROWS / 2),
            energy: 0,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(options.rng_seed);
        let field = build_field(&grid, player.cell, options.tie_break, &mut rng);

        Self {
            banner: WELCOME_BANNER,
            grid,
            player,
            enemies: EnemyRegistry::new(),
            field,
            charge: None,
            bursts: Vec::new(),
            status: MatchStatus::Running,
            options: Options {
                win_energy: options.win_energy.max(1),
                ..options
            },
            rng,
            spawn_backlog: Default::default(),
        }
    }

    fn rebuild_field(&mut self, out_events: &mut Vec<Event>) {
        let goal = self.player.cell;
        self.field = build_field(&self.grid, goal, self.options.tie_break, &mut self.rng);
        out_events.push(Event::PathFieldRebuilt {
            goal,
            reachable: u32::try_from(self.field.len()).unwrap_or(u32::MAX),
        });
    }

    fn ensure_field_current(&mut self, out_events: &mut Vec<Event>) {
        if !self.field.is_current(&self.grid) || self.field.goal() != self.player.cell {
            self.rebuild_field(out_events);
        }
    }

    fn move_player(&mut self, direction: Direction, out_events: &mut Vec<Event>) {
        let origin = self.player.cell;
        match self.try_step(direction, true, out_events) {
            Step::Moved => {}
            Step::Killed => {
                if let Step::Blocked = self.try_step(direction, false, out_events) {
                    log::debug!("bonus step {direction:?} blocked");
                }
            }
            Step::Blocked => {
                log::debug!(
                    "player at ({}, {}) blocked moving {direction:?}",
                    origin.column(),
                    origin.row()
                );
                out_events.push(Event::PlayerBlocked {
                    cell: origin,
                    direction,
                });
            }
        }

        if self.player.cell != origin {
            self.rebuild_field(out_events);
        }
        self.check_victory(out_events);
    }

    fn try_step(
        &mut self,
        direction: Direction,
        contact_kills: bool,
        out_events: &mut Vec<Event>,
    ) -> Step {
        let from = self.player.cell;
        let Some(to) = from.step(direction).filter(|cell| self.grid.is_open(*cell)) else {
            return Step::Blocked;
        };

        let occupant = self
            .enemies
            .find_in_cell(to)
            .map(|enemy| (enemy.id(), enemy.kind()));
        let step = match occupant {
            None => Step::Moved,
            Some((enemy_id, EnemyKind::Plain)) if contact_kills => {
                let _ = self.enemies.kill(enemy_id);
                out_events.push(Event::EnemyKilled {
                    enemy_id,
                    cell: to,
                    cause: KillCause::Contact,
                });
                self.bursts.push(Pulse::burst(to));
                Step::Killed
            }
            Some(_) => return Step::Blocked,
        };

        self.player.cell = to;
        self.player.gain_energy();
        out_events.push(Event::PlayerMoved { from, to });
        step
    }

    fn fire_pulse(&mut self, out_events: &mut Vec<Event>) {
        if self.charge.is_some() {
            log::debug!("pulse refused while the previous one is expanding");
            out_events.push(Event::PulseRefused);
            return;
        }

        let origin = self.player.cell;
        let pulse = Pulse::charge(origin, self.player.energy);
        out_events.push(Event::PulseFired {
            origin,
            target_radius: pulse.target_radius(),
        });
        self.player.energy = 0;
        self.charge = Some(pulse);
    }

    fn spawn_enemy(&mut self, corner: SpawnCorner, kind: EnemyKind, out_events: &mut Vec<Event>) {
        let backlog = &mut self.spawn_backlog[corner.index()];
        if !backlog.is_empty() {
            backlog.push_back(kind);
            out_events.push(Event::SpawnDeferred { corner });
            return;
        }

        match self.enemies.spawn(&self.grid, corner, kind) {
            Ok(enemy_id) => out_events.push(Event::EnemySpawned {
                enemy_id,
                cell: corner.cell(self.grid.columns(), self.grid.rows()),
                kind,
            }),
            Err(error @ SpawnError::Occupied { .. }) => {
                log::debug!("spawn at {corner:?} deferred: {error}");
                backlog.push_back(kind);
                out_events.push(Event::SpawnDeferred { corner });
            }
            Err(error @ SpawnError::Walled { .. }) => {
                log::debug!("spawn at {corner:?} refused: {error}");
                out_events.push(Event::SpawnRefused { corner });
            }
        }
    }

    /// Spawns at most one waiting enemy per corner. A corner that has been
    /// walled since the requests arrived drops its whole backlog.
    fn retry_spawn_backlog(&mut self, out_events: &mut Vec<Event>) {
        for corner in SpawnCorner::ALL {
            let backlog = &mut self.spawn_backlog[corner.index()];
            let Some(&kind) = backlog.front() else {
                continue;
            };

            match self.enemies.spawn(&self.grid, corner, kind) {
                Ok(enemy_id) => {
                    let _ = backlog.pop_front();
                    out_events.push(Event::EnemySpawned {
                        enemy_id,
                        cell: corner.cell(self.grid.columns(), self.grid.rows()),
                        kind,
                    });
                }
                Err(SpawnError::Occupied { .. }) => {}
                Err(error @ SpawnError::Walled { .. }) => {
                    log::debug!(
                        "dropping {} waiting spawns at {corner:?}: {error}",
                        backlog.len()
                    );
                    for _ in backlog.drain(..) {
                        out_events.push(Event::SpawnRefused { corner });
                    }
                }
            }
        }
    }

    fn advance_enemies(&mut self, out_events: &mut Vec<Event>) {
        self.ensure_field_current(out_events);

        let mut expired = Vec::new();
        for outcome in self.enemies.advance_all(&self.field) {
            match outcome {
                Advance::Moved { enemy_id, from, to } => {
                    out_events.push(Event::EnemyAdvanced { enemy_id, from, to });
                }
                Advance::Expired { enemy_id, from, to } => {
                    out_events.push(Event::EnemyAdvanced { enemy_id, from, to });
                    expired.push((enemy_id, to));
                }
                Advance::ReachedGoal { enemy_id, cell } => {
                    if self.enemies.kill(enemy_id).is_some() {
                        out_events.push(Event::EnemyDespawned { enemy_id, cell });
                    }
                }
                Advance::Contested {
                    enemy_id, wanted, ..
                } => {
                    log::trace!(
                        "enemy {} waits for ({}, {})",
                        enemy_id.get(),
                        wanted.column(),
                        wanted.row()
                    );
                }
                Advance::Stranded { enemy_id, .. } => {
                    log::trace!("enemy {} cannot reach the player", enemy_id.get());
                }
            }
        }

        self.resolve_player_collision(out_events);

        let mut walls_formed = false;
        for (enemy_id, cell) in expired {
            if self.enemies.kill(enemy_id).is_none() {
                continue;
            }
            match self.grid.flip(cell) {
                Ok(_) => {
                    log::info!(
                        "enemy {} hardened into a wall at ({}, {})",
                        enemy_id.get(),
                        cell.column(),
                        cell.row()
                    );
                    out_events.push(Event::WallFormed { enemy_id, cell });
                    walls_formed = true;
                }
                Err(error) => log::warn!("enemy {} could not form a wall: {error}", enemy_id.get()),
            }
        }

        if walls_formed {
            self.rebuild_field(out_events);
        }
    }

    fn tick(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        out_events.push(Event::TimeAdvanced { dt });

        let completed = self
            .charge
            .as_mut()
            .map_or(false, |pulse| pulse.step() == PulseProgress::Completed);
        if completed {
            self.charge = None;
            out_events.push(Event::PulseCompleted);
        }
        self.bursts
            .retain_mut(|burst| burst.step() == PulseProgress::Growing);

        if self.status.is_running() {
            for enemy in self.enemies.detect_pulse_collisions(self.charge.as_ref()) {
                self.player.gain_energy();
                self.bursts.push(Pulse::burst(enemy.cell()));
                out_events.push(Event::EnemyKilled {
                    enemy_id: enemy.id(),
                    cell: enemy.cell(),
                    cause: KillCause::Pulse,
                });
            }
            self.retry_spawn_backlog(out_events);
        }

        for change in self.enemies.update_shades() {
            out_events.push(Event::EnemyShaded {
                enemy_id: change.enemy_id,
                shade: change.shade,
            });
        }

        self.resolve_player_collision(out_events);
        self.check_victory(out_events);
    }

    fn resolve_player_collision(&mut self, out_events: &mut Vec<Event>) {
        if !self.status.is_running() {
            return;
        }
        let cell = self.player.cell;
        let Some(enemy_id) = self.enemies.detect_player_collisions(cell) else {
            return;
        };

        if self.enemies.kill(enemy_id).is_some() {
            out_events.push(Event::EnemyKilled {
                enemy_id,
                cell,
                cause: KillCause::Collision,
            });
        }
        self.bursts.push(Pulse::burst(cell));
        self.status = MatchStatus::Lost;
        log::info!(
            "enemy {} caught the player at ({}, {})",
            enemy_id.get(),
            cell.column(),
            cell.row()
        );
        out_events.push(Event::PlayerDied { cell, enemy_id });
    }

    fn check_victory(&mut self, out_events: &mut Vec<Event>) {
        if !self.status.is_running() || self.player.energy < self.options.win_energy {
            return;
        }
        self.status = MatchStatus::Won;
        log::info!("match won with {} energy", self.player.energy);
        out_events.push(Event::MatchWon {
            energy: self.player.energy,
        });
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(any(test, feature = "scenario_scaffolding"))]
impl World {
    /// Places an enemy on an arbitrary open cell, bypassing the spawn corners.
    pub fn place_enemy(
        &mut self,
        cell: CellCoord,
        kind: EnemyKind,
    ) -> Result<gridpulse_core::EnemyId, SpawnError> {
        self.enemies.spawn_at(&self.grid, cell, kind)
    }

    /// Teleports the player. The path field follows on the next enemy advance.
    pub fn set_player_cell(&mut self, cell: CellCoord) {
        self.player.cell = cell;
    }

    /// Overrides the player's stored energy.
    pub fn set_player_energy(&mut self, energy: u32) {
        self.player.energy = energy;
    }

    /// Turns the cell into a wall if it is not one already.
    pub fn raise_wall(&mut self, cell: CellCoord) -> Result<(), grid::GridError> {
        if !self.grid.is_wall(cell) {
            let _ = self.grid.flip(cell)?;
        }
        Ok(())
    }
}

fn build_field(grid: &Grid, goal: CellCoord, tie_break: TieBreak, rng: &mut ChaCha8Rng) -> PathField {
    match tie_break {
        TieBreak::Ordered => PathField::compute(grid, goal),
        TieBreak::Shuffled => PathField::compute_shuffled(grid, goal, rng),
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => world.tick(dt, out_events),
        command if !world.status.is_running() => {
            log::debug!("ignoring {command:?} after the match ended");
        }
        Command::MovePlayer { direction } => world.move_player(direction, out_events),
        Command::FirePulse => world.fire_pulse(out_events),
        Command::Wait => out_events.push(Event::PlayerWaited {
            cell: world.player.cell,
        }),
        Command::AdvanceEnemies => world.advance_enemies(out_events),
        Command::SpawnEnemy { corner, kind } => world.spawn_enemy(corner, kind, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use gridpulse_core::{CellCoord, ChargeLevel, EnemyId, EnemyKind, MatchStatus};

    use std::collections::VecDeque;

    use super::{EnemyRegistry, Grid, PathField, Player, Pulse, World};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides read-only access to the grid.
    #[must_use]
    pub fn grid(world: &World) -> &Grid {
        &world.grid
    }

    /// Provides read-only access to the player.
    #[must_use]
    pub fn player(world: &World) -> &Player {
        &world.player
    }

    /// Provides read-only access to the enemy registry.
    #[must_use]
    pub fn enemies(world: &World) -> &EnemyRegistry {
        &world.enemies
    }

    /// Captures a read-only view of the live enemies.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        let mut snapshots: Vec<EnemySnapshot> = world
            .enemies
            .iter()
            .map(|enemy| EnemySnapshot {
                id: enemy.id(),
                cell: enemy.cell(),
                kind: enemy.kind(),
                lifetime: enemy.lifespan().map(|lifespan| lifespan.remaining()),
                shade: enemy.lifespan().map_or(0, |lifespan| lifespan.shade()),
            })
            .collect();
        snapshots.sort_by_key(|snapshot| snapshot.id);
        EnemyView { snapshots }
    }

    /// Path field the enemies currently follow.
    #[must_use]
    pub fn path_field(world: &World) -> &PathField {
        &world.field
    }

    /// The player's pulse while it is expanding.
    #[must_use]
    pub fn charge_pulse(world: &World) -> Option<&Pulse> {
        world.charge.as_ref()
    }

    /// Every live pulse, the player's pulse first.
    pub fn pulses(world: &World) -> impl Iterator<Item = &Pulse> {
        world.charge.iter().chain(world.bursts.iter())
    }

    /// Lifecycle of the match.
    #[must_use]
    pub fn status(world: &World) -> MatchStatus {
        world.status
    }

    /// Charge level of the player's stored energy.
    #[must_use]
    pub fn charge_level(world: &World) -> ChargeLevel {
        world.player.charge_level()
    }

    /// Energy that wins the match.
    #[must_use]
    pub fn win_energy(world: &World) -> u32 {
        world.options.win_energy
    }

    /// Spawn requests waiting for their corner to be vacated.
    #[must_use]
    pub fn spawn_backlog(world: &World) -> usize {
        world.spawn_backlog.iter().map(VecDeque::len).sum()
    }

    /// Read-only snapshot describing all live enemies.
    #[derive(Clone, Debug)]
    pub struct EnemyView {
        snapshots: Vec<EnemySnapshot>,
    }

    impl EnemyView {
        /// Iterator over the captured snapshots ordered by identifier.
        pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
            self.snapshots.iter()
        }

        /// Consumes the view, yielding the underlying snapshots.
        pub fn into_vec(self) -> Vec<EnemySnapshot> {
            self.snapshots
        }
    }

    /// Immutable representation of a single enemy.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct EnemySnapshot {
        /// Unique identifier assigned to the enemy.
        pub id: EnemyId,
        /// Grid cell currently occupied by the enemy.
        pub cell: CellCoord,
        /// Behaviour tag of the enemy.
        pub kind: EnemyKind,
        /// Remaining steps of a wall-forming enemy.
        pub lifetime: Option<u8>,
        /// Darken/grow transitions fired so far.
        pub shade: u8,
    }
}
