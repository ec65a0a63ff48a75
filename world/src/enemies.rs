//! Live enemies, their movement along the path field and their lifecycle.

use std::collections::HashSet;

use glam::Vec2;
use gridpulse_core::{
    CellCoord, EnemyId, EnemyKind, SpawnCorner, SHADE_THRESHOLDS, WALL_FORMING_LIFETIME,
};
use thiserror::Error;

use crate::{
    grid::Grid,
    navigation::{NextHop, PathField},
    pulse::{cell_center, Pulse},
};

/// Reasons a spawn request cannot be honoured.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum SpawnError {
    /// The spawn cell is a wall, e.g. because an enemy hardened there.
    #[error("spawn cell ({column}, {row}) is a wall")]
    Walled {
        /// Column of the spawn cell.
        column: u32,
        /// Row of the spawn cell.
        row: u32,
    },
    /// Another enemy already stands on the spawn cell.
    #[error("spawn cell ({column}, {row}) already holds enemy {occupant:?}")]
    Occupied {
        /// Column of the spawn cell.
        column: u32,
        /// Row of the spawn cell.
        row: u32,
        /// Enemy standing on the cell.
        occupant: EnemyId,
    },
}

/// Countdown carried by wall-forming enemies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Lifespan {
    remaining: u8,
    shade: u8,
    armed: bool,
}

impl Lifespan {
    /// Fresh countdown of [`WALL_FORMING_LIFETIME`] steps.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            remaining: WALL_FORMING_LIFETIME,
            shade: 0,
            armed: false,
        }
    }

    /// Steps left before the enemy hardens into a wall.
    #[must_use]
    pub const fn remaining(&self) -> u8 {
        self.remaining
    }

    /// Number of darken/grow transitions fired so far.
    #[must_use]
    pub const fn shade(&self) -> u8 {
        self.shade
    }

    /// Consumes one step and re-arms the shade transition. Returns `true` once
    /// the countdown hits zero.
    fn spend_step(&mut self) -> bool {
        self.remaining = self.remaining.saturating_sub(1);
        self.armed = true;
        self.remaining == 0
    }

    fn settle_shade(&mut self) -> Option<u8> {
        if !self.armed || !SHADE_THRESHOLDS.contains(&self.remaining) {
            return None;
        }
        self.armed = false;
        self.shade = self.shade.saturating_add(1);
        Some(self.shade)
    }
}

impl Default for Lifespan {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-kind state of an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Behavior {
    /// Plain hostile without extra state.
    Plain,
    /// Hostile that hardens into a wall when its lifespan runs out.
    WallForming(Lifespan),
}

impl Behavior {
    /// Initial state for an enemy of the provided kind.
    #[must_use]
    pub const fn for_kind(kind: EnemyKind) -> Self {
        match kind {
            EnemyKind::Plain => Self::Plain,
            EnemyKind::WallForming => Self::WallForming(Lifespan::new()),
        }
    }
}

/// A single live enemy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Enemy {
    id: EnemyId,
    cell: CellCoord,
    behavior: Behavior,
}

impl Enemy {
    /// Identifier assigned at spawn time.
    #[must_use]
    pub const fn id(&self) -> EnemyId {
        self.id
    }

    /// Cell the enemy currently occupies.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }

    /// Per-kind state of the enemy.
    #[must_use]
    pub const fn behavior(&self) -> &Behavior {
        &self.behavior
    }

    /// Kind tag of the enemy.
    #[must_use]
    pub const fn kind(&self) -> EnemyKind {
        match self.behavior {
            Behavior::Plain => EnemyKind::Plain,
            Behavior::WallForming(_) => EnemyKind::WallForming,
        }
    }

    /// Countdown of a wall-forming enemy.
    #[must_use]
    pub const fn lifespan(&self) -> Option<&Lifespan> {
        match &self.behavior {
            Behavior::Plain => None,
            Behavior::WallForming(lifespan) => Some(lifespan),
        }
    }

    /// Pixel centre of the enemy's cell.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        cell_center(self.cell)
    }

    fn step_to(&mut self, to: CellCoord) -> Advance {
        let from = self.cell;
        self.cell = to;
        let expired = match &mut self.behavior {
            Behavior::Plain => false,
            Behavior::WallForming(lifespan) => lifespan.spend_step(),
        };

        if expired {
            Advance::Expired {
                enemy_id: self.id,
                from,
                to,
            }
        } else {
            Advance::Moved {
                enemy_id: self.id,
                from,
                to,
            }
        }
    }
}

/// What happened to one enemy during [`EnemyRegistry::advance_all`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Advance {
    /// The enemy stepped one cell closer to the goal.
    Moved {
        /// Enemy that moved.
        enemy_id: EnemyId,
        /// Cell left behind.
        from: CellCoord,
        /// Cell entered.
        to: CellCoord,
    },
    /// A wall-forming enemy stepped and used up its lifespan. The caller
    /// removes it and walls `to`.
    Expired {
        /// Enemy that expired.
        enemy_id: EnemyId,
        /// Cell left behind.
        from: CellCoord,
        /// Cell the enemy expired on.
        to: CellCoord,
    },
    /// The enemy already stands on the goal. The caller despawns it.
    ReachedGoal {
        /// Enemy on the goal.
        enemy_id: EnemyId,
        /// The goal cell.
        cell: CellCoord,
    },
    /// The next hop was occupied before the pass or claimed earlier in it.
    Contested {
        /// Enemy that stayed in place.
        enemy_id: EnemyId,
        /// Cell the enemy remains on.
        cell: CellCoord,
        /// Cell it wanted to enter.
        wanted: CellCoord,
    },
    /// The enemy's cell cannot reach the goal, so it stays in place.
    Stranded {
        /// Enemy that stayed in place.
        enemy_id: EnemyId,
        /// Cell the enemy remains on.
        cell: CellCoord,
    },
}

/// Darken/grow transition fired by [`EnemyRegistry::update_shades`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShadeChange {
    /// Enemy that changed appearance.
    pub enemy_id: EnemyId,
    /// Number of transitions fired so far for the enemy.
    pub shade: u8,
}

/// Collection of live enemies, owned by the main loop.
#[derive(Clone, Debug, Default)]
pub struct EnemyRegistry {
    enemies: Vec<Enemy>,
    next_id: u32,
}

impl EnemyRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns an enemy at the cell of the provided corner.
    pub fn spawn(
        &mut self,
        grid: &Grid,
        corner: SpawnCorner,
        kind: EnemyKind,
    ) -> Result<EnemyId, SpawnError> {
        self.spawn_at(grid, corner.cell(grid.columns(), grid.rows()), kind)
    }

    /// Spawns an enemy on an arbitrary open, unoccupied cell.
    pub fn spawn_at(
        &mut self,
        grid: &Grid,
        cell: CellCoord,
        kind: EnemyKind,
    ) -> Result<EnemyId, SpawnError> {
        if grid.is_wall(cell) {
            return Err(SpawnError::Walled {
                column: cell.column(),
                row: cell.row(),
            });
        }
        if let Some(occupant) = self.find_in_cell(cell) {
            return Err(SpawnError::Occupied {
                column: cell.column(),
                row: cell.row(),
                occupant: occupant.id,
            });
        }

        let id = EnemyId::new(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.enemies.push(Enemy {
            id,
            cell,
            behavior: Behavior::for_kind(kind),
        });
        Ok(id)
    }

    /// Moves every enemy one step along the field, in registry order.
    ///
    /// A step is refused when its target was occupied before the pass began
    /// or was already claimed by an earlier enemy in this pass, so no two
    /// enemies share a cell afterwards. Enemies are never removed here; the
    /// caller interprets [`Advance::ReachedGoal`] and [`Advance::Expired`].
    pub fn advance_all(&mut self, field: &PathField) -> Vec<Advance> {
        let occupied: HashSet<CellCoord> = self.enemies.iter().map(|enemy| enemy.cell).collect();
        let mut claimed: HashSet<CellCoord> = HashSet::with_capacity(self.enemies.len());
        let mut outcomes = Vec::with_capacity(self.enemies.len());

        for enemy in &mut self.enemies {
            let cell = enemy.cell;
            let outcome = match field.next_hop(cell) {
                None => Advance::Stranded {
                    enemy_id: enemy.id,
                    cell,
                },
                Some(NextHop::Goal) => Advance::ReachedGoal {
                    enemy_id: enemy.id,
                    cell,
                },
                Some(NextHop::Step(next)) => {
                    if occupied.contains(&next) || !claimed.insert(next) {
                        Advance::Contested {
                            enemy_id: enemy.id,
                            cell,
                            wanted: next,
                        }
                    } else {
                        enemy.step_to(next)
                    }
                }
            };
            outcomes.push(outcome);
        }

        outcomes
    }

    /// Removes the enemy. Removing an absent enemy is a no-op returning `None`.
    pub fn kill(&mut self, enemy_id: EnemyId) -> Option<Enemy> {
        let Some(index) = self.enemies.iter().position(|enemy| enemy.id == enemy_id) else {
            log::debug!("enemy {} was already removed", enemy_id.get());
            return None;
        };
        Some(self.enemies.remove(index))
    }

    /// First enemy standing on the cell.
    #[must_use]
    pub fn find_in_cell(&self, cell: CellCoord) -> Option<&Enemy> {
        self.enemies.iter().find(|enemy| enemy.cell == cell)
    }

    /// Enemy with the provided identifier.
    #[must_use]
    pub fn get(&self, enemy_id: EnemyId) -> Option<&Enemy> {
        self.enemies.iter().find(|enemy| enemy.id == enemy_id)
    }

    /// Removes and returns every enemy whose centre the pulse overlaps.
    pub fn detect_pulse_collisions(&mut self, pulse: Option<&Pulse>) -> Vec<Enemy> {
        let Some(pulse) = pulse else {
            return Vec::new();
        };

        let (hit, kept): (Vec<Enemy>, Vec<Enemy>) = std::mem::take(&mut self.enemies)
            .into_iter()
            .partition(|enemy| pulse.overlaps(enemy.center()));
        self.enemies = kept;
        hit
    }

    /// First enemy sharing the player's cell, if any.
    #[must_use]
    pub fn detect_player_collisions(&self, player_cell: CellCoord) -> Option<EnemyId> {
        self.find_in_cell(player_cell).map(Enemy::id)
    }

    /// Fires pending darken/grow transitions of wall-forming enemies.
    pub fn update_shades(&mut self) -> Vec<ShadeChange> {
        self.enemies
            .iter_mut()
            .filter_map(|enemy| match &mut enemy.behavior {
                Behavior::Plain => None,
                Behavior::WallForming(lifespan) => lifespan.settle_shade().map(|shade| {
                    ShadeChange {
                        enemy_id: enemy.id,
                        shade,
                    }
                }),
            })
            .collect()
    }

    /// Iterator over live enemies in registry order.
    pub fn iter(&self) -> impl Iterator<Item = &Enemy> {
        self.enemies.iter()
    }

    /// Number of live enemies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.enemies.len()
    }

    /// Reports whether no enemy is alive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.enemies.is_empty()
    }
}
