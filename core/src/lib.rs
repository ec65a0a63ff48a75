#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Grid Pulse engine.
//!
//! Adapters and systems never touch the authoritative world directly. They
//! submit [`Command`] values, the world executes them through its `apply`
//! entry point, and it answers with [`Event`] values describing what actually
//! happened. The spawner thread speaks the same language: it only ever sends
//! [`Command::SpawnEnemy`] requests to the main loop.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Grid Pulse.";

/// Number of cell columns in the playfield, border included.
pub const GRID_COLUMNS: u32 = 21;

/// Number of cell rows in the playfield, border included.
pub const GRID_ROWS: u32 = 15;

/// Edge length of a single cell in pixels.
pub const CELL_SIZE: u32 = 32;

/// Simulated time between two spawn requests.
pub const SPAWN_INTERVAL: Duration = Duration::from_secs(2);

/// Number of movement steps a wall-forming enemy survives before it hardens.
pub const WALL_FORMING_LIFETIME: u8 = 20;

/// Remaining lifetimes at which a wall-forming enemy darkens and grows.
pub const SHADE_THRESHOLDS: [u8; 5] = [10, 5, 3, 2, 1];

/// Energy required to reach each charge level, indexed by level.
pub const CHARGE_THRESHOLDS: [u32; 5] = [0, 1, 10, 25, 75];

/// Radius every pulse starts with, in pixels.
pub const PULSE_START_RADIUS: u32 = 2;

/// Target pulse radius gained per point of energy spent, in pixels.
pub const PULSE_RADIUS_PER_ENERGY: u32 = 10;

/// Extra reach added to a pulse radius when testing enemy overlap.
pub const PULSE_OVERLAP_SLACK: u32 = 2;

/// Target radius of the cosmetic burst shown on kills and on death.
pub const BURST_RADIUS: u32 = 16;

/// Spawn rolls are drawn uniformly from `0..WALL_FORMING_ODDS`.
pub const WALL_FORMING_ODDS: u32 = 4;

/// Energy that wins the match unless configured otherwise.
pub const DEFAULT_WIN_ENERGY: u32 = 100;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Requests that the player step one cell in the provided direction.
    MovePlayer {
        /// Direction of the attempted step.
        direction: Direction,
    },
    /// Requests that the player spend all energy on a pulse.
    FirePulse,
    /// Spends a turn without moving.
    Wait,
    /// Advances every live enemy one step along the current path field.
    AdvanceEnemies,
    /// Requests a new enemy at one of the spawn corners.
    SpawnEnemy {
        /// Corner the enemy appears at.
        corner: SpawnCorner,
        /// Behaviour assigned to the new enemy.
        kind: EnemyKind,
    },
    /// Advances frame-driven state (pulses, shading, collision checks).
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that the frame clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that the player moved between two cells.
    PlayerMoved {
        /// Cell the player occupied before moving.
        from: CellCoord,
        /// Cell the player occupies after moving.
        to: CellCoord,
    },
    /// Reports that a requested player step was not applied.
    PlayerBlocked {
        /// Cell the player remains in.
        cell: CellCoord,
        /// Direction of the refused step.
        direction: Direction,
    },
    /// Confirms that the player spent a turn in place.
    PlayerWaited {
        /// Cell the player occupies.
        cell: CellCoord,
    },
    /// Confirms that the player released a pulse.
    PulseFired {
        /// Cell the pulse is centred on.
        origin: CellCoord,
        /// Radius in pixels at which the pulse completes.
        target_radius: u32,
    },
    /// Reports that a pulse could not be fired because one is still expanding.
    PulseRefused,
    /// Announces that the player's pulse reached its target radius.
    PulseCompleted,
    /// Confirms that an enemy entered the grid.
    EnemySpawned {
        /// Identifier assigned to the new enemy.
        enemy_id: EnemyId,
        /// Cell the enemy occupies after spawning.
        cell: CellCoord,
        /// Behaviour of the new enemy.
        kind: EnemyKind,
    },
    /// Reports that a spawn request was dropped because its corner is walled.
    SpawnRefused {
        /// Corner named by the dropped request.
        corner: SpawnCorner,
    },
    /// Reports that a spawn request waits until its corner is vacated.
    SpawnDeferred {
        /// Corner named by the waiting request.
        corner: SpawnCorner,
    },
    /// Confirms that an enemy stepped between two cells.
    EnemyAdvanced {
        /// Identifier of the enemy that moved.
        enemy_id: EnemyId,
        /// Cell the enemy occupied before moving.
        from: CellCoord,
        /// Cell the enemy occupies after moving.
        to: CellCoord,
    },
    /// Announces that an enemy standing on the goal left the grid.
    EnemyDespawned {
        /// Identifier of the departed enemy.
        enemy_id: EnemyId,
        /// Cell the enemy occupied.
        cell: CellCoord,
    },
    /// Announces that an enemy was destroyed.
    EnemyKilled {
        /// Identifier of the destroyed enemy.
        enemy_id: EnemyId,
        /// Cell the enemy occupied.
        cell: CellCoord,
        /// What destroyed the enemy.
        cause: KillCause,
    },
    /// Announces that an expired wall-forming enemy hardened into a wall.
    WallFormed {
        /// Identifier of the expired enemy.
        enemy_id: EnemyId,
        /// Cell that became a wall.
        cell: CellCoord,
    },
    /// Announces a darken/grow transition of a wall-forming enemy.
    EnemyShaded {
        /// Identifier of the enemy that changed appearance.
        enemy_id: EnemyId,
        /// Number of transitions fired so far.
        shade: u8,
    },
    /// Confirms that the path field was rebuilt around a new goal.
    PathFieldRebuilt {
        /// Goal cell the field leads to.
        goal: CellCoord,
        /// Number of cells that can reach the goal, goal included.
        reachable: u32,
    },
    /// Announces that an enemy caught the player.
    PlayerDied {
        /// Cell the player occupied.
        cell: CellCoord,
        /// Enemy that shared the cell.
        enemy_id: EnemyId,
    },
    /// Announces that the player collected enough energy to win.
    MatchWon {
        /// Energy held at the moment of victory.
        energy: u32,
    },
}

/// Cardinal movement directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// Every direction in clockwise order starting north.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Behaviour tag of an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Killable by pulse or by the player walking into it.
    Plain,
    /// Killable only by pulse; hardens into a wall when its lifetime runs out.
    WallForming,
}

impl EnemyKind {
    /// Maps a uniform roll from `0..WALL_FORMING_ODDS` onto a kind.
    ///
    /// Zero selects [`EnemyKind::WallForming`], every other value
    /// [`EnemyKind::Plain`].
    #[must_use]
    pub const fn from_roll(roll: u32) -> Self {
        if roll == 0 {
            Self::WallForming
        } else {
            Self::Plain
        }
    }
}

/// The four spawn points, each inset diagonally by one cell from a grid corner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SpawnCorner {
    /// Upper-left corner.
    NorthWest,
    /// Upper-right corner.
    NorthEast,
    /// Lower-right corner.
    SouthEast,
    /// Lower-left corner.
    SouthWest,
}

impl SpawnCorner {
    /// Every corner ordered by index.
    pub const ALL: [SpawnCorner; 4] = [
        SpawnCorner::NorthWest,
        SpawnCorner::NorthEast,
        SpawnCorner::SouthEast,
        SpawnCorner::SouthWest,
    ];

    /// Position of the corner within [`SpawnCorner::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::NorthWest => 0,
            Self::NorthEast => 1,
            Self::SouthEast => 2,
            Self::SouthWest => 3,
        }
    }

    /// Cell the corner resolves to on a grid with the provided dimensions.
    ///
    /// Grids narrower than three cells collapse every corner onto the
    /// outermost row or column instead of underflowing.
    #[must_use]
    pub fn cell(self, columns: u32, rows: u32) -> CellCoord {
        let west = 1.min(columns.saturating_sub(1));
        let north = 1.min(rows.saturating_sub(1));
        let east = columns.saturating_sub(2).max(west);
        let south = rows.saturating_sub(2).max(north);
        match self {
            Self::NorthWest => CellCoord::new(west, north),
            Self::NorthEast => CellCoord::new(east, north),
            Self::SouthEast => CellCoord::new(east, south),
            Self::SouthWest => CellCoord::new(west, south),
        }
    }
}

/// What destroyed an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KillCause {
    /// The player walked into a plain enemy.
    Contact,
    /// The enemy was caught inside the player's pulse.
    Pulse,
    /// The enemy caught the player and was removed with it.
    Collision,
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Neighbouring cell in the provided direction.
    ///
    /// Returns `None` when the step would leave the non-negative quadrant;
    /// upper bounds are the grid's concern.
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<CellCoord> {
        match direction {
            Direction::North => Some(Self::new(self.column, self.row.checked_sub(1)?)),
            Direction::East => Some(Self::new(self.column.checked_add(1)?, self.row)),
            Direction::South => Some(Self::new(self.column, self.row.checked_add(1)?)),
            Direction::West => Some(Self::new(self.column.checked_sub(1)?, self.row)),
        }
    }
}

/// Discrete tier of stored energy gating pulse strength.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChargeLevel(u8);

impl ChargeLevel {
    /// Highest attainable level.
    pub const MAX: ChargeLevel = ChargeLevel(4);

    /// Maps an energy amount onto its level using [`CHARGE_THRESHOLDS`].
    #[must_use]
    pub fn from_energy(energy: u32) -> Self {
        let reached = CHARGE_THRESHOLDS
            .iter()
            .filter(|threshold| energy >= **threshold)
            .count();
        Self(u8::try_from(reached.saturating_sub(1)).unwrap_or(Self::MAX.0))
    }

    /// Numeric level in `0..=4`.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }
}

/// Lifecycle of a single match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum MatchStatus {
    /// The player is alive and below the win threshold.
    #[default]
    Running,
    /// The player collected the winning amount of energy.
    Won,
    /// An enemy caught the player.
    Lost,
}

impl MatchStatus {
    /// Reports whether the match accepts further gameplay commands.
    #[must_use]
    pub const fn is_running(self) -> bool {
        matches!(self, Self::Running)
    }
}
