#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Grid Pulse adapters.
//!
//! Backends never read the world. They receive a [`Scene`] captured through
//! the world's query API, expressed in the same pixel space the collision
//! checks use.

use std::{fmt::Write as _, time::Duration};

use anyhow::Result as AnyResult;
use glam::Vec2;
use gridpulse_core::{CellCoord, ChargeLevel, EnemyId, EnemyKind, MatchStatus, CELL_SIZE};
use gridpulse_world::{
    pulse::{cell_center, PulseKind},
    query, World,
};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns a new color darkened towards black by the provided amount.
    #[must_use]
    pub fn darken(self, amount: f32) -> Self {
        let keep = 1.0 - amount.clamp(0.0, 1.0);

        Self {
            red: self.red * keep,
            green: self.green * keep,
            blue: self.blue * keep,
            alpha: self.alpha,
        }
    }
}

/// Colors of the playfield.
pub mod palette {
    use super::Color;

    /// Open cell fill.
    pub const OPEN_CELL: Color = Color::from_rgb_u8(192, 192, 192);
    /// Wall cell fill.
    pub const WALL_CELL: Color = Color::from_rgb_u8(123, 94, 55);
    /// Outline drawn around open cells.
    pub const GRID_LINE: Color = Color::from_rgb_u8(160, 160, 160);
    /// Player disc.
    pub const PLAYER: Color = Color::from_rgb_u8(0, 218, 67);
    /// Enemy disc before any darkening.
    pub const ENEMY: Color = Color::from_rgb_u8(255, 0, 0);
    /// Outline of expanding pulses.
    pub const PULSE: Color = Color::from_rgb_u8(255, 255, 255);
}

/// Darkening applied per shade transition of a wall-forming enemy.
pub const SHADE_DARKEN_STEP: f32 = 0.12;

/// Radius gained per shade transition of a wall-forming enemy, in pixels.
pub const SHADE_GROWTH: f32 = 1.0;

/// Filled circle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Disc {
    /// Pixel centre.
    pub center: Vec2,
    /// Radius in pixels.
    pub radius: f32,
    /// Fill color.
    pub color: Color,
}

/// Enemy as drawn on the current frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyPresentation {
    /// Identifier of the enemy.
    pub id: EnemyId,
    /// Cell the enemy occupies.
    pub cell: CellCoord,
    /// Behaviour tag, used by text backends.
    pub kind: EnemyKind,
    /// Shape drawn for the enemy.
    pub disc: Disc,
}

/// One-pixel outline of an expanding pulse.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ring {
    /// Pixel centre.
    pub center: Vec2,
    /// Radius in pixels.
    pub radius: f32,
    /// Whether the ring belongs to the player's pulse rather than a burst.
    pub charge: bool,
    /// Outline color.
    pub color: Color,
}

/// Scene description combining the grid, its inhabitants and live pulses.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Number of cell columns.
    pub columns: u32,
    /// Number of cell rows.
    pub rows: u32,
    /// Edge length of one cell in pixels.
    pub cell_length: f32,
    /// Wall cells in row-major order.
    pub walls: Vec<CellCoord>,
    /// Cell the player occupies.
    pub player_cell: CellCoord,
    /// Shape drawn for the player.
    pub player: Disc,
    /// Live enemies ordered by identifier.
    pub enemies: Vec<EnemyPresentation>,
    /// Live pulses, the player's pulse first.
    pub pulses: Vec<Ring>,
    /// Energy held by the player.
    pub energy: u32,
    /// Charge level derived from the energy.
    pub charge_level: ChargeLevel,
    /// Lifecycle of the match.
    pub status: MatchStatus,
}

impl Scene {
    /// Captures the current world state.
    #[must_use]
    pub fn capture(world: &World) -> Self {
        let grid = query::grid(world);
        let player = query::player(world);
        let cell_length = CELL_SIZE as f32;

        let enemies = query::enemy_view(world)
            .iter()
            .map(|snapshot| {
                let shade = f32::from(snapshot.shade);
                EnemyPresentation {
                    id: snapshot.id,
                    cell: snapshot.cell,
                    kind: snapshot.kind,
                    disc: Disc {
                        center: cell_center(snapshot.cell),
                        radius: cell_length / 8.0 + shade * SHADE_GROWTH,
                        color: palette::ENEMY.darken(shade * SHADE_DARKEN_STEP),
                    },
                }
            })
            .collect();

        let pulses = query::pulses(world)
            .map(|pulse| Ring {
                center: pulse.center(),
                radius: pulse.radius() as f32,
                charge: pulse.kind() == PulseKind::Charge,
                color: palette::PULSE,
            })
            .collect();

        Self {
            columns: grid.columns(),
            rows: grid.rows(),
            cell_length,
            walls: grid.cells().filter(|cell| grid.is_wall(*cell)).collect(),
            player_cell: player.cell(),
            player: Disc {
                center: cell_center(player.cell()),
                radius: cell_length / 4.0,
                color: palette::PLAYER,
            },
            enemies,
            pulses,
            energy: player.energy(),
            charge_level: player.charge_level(),
            status: query::status(world),
        }
    }

    /// Width of the playfield in pixels.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.columns as f32 * self.cell_length
    }

    /// Height of the playfield in pixels.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.rows as f32 * self.cell_length
    }

    /// Renders the grid as text, one line per row.
    ///
    /// `#` marks walls, `@` the player, `e` plain enemies, `w` wall-forming
    /// enemies and `.` open cells. A caught player is drawn as `X`.
    #[must_use]
    pub fn to_ascii(&self) -> String {
        let width = self.columns as usize;
        let mut cells = vec!['.'; width * self.rows as usize];
        let mut mark = |cell: CellCoord, glyph: char| {
            let index = cell.row() as usize * width + cell.column() as usize;
            if let Some(slot) = cells.get_mut(index) {
                *slot = glyph;
            }
        };

        for wall in &self.walls {
            mark(*wall, '#');
        }
        for enemy in &self.enemies {
            let glyph = match enemy.kind {
                EnemyKind::Plain => 'e',
                EnemyKind::WallForming => 'w',
            };
            mark(enemy.cell, glyph);
        }
        let player_glyph = if self.status == MatchStatus::Lost {
            'X'
        } else {
            '@'
        };
        mark(self.player_cell, player_glyph);

        let mut board = String::with_capacity(cells.len() + self.rows as usize);
        for row in cells.chunks(width.max(1)) {
            board.extend(row.iter());
            board.push('\n');
        }
        board
    }

    /// One-line summary of the player's state.
    #[must_use]
    pub fn status_line(&self) -> String {
        let mut line = String::new();
        let status = match self.status {
            MatchStatus::Running => "running",
            MatchStatus::Won => "won",
            MatchStatus::Lost => "lost",
        };
        let _ = write!(
            line,
            "energy {} | charge {} | enemies {} | pulses {} | {status}",
            self.energy,
            self.charge_level.get(),
            self.enemies.len(),
            self.pulses.len()
        );
        line
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Decision returned by the per-frame update closure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameControl {
    /// Present the updated scene and keep running.
    Continue,
    /// Present the updated scene and stop.
    Exit,
}

/// Rendering backend capable of presenting Grid Pulse scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until the update closure asks it to exit.
    ///
    /// The provided `update_scene` closure receives the simulated frame delta
    /// and replaces the scene before it is presented.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, &mut Scene) -> AnyResult<FrameControl>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridpulse_core::{Command, Direction, Event};
    use gridpulse_world::apply;

    #[test]
    fn capture_matches_standard_world() {
        let world = World::new();

        let scene = Scene::capture(&world);

        assert_eq!(scene.width(), 672.0);
        assert_eq!(scene.height(), 480.0);
        assert_eq!(scene.walls.len(), 2 * 21 + 2 * 13);
        assert_eq!(scene.player.center, Vec2::new(336.0, 240.0));
        assert_eq!(scene.player.radius, 8.0);
        assert!(scene.enemies.is_empty());
        assert!(scene.pulses.is_empty());
    }

    #[test]
    fn wall_forming_enemies_darken_and_grow_with_shade() {
        let mut world = World::new();
        world.set_player_cell(CellCoord::new(19, 13));
        let _ = world
            .place_enemy(CellCoord::new(1, 1), EnemyKind::WallForming)
            .expect("open cell");
        let fresh = Scene::capture(&world).enemies[0];
        assert_eq!(fresh.disc.radius, 4.0);
        assert_eq!(fresh.disc.color, palette::ENEMY);

        for _ in 0..10 {
            let mut events = Vec::new();
            apply(&mut world, Command::AdvanceEnemies, &mut events);
        }
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(16),
            },
            &mut events,
        );
        assert!(events
            .iter()
            .any(|event| matches!(event, Event::EnemyShaded { shade: 1, .. })));

        let shaded = Scene::capture(&world).enemies[0];
        assert_eq!(shaded.disc.radius, 5.0);
        assert!(shaded.disc.color.red < palette::ENEMY.red);
    }

    #[test]
    fn ascii_board_marks_inhabitants() {
        let mut world = World::new();
        world.set_player_cell(CellCoord::new(2, 1));
        let _ = world
            .place_enemy(CellCoord::new(1, 1), EnemyKind::Plain)
            .expect("open cell");
        let _ = world
            .place_enemy(CellCoord::new(3, 1), EnemyKind::WallForming)
            .expect("open cell");

        let board = Scene::capture(&world).to_ascii();
        let lines: Vec<&str> = board.lines().collect();

        assert_eq!(lines.len(), 15);
        assert!(lines.iter().all(|line| line.len() == 21));
        assert_eq!(lines[0], "#".repeat(21));
        assert!(lines[1].starts_with("#e@w."));
        assert!(lines[1].ends_with(".#"));
    }

    #[test]
    fn pulses_appear_as_rings() {
        let mut world = World::new();
        world.set_player_energy(2);
        let mut events = Vec::new();
        apply(&mut world, Command::FirePulse, &mut events);
        apply(
            &mut world,
            Command::MovePlayer {
                direction: Direction::North,
            },
            &mut events,
        );

        let scene = Scene::capture(&world);

        assert_eq!(scene.pulses.len(), 1);
        assert!(scene.pulses[0].charge);
        assert_eq!(scene.pulses[0].center, Vec2::new(336.0, 240.0));
        assert_eq!(scene.status_line(), "energy 1 | charge 1 | enemies 0 | pulses 1 | running");
    }

    #[test]
    fn darken_clamps_amount() {
        let color = Color::from_rgb_u8(255, 255, 255);
        assert_eq!(color.darken(2.0), Color::new(0.0, 0.0, 0.0, 1.0));
        assert_eq!(color.darken(-1.0), color);
    }
}
