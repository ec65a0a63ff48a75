//! Wall layout of the playfield.

use gridpulse_core::{CellCoord, GRID_COLUMNS, GRID_ROWS};
use thiserror::Error;

const WALL_TILE: char = '#';
const OPEN_TILE: char = '.';

/// Errors raised while building or mutating a [`Grid`].
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GridError {
    /// The cell lies outside the grid.
    #[error("cell ({column}, {row}) lies outside the grid")]
    OutOfBounds {
        /// Column of the rejected cell.
        column: u32,
        /// Row of the rejected cell.
        row: u32,
    },
    /// Border cells stay walls for the lifetime of a match.
    #[error("border cell ({column}, {row}) is permanently walled")]
    Border {
        /// Column of the rejected cell.
        column: u32,
        /// Row of the rejected cell.
        row: u32,
    },
    /// The textual layout contained no rows.
    #[error("layout contains no rows")]
    EmptyLayout,
    /// A layout row did not match the width of the first row.
    #[error("layout row {row} has {found} tiles, expected {expected}")]
    RaggedRow {
        /// Zero-based index of the offending row.
        row: u32,
        /// Width established by the first row.
        expected: u32,
        /// Width of the offending row.
        found: u32,
    },
    /// A layout tile was neither a wall nor an open cell.
    #[error("unknown tile {tile:?} at ({column}, {row})")]
    UnknownTile {
        /// Character that could not be interpreted.
        tile: char,
        /// Column of the tile.
        column: u32,
        /// Row of the tile.
        row: u32,
    },
    /// A layout left part of its border open.
    #[error("border cell ({column}, {row}) must be a wall")]
    OpenBorder {
        /// Column of the open border cell.
        column: u32,
        /// Row of the open border cell.
        row: u32,
    },
}

/// Fixed-size rectangular grid of open and walled cells.
///
/// Every border cell is a wall. Each successful [`Grid::flip`] bumps the
/// revision counter so that path fields computed earlier can be recognised as
/// stale.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    columns: u32,
    rows: u32,
    walls: Vec<bool>,
    revision: u64,
}

impl Grid {
    /// Creates an open grid enclosed by a one-cell wall border.
    #[must_use]
    pub fn new(columns: u32, rows: u32) -> Self {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        let mut grid = Self {
            columns,
            rows,
            walls: vec![false; capacity],
            revision: 0,
        };
        for row in 0..rows {
            for column in 0..columns {
                let cell = CellCoord::new(column, row);
                if grid.is_border(cell) {
                    if let Some(index) = grid.index(cell) {
                        grid.walls[index] = true;
                    }
                }
            }
        }
        grid
    }

    /// Creates the match-sized grid.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(GRID_COLUMNS, GRID_ROWS)
    }

    /// Parses a layout drawn with `#` for walls and `.` for open cells.
    pub fn from_rows<S: AsRef<str>>(layout: &[S]) -> Result<Self, GridError> {
        let Some(first) = layout.first() else {
            return Err(GridError::EmptyLayout);
        };
        let columns = u32::try_from(first.as_ref().chars().count()).unwrap_or(u32::MAX);
        let rows = u32::try_from(layout.len()).unwrap_or(u32::MAX);
        if columns == 0 {
            return Err(GridError::EmptyLayout);
        }

        let mut walls = Vec::with_capacity(layout.len() * first.as_ref().len());
        for (row, line) in (0..rows).zip(layout) {
            let line = line.as_ref();
            let found = u32::try_from(line.chars().count()).unwrap_or(u32::MAX);
            if found != columns {
                return Err(GridError::RaggedRow {
                    row,
                    expected: columns,
                    found,
                });
            }
            for (column, tile) in (0..columns).zip(line.chars()) {
                let wall = match tile {
                    WALL_TILE => true,
                    OPEN_TILE => false,
                    other => {
                        return Err(GridError::UnknownTile {
                            tile: other,
                            column,
                            row,
                        })
                    }
                };
                walls.push(wall);
            }
        }

        let grid = Self {
            columns,
            rows,
            walls,
            revision: 0,
        };
        for cell in grid.cells() {
            if grid.is_border(cell) && !grid.is_wall(cell) {
                return Err(GridError::OpenBorder {
                    column: cell.column(),
                    row: cell.row(),
                });
            }
        }
        Ok(grid)
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of wall flips applied since construction.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Reports whether the cell sits on the outer ring.
    #[must_use]
    pub const fn is_border(&self, cell: CellCoord) -> bool {
        self.contains(cell)
            && (cell.column() == 0
                || cell.row() == 0
                || cell.column() + 1 == self.columns
                || cell.row() + 1 == self.rows)
    }

    /// Reports whether the cell blocks movement. Cells outside the grid do.
    #[must_use]
    pub fn is_wall(&self, cell: CellCoord) -> bool {
        self.index(cell)
            .and_then(|index| self.walls.get(index).copied())
            .unwrap_or(true)
    }

    /// Reports whether the cell lies inside the grid and is not a wall.
    #[must_use]
    pub fn is_open(&self, cell: CellCoord) -> bool {
        !self.is_wall(cell)
    }

    /// Toggles the wall state of an interior cell and returns the new state.
    pub fn flip(&mut self, cell: CellCoord) -> Result<bool, GridError> {
        let Some(index) = self.index(cell) else {
            return Err(GridError::OutOfBounds {
                column: cell.column(),
                row: cell.row(),
            });
        };
        if self.is_border(cell) {
            return Err(GridError::Border {
                column: cell.column(),
                row: cell.row(),
            });
        }

        let wall = !self.walls[index];
        self.walls[index] = wall;
        self.revision = self.revision.wrapping_add(1);
        log::debug!(
            "cell ({}, {}) is now {}",
            cell.column(),
            cell.row(),
            if wall { "a wall" } else { "open" }
        );
        Ok(wall)
    }

    /// Passable orthogonal neighbours of `cell`.
    ///
    /// The vertical axis is enumerated before the horizontal one and the
    /// lower coordinate before the upper one: `(x, y-1)`, `(x, y+1)`,
    /// `(x-1, y)`, `(x+1, y)`. Candidates outside the grid or on walls are
    /// skipped. Path field tie breaks depend on this order.
    #[must_use]
    pub fn neighbors(&self, cell: CellCoord) -> Neighbors {
        let mut neighbors = Neighbors::default();

        for row in axis_candidates(cell.row(), self.rows).into_iter().flatten() {
            let candidate = CellCoord::new(cell.column(), row);
            if self.is_open(candidate) {
                neighbors.push(candidate);
            }
        }
        for column in axis_candidates(cell.column(), self.columns)
            .into_iter()
            .flatten()
        {
            let candidate = CellCoord::new(column, cell.row());
            if self.is_open(candidate) {
                neighbors.push(candidate);
            }
        }

        neighbors
    }

    /// Iterator over every cell coordinate in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        (0..self.rows).flat_map(move |row| {
            (0..self.columns).map(move |column| CellCoord::new(column, row))
        })
    }

    /// Number of cells that are not walls.
    #[must_use]
    pub fn open_count(&self) -> usize {
        self.walls.iter().filter(|wall| !**wall).count()
    }

    pub(crate) fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.columns).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }

    pub(crate) fn cell_count(&self) -> usize {
        self.walls.len()
    }
}

/// Lower and upper neighbour along one axis.
///
/// A negative lower value leaves only the upper one, an upper value past the
/// bound leaves only the lower one.
fn axis_candidates(value: u32, bound: u32) -> [Option<u32>; 2] {
    let lower = value.checked_sub(1).filter(|lower| *lower < bound);
    let upper = value.checked_add(1).filter(|upper| *upper < bound);
    [lower, upper]
}

/// Up to four neighbouring cells produced by [`Grid::neighbors`].
#[derive(Clone, Debug)]
pub struct Neighbors {
    buffer: [CellCoord; 4],
    len: usize,
    cursor: usize,
}

impl Neighbors {
    fn push(&mut self, cell: CellCoord) {
        if self.len < self.buffer.len() {
            self.buffer[self.len] = cell;
            self.len += 1;
        }
    }

    /// Remaining neighbours as a mutable slice, e.g. for reordering.
    pub fn as_mut_slice(&mut self) -> &mut [CellCoord] {
        &mut self.buffer[self.cursor..self.len]
    }
}

impl Default for Neighbors {
    fn default() -> Self {
        Self {
            buffer: [CellCoord::new(0, 0); 4],
            len: 0,
            cursor: 0,
        }
    }
}

impl Iterator for Neighbors {
    type Item = CellCoord;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.len {
            return None;
        }

        let value = self.buffer[self.cursor];
        self.cursor += 1;
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_grid_walls_the_border() {
        let grid = Grid::new(5, 4);

        assert!(grid.is_wall(CellCoord::new(0, 0)));
        assert!(grid.is_wall(CellCoord::new(4, 2)));
        assert!(grid.is_wall(CellCoord::new(2, 3)));
        assert!(grid.is_open(CellCoord::new(1, 1)));
        assert!(grid.is_open(CellCoord::new(3, 2)));
        assert_eq!(grid.open_count(), 6);
    }

    #[test]
    fn neighbors_enumerate_vertical_axis_first() {
        let grid = Grid::standard();

        let neighbors: Vec<_> = grid.neighbors(CellCoord::new(5, 5)).collect();

        assert_eq!(
            neighbors,
            vec![
                CellCoord::new(5, 4),
                CellCoord::new(5, 6),
                CellCoord::new(4, 5),
                CellCoord::new(6, 5),
            ]
        );
    }

    #[test]
    fn neighbors_skip_walls_and_grid_edges() {
        let grid = Grid::standard();

        let corner: Vec<_> = grid.neighbors(CellCoord::new(1, 1)).collect();
        assert_eq!(corner, vec![CellCoord::new(1, 2), CellCoord::new(2, 1)]);

        let border: Vec<_> = grid.neighbors(CellCoord::new(0, 3)).collect();
        assert_eq!(border, vec![CellCoord::new(1, 3)]);
    }

    #[test]
    fn flip_toggles_interior_cells_and_bumps_revision() {
        let mut grid = Grid::standard();
        let cell = CellCoord::new(4, 4);

        assert_eq!(grid.flip(cell), Ok(true));
        assert!(grid.is_wall(cell));
        assert_eq!(grid.revision(), 1);

        assert_eq!(grid.flip(cell), Ok(false));
        assert!(grid.is_open(cell));
        assert_eq!(grid.revision(), 2);
    }

    #[test]
    fn flip_refuses_border_and_outside_cells() {
        let mut grid = Grid::standard();

        assert_eq!(
            grid.flip(CellCoord::new(0, 4)),
            Err(GridError::Border { column: 0, row: 4 })
        );
        assert_eq!(
            grid.flip(CellCoord::new(40, 4)),
            Err(GridError::OutOfBounds { column: 40, row: 4 })
        );
        assert_eq!(grid.revision(), 0);
    }

    #[test]
    fn from_rows_parses_walls() {
        let grid = Grid::from_rows(&["#####", "#.#.#", "#...#", "#####"]).expect("valid layout");

        assert_eq!(grid.columns(), 5);
        assert_eq!(grid.rows(), 4);
        assert!(grid.is_wall(CellCoord::new(2, 1)));
        assert!(grid.is_open(CellCoord::new(2, 2)));
    }

    #[test]
    fn from_rows_rejects_malformed_layouts() {
        let empty: [&str; 0] = [];
        assert_eq!(Grid::from_rows(&empty), Err(GridError::EmptyLayout));
        assert_eq!(
            Grid::from_rows(&["###", "#.", "###"]),
            Err(GridError::RaggedRow {
                row: 1,
                expected: 3,
                found: 2
            })
        );
        assert_eq!(
            Grid::from_rows(&["###", "#x#", "###"]),
            Err(GridError::UnknownTile {
                tile: 'x',
                column: 1,
                row: 1
            })
        );
        assert_eq!(
            Grid::from_rows(&["#.#", "#.#", "###"]),
            Err(GridError::OpenBorder { column: 1, row: 0 })
        );
    }
}
