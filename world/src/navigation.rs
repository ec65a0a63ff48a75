//! Breadth-first path field that steers enemies toward the player.

use std::collections::VecDeque;

use gridpulse_core::CellCoord;
use rand::{seq::SliceRandom, Rng};

use crate::grid::Grid;

/// Next move for an enemy standing on a reachable cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NextHop {
    /// The cell is the goal itself.
    Goal,
    /// Step onto the contained cell, which lies one layer closer to the goal.
    Step(CellCoord),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Entry {
    hop: NextHop,
    distance: u32,
}

/// Dense "next hop toward the goal" map seeded from a single goal cell.
///
/// The field is a pure function of the grid and the goal. Cells that cannot
/// reach the goal without crossing a wall have no entry. A field remembers the
/// grid revision it was computed against and must be rebuilt, never patched,
/// once the grid changes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathField {
    columns: u32,
    rows: u32,
    goal: CellCoord,
    revision: u64,
    entries: Vec<Option<Entry>>,
    reachable: usize,
}

impl PathField {
    /// Computes the field with neighbours expanded in grid order.
    #[must_use]
    pub fn compute(grid: &Grid, goal: CellCoord) -> Self {
        Self::flood(grid, goal, |_| {})
    }

    /// Computes the field with every neighbour list shuffled before expansion.
    ///
    /// Distances match [`PathField::compute`]; only ties between equally
    /// short routes are broken differently.
    #[must_use]
    pub fn compute_shuffled<R>(grid: &Grid, goal: CellCoord, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        Self::flood(grid, goal, |neighbors| neighbors.shuffle(&mut *rng))
    }

    fn flood<F>(grid: &Grid, goal: CellCoord, mut reorder: F) -> Self
    where
        F: FnMut(&mut [CellCoord]),
    {
        let mut field = Self {
            columns: grid.columns(),
            rows: grid.rows(),
            goal,
            revision: grid.revision(),
            entries: vec![None; grid.cell_count()],
            reachable: 0,
        };

        let Some(goal_index) = grid.index(goal) else {
            return field;
        };
        field.entries[goal_index] = Some(Entry {
            hop: NextHop::Goal,
            distance: 0,
        });
        field.reachable = 1;

        let mut queue = VecDeque::new();
        queue.push_back((goal, 0_u32));

        while let Some((cell, distance)) = queue.pop_front() {
            let next_distance = distance.saturating_add(1);
            let mut neighbors = grid.neighbors(cell);
            reorder(neighbors.as_mut_slice());

            for neighbor in neighbors {
                let Some(index) = grid.index(neighbor) else {
                    continue;
                };
                if field.entries[index].is_some() {
                    continue;
                }

                field.entries[index] = Some(Entry {
                    hop: NextHop::Step(cell),
                    distance: next_distance,
                });
                field.reachable += 1;
                queue.push_back((neighbor, next_distance));
            }
        }

        log::trace!(
            "path field toward ({}, {}) reaches {} cells",
            goal.column(),
            goal.row(),
            field.reachable
        );
        field
    }

    /// Goal cell every route leads to.
    #[must_use]
    pub const fn goal(&self) -> CellCoord {
        self.goal
    }

    /// Grid revision the field was computed against.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Reports whether the field still describes the provided grid.
    #[must_use]
    pub fn is_current(&self, grid: &Grid) -> bool {
        self.revision == grid.revision()
            && self.columns == grid.columns()
            && self.rows == grid.rows()
    }

    /// Next hop recorded for the cell, or `None` when it cannot reach the goal.
    #[must_use]
    pub fn next_hop(&self, cell: CellCoord) -> Option<NextHop> {
        self.entry(cell).map(|entry| entry.hop)
    }

    /// Number of steps from the cell to the goal, if reachable.
    #[must_use]
    pub fn distance(&self, cell: CellCoord) -> Option<u32> {
        self.entry(cell).map(|entry| entry.distance)
    }

    /// Reports whether the cell can reach the goal.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        self.entry(cell).is_some()
    }

    /// Number of cells with an entry, goal included.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.reachable
    }

    /// Reports whether the field has no entries, which only happens when the
    /// goal lies outside the grid.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.reachable == 0
    }

    /// Cells visited when following next hops from `from` to the goal.
    ///
    /// The starting cell is excluded and the goal included. Unreachable cells
    /// produce an empty route.
    #[must_use]
    pub fn route(&self, from: CellCoord) -> Vec<CellCoord> {
        let mut route = Vec::new();
        let mut current = from;
        while let Some(NextHop::Step(next)) = self.next_hop(current) {
            if route.len() >= self.reachable {
                break;
            }
            route.push(next);
            current = next;
        }
        route
    }

    /// Iterator over every reachable cell and its next hop in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, NextHop)> + '_ {
        let columns = self.columns.max(1);
        (0_u32..)
            .zip(self.entries.iter())
            .filter_map(move |(index, entry)| {
                entry.map(|entry| {
                    (
                        CellCoord::new(index % columns, index / columns),
                        entry.hop,
                    )
                })
            })
    }

    fn entry(&self, cell: CellCoord) -> Option<Entry> {
        if cell.column() >= self.columns || cell.row() >= self.rows {
            return None;
        }
        let width = usize::try_from(self.columns).ok()?;
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let index = row.checked_mul(width)?.checked_add(column)?;
        self.entries.get(index).copied().flatten()
    }
}
