//! Board and cell types.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::game::PlayerId;

/// A coordinate on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    /// Row index (0 is the top edge).
    pub row: u16,
    /// Column index (0 is the left edge).
    pub col: u16,
}

impl Coord {
    /// Create a new coordinate.
    #[must_use]
    pub const fn new(row: u16, col: u16) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// A single cell on the board.
///
/// A cell with zero units never has an owner, and an owned cell always holds
/// at least one unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// Number of units stacked on this cell.
    pub units: u32,
    /// Owner of this cell (None = empty).
    pub owner: Option<PlayerId>,
}

impl Cell {
    /// An empty, unowned cell.
    pub const EMPTY: Self = Self {
        units: 0,
        owner: None,
    };

    /// Create an occupied cell.
    #[must_use]
    pub const fn owned(owner: PlayerId, units: u32) -> Self {
        Self {
            units,
            owner: Some(owner),
        }
    }

    /// Check if the cell holds no units.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.units == 0
    }

    /// Remove `count` units, clearing the owner when nothing is left.
    pub fn remove_units(&mut self, count: u32) {
        self.units = self.units.saturating_sub(count);
        if self.units == 0 {
            self.owner = None;
        }
    }

    /// Add one unit and hand the cell to `owner`.
    pub fn add_unit(&mut self, owner: PlayerId) {
        self.units = self.units.saturating_add(1);
        self.owner = Some(owner);
    }
}

/// The game board: a fixed `rows x cols` grid stored in row-major order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    /// Number of rows.
    rows: u16,
    /// Number of columns.
    cols: u16,
    /// Cells stored in row-major order.
    cells: Vec<Cell>,
}

impl Board {
    /// Create a new empty board.
    ///
    /// Returns `None` if either dimension is zero.
    #[must_use]
    pub fn new(rows: u16, cols: u16) -> Option<Self> {
        if rows == 0 || cols == 0 {
            return None;
        }

        let size = usize::from(rows) * usize::from(cols);
        Some(Self {
            rows,
            cols,
            cells: vec![Cell::EMPTY; size],
        })
    }

    /// Number of rows.
    #[must_use]
    pub const fn rows(&self) -> u16 {
        self.rows
    }

    /// Number of columns.
    #[must_use]
    pub const fn cols(&self) -> u16 {
        self.cols
    }

    /// Total number of cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Boards are never empty; provided for clippy's `len_without_is_empty`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Raw cells in row-major order.
    #[must_use]
    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Check if a coordinate is within the board.
    #[must_use]
    pub const fn in_bounds(&self, coord: Coord) -> bool {
        coord.row < self.rows && coord.col < self.cols
    }

    /// Convert a coordinate to an index into the cell array.
    #[must_use]
    #[inline]
    pub fn index_of(&self, coord: Coord) -> Option<usize> {
        if self.in_bounds(coord) {
            Some(usize::from(coord.row) * usize::from(self.cols) + usize::from(coord.col))
        } else {
            None
        }
    }

    /// Convert a cell index back to a coordinate.
    ///
    /// The index must come from this board.
    #[must_use]
    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    pub fn coord_of(&self, idx: usize) -> Coord {
        let cols = usize::from(self.cols);
        Coord::new((idx / cols) as u16, (idx % cols) as u16)
    }

    /// Get the cell at the given coordinate.
    #[must_use]
    pub fn get(&self, coord: Coord) -> Option<&Cell> {
        self.index_of(coord).map(|idx| &self.cells[idx])
    }

    /// Get a mutable reference to the cell at the given coordinate.
    #[must_use]
    pub fn get_mut(&mut self, coord: Coord) -> Option<&mut Cell> {
        self.index_of(coord).map(|idx| &mut self.cells[idx])
    }

    /// Cell by raw index.
    #[must_use]
    #[inline]
    pub(crate) fn at(&self, idx: usize) -> &Cell {
        &self.cells[idx]
    }

    /// Mutable cell by raw index.
    #[inline]
    pub(crate) fn at_mut(&mut self, idx: usize) -> &mut Cell {
        &mut self.cells[idx]
    }

    /// Replace the cell at the given coordinate.
    ///
    /// Returns `false` if the coordinate is out of bounds.
    pub fn set(&mut self, coord: Coord, cell: Cell) -> bool {
        if let Some(idx) = self.index_of(coord) {
            self.cells[idx] = cell;
            true
        } else {
            false
        }
    }

    /// Iterate over all coordinates and cells.
    pub fn iter(&self) -> impl Iterator<Item = (Coord, &Cell)> {
        self.cells
            .iter()
            .enumerate()
            .map(|(idx, cell)| (self.coord_of(idx), cell))
    }

    /// All cells owned by a specific player.
    pub fn cells_owned_by(&self, player: PlayerId) -> impl Iterator<Item = (Coord, &Cell)> {
        self.iter().filter(move |(_, cell)| cell.owner == Some(player))
    }

    /// Count cells owned by a player.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn count_cells(&self, player: PlayerId) -> u32 {
        self.cells.iter().filter(|c| c.owner == Some(player)).count() as u32
    }

    /// Sum of units across all cells owned by a player.
    #[must_use]
    pub fn total_units_of(&self, player: PlayerId) -> u32 {
        self.cells
            .iter()
            .filter(|c| c.owner == Some(player))
            .map(|c| c.units)
            .sum()
    }

    /// Sum of units on the whole board.
    #[must_use]
    pub fn total_units(&self) -> u64 {
        self.cells.iter().map(|c| u64::from(c.units)).sum()
    }
}

/// Plain text dump, one row per line, `.` for empty cells and
/// `<units><player>` for occupied ones.
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(usize::from(self.cols)) {
            let line: Vec<String> = row
                .iter()
                .map(|cell| match cell.owner {
                    Some(owner) => format!("{:>2}{owner}", cell.units),
                    None => "  .".to_string(),
                })
                .collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}
