//! Directional grid traversal
//!
//! [`Cursor`] is a 1-based (row, column) position. Walks and scans are plain
//! iterators over cursor values bounded by a snapshot of the used range, so
//! lookahead is a copy of the cursor instead of shared iterator state.

use tidysheet_grid::{CellRange, Worksheet};

use crate::error::{Error, Result};

/// A 1-based grid position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cursor {
    /// Row index (1-based)
    pub row: u32,
    /// Column index (1-based)
    pub col: u32,
}

/// Direction of a cursor walk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Toward row 1
    Up,
    /// Toward higher rows
    Down,
    /// Toward column 1
    Left,
    /// Toward higher columns
    Right,
}

impl Cursor {
    /// Create a cursor at (row, col)
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Move one cell in `direction`, or `None` past the sheet edge
    pub fn step(self, direction: Direction) -> Option<Cursor> {
        match direction {
            Direction::Up => (self.row > 1).then(|| Cursor::new(self.row - 1, self.col)),
            Direction::Down => self.row.checked_add(1).map(|row| Cursor::new(row, self.col)),
            Direction::Left => (self.col > 1).then(|| Cursor::new(self.row, self.col - 1)),
            Direction::Right => self.col.checked_add(1).map(|col| Cursor::new(self.row, col)),
        }
    }

    /// Walk from this position (inclusive) in `direction` while inside `bounds`
    ///
    /// A starting position outside `bounds` yields nothing.
    pub fn walk(self, direction: Direction, bounds: CellRange) -> impl Iterator<Item = Cursor> {
        let first = bounds.contains(self.row, self.col).then_some(self);
        std::iter::successors(first, move |c| {
            c.step(direction).filter(|n| bounds.contains(n.row, n.col))
        })
    }
}

/// Used range of a worksheet, or `NotPopulated` for a sheet with no cells
pub fn used_range(ws: &Worksheet) -> Result<CellRange> {
    ws.dimension().ok_or(Error::NotPopulated)
}

/// Row-major scan over `bounds`
pub fn scan(bounds: CellRange) -> impl Iterator<Item = Cursor> {
    (bounds.start.row..=bounds.end.row).flat_map(move |row| {
        (bounds.start.col..=bounds.end.col).map(move |col| Cursor::new(row, col))
    })
}

/// Row-major scan over `bounds` starting at `from` (inclusive)
pub fn scan_from(bounds: CellRange, from: Cursor) -> impl Iterator<Item = Cursor> {
    scan(bounds).skip_while(move |c| c.row < from.row || (c.row == from.row && c.col < from.col))
}

/// Reverse row-major scan starting at `from` (inclusive): right-to-left within
/// each row, bottom row first
pub fn scan_reverse_from(bounds: CellRange, from: Cursor) -> impl Iterator<Item = Cursor> {
    let last = from.row.min(bounds.end.row);
    (bounds.start.row..=last).rev().flat_map(move |row| {
        let end_col = if row == from.row {
            from.col.min(bounds.end.col)
        } else {
            bounds.end.col
        };
        (bounds.start.col..=end_col)
            .rev()
            .map(move |col| Cursor::new(row, col))
    })
}

/// First cursor in row-major order over `bounds` for which `pred` holds
pub fn first_matching(bounds: CellRange, mut pred: impl FnMut(Cursor) -> bool) -> Option<Cursor> {
    scan(bounds).find(|&c| pred(c))
}

/// Every cursor in row-major order over `bounds` for which `pred` holds
pub fn all_matching(bounds: CellRange, mut pred: impl FnMut(Cursor) -> bool) -> Vec<Cursor> {
    scan(bounds).filter(|&c| pred(c)).collect()
}
