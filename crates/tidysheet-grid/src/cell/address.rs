//! Cell addressing: single positions and rectangular ranges
//!
//! All coordinates are 1-based: row 1, column 1 is "A1". Column letters run
//! A..Z, AA..XFD.

use crate::error::{Error, Result};
use crate::{MAX_COLS, MAX_ROWS};
use std::fmt;

/// A single cell position (1-based row and column)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellAddress {
    /// Row index, 1-based
    pub row: u32,
    /// Column index, 1-based
    pub col: u32,
}

impl CellAddress {
    /// Create an address from 1-based row and column
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Parse an A1-style reference like "B4"
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let split = s.find(|c: char| c.is_ascii_digit());
        let (letters, digits) = match split {
            Some(i) if i > 0 => s.split_at(i),
            _ => return Err(Error::InvalidAddress(s.to_string())),
        };

        let col = letters_to_column(letters).ok_or_else(|| Error::InvalidAddress(s.to_string()))?;
        let row: u32 = digits
            .parse()
            .map_err(|_| Error::InvalidAddress(s.to_string()))?;

        if row == 0 || row > MAX_ROWS || col > MAX_COLS {
            return Err(Error::InvalidAddress(s.to_string()));
        }
        Ok(Self { row, col })
    }

    /// Render as an A1-style reference
    pub fn to_a1(&self) -> String {
        format!("{}{}", column_to_letters(self.col), self.row)
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_to_letters(self.col), self.row)
    }
}

/// Convert a 1-based column index to letters (1 -> "A", 27 -> "AA")
pub fn column_to_letters(col: u32) -> String {
    let mut col = col;
    let mut letters = Vec::new();
    while col > 0 {
        let rem = ((col - 1) % 26) as u8;
        letters.push(b'A' + rem);
        col = (col - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// Convert column letters to a 1-based index ("A" -> 1, "XFD" -> 16384)
pub fn letters_to_column(letters: &str) -> Option<u32> {
    if letters.is_empty() {
        return None;
    }
    let mut col: u32 = 0;
    for c in letters.chars() {
        let c = c.to_ascii_uppercase();
        if !c.is_ascii_uppercase() {
            return None;
        }
        col = col.checked_mul(26)?.checked_add((c as u32) - ('A' as u32) + 1)?;
    }
    Some(col)
}

/// A rectangular cell range, normalized so `start` is the top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRange {
    /// Top-left corner
    pub start: CellAddress,
    /// Bottom-right corner
    pub end: CellAddress,
}

impl CellRange {
    /// Create a range from two corners (normalized)
    pub fn new(a: CellAddress, b: CellAddress) -> Self {
        Self {
            start: CellAddress::new(a.row.min(b.row), a.col.min(b.col)),
            end: CellAddress::new(a.row.max(b.row), a.col.max(b.col)),
        }
    }

    /// Create a range from 1-based row/column corners
    pub fn from_coords(row1: u32, col1: u32, row2: u32, col2: u32) -> Self {
        Self::new(CellAddress::new(row1, col1), CellAddress::new(row2, col2))
    }

    /// Create a single-cell range
    pub fn single(row: u32, col: u32) -> Self {
        let addr = CellAddress::new(row, col);
        Self {
            start: addr,
            end: addr,
        }
    }

    /// Parse "A1:B10" or a single reference "A1"
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        match s.split_once(':') {
            Some((a, b)) => {
                let start = CellAddress::parse(a)?;
                let end = CellAddress::parse(b)?;
                Ok(Self::new(start, end))
            }
            None => {
                let addr = CellAddress::parse(s)?;
                Ok(Self {
                    start: addr,
                    end: addr,
                })
            }
        }
    }

    /// Number of rows spanned
    pub fn row_count(&self) -> u32 {
        self.end.row - self.start.row + 1
    }

    /// Number of columns spanned
    pub fn col_count(&self) -> u32 {
        self.end.col - self.start.col + 1
    }

    /// Total number of cells
    pub fn cell_count(&self) -> u64 {
        self.row_count() as u64 * self.col_count() as u64
    }

    /// True when the range is exactly one cell
    pub fn is_single_cell(&self) -> bool {
        self.start == self.end
    }

    /// True when (row, col) lies inside the range
    pub fn contains(&self, row: u32, col: u32) -> bool {
        row >= self.start.row && row <= self.end.row && col >= self.start.col && col <= self.end.col
    }

    /// True when the row index intersects the range's rows
    pub fn contains_row(&self, row: u32) -> bool {
        row >= self.start.row && row <= self.end.row
    }

    /// True when the column index intersects the range's columns
    pub fn contains_col(&self, col: u32) -> bool {
        col >= self.start.col && col <= self.end.col
    }

    /// True when the two ranges share at least one cell
    pub fn overlaps(&self, other: &CellRange) -> bool {
        self.start.row <= other.end.row
            && self.end.row >= other.start.row
            && self.start.col <= other.end.col
            && self.end.col >= other.start.col
    }

    /// Iterate all (row, col) pairs in row-major order
    pub fn cells(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        let range = *self;
        (range.start.row..=range.end.row)
            .flat_map(move |row| (range.start.col..=range.end.col).map(move |col| (row, col)))
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_single_cell() {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}:{}", self.start, self.end)
        }
    }
}
