//! Sparse cell storage and row/column structure
//!
//! Cells live in nested ordered maps keyed by row then column. A cell whose
//! value is empty and whose style is the default is not stored at all, so
//! iteration only visits meaningful cells. Row/column deletion shifts every
//! later index down by one, the way spreadsheet applications do.

use super::address::{CellAddress, CellRange};
use super::value::CellValue;
use std::collections::{BTreeMap, BTreeSet};

/// Default row height in points
pub const DEFAULT_ROW_HEIGHT: f64 = 15.0;

/// Default column width in characters
pub const DEFAULT_COLUMN_WIDTH: f64 = 8.43;

/// A stored cell: value plus a style index into the worksheet's pool
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CellData {
    /// The cell's value
    pub value: CellValue,
    /// Index into the worksheet's style pool (0 = default style)
    pub style_index: u32,
}

impl CellData {
    /// Create a cell with the default style
    pub fn new(value: CellValue) -> Self {
        Self {
            value,
            style_index: 0,
        }
    }

    /// Create a cell with an explicit style index
    pub fn with_style(value: CellValue, style_index: u32) -> Self {
        Self { value, style_index }
    }

    /// True when nothing would be lost by dropping this cell
    pub fn is_discardable(&self) -> bool {
        self.value.is_empty() && self.style_index == 0
    }
}

/// Sparse storage for one worksheet
#[derive(Debug, Default)]
pub struct CellStorage {
    rows: BTreeMap<u32, BTreeMap<u32, CellData>>,
    row_heights: BTreeMap<u32, f64>,
    hidden_rows: BTreeSet<u32>,
    row_outline: BTreeMap<u32, u8>,
    column_widths: BTreeMap<u32, f64>,
    hidden_columns: BTreeSet<u32>,
    merged: Vec<CellRange>,
    hyperlinks: BTreeMap<(u32, u32), String>,
    number_text_flags: BTreeSet<(u32, u32)>,
    array_formulas: BTreeSet<(u32, u32)>,
}

impl CellStorage {
    /// Create empty storage
    pub fn new() -> Self {
        Self::default()
    }

    // ---- cells ----

    /// Get a stored cell
    pub fn cell(&self, row: u32, col: u32) -> Option<&CellData> {
        self.rows.get(&row).and_then(|r| r.get(&col))
    }

    /// Get a stored cell mutably
    pub fn cell_mut(&mut self, row: u32, col: u32) -> Option<&mut CellData> {
        self.rows.get_mut(&row).and_then(|r| r.get_mut(&col))
    }

    /// Store a cell; discardable cells are removed instead
    pub fn set_cell(&mut self, row: u32, col: u32, data: CellData) {
        if data.is_discardable() {
            self.remove_cell(row, col);
            return;
        }
        self.rows.entry(row).or_default().insert(col, data);
    }

    /// Remove a cell entirely
    pub fn remove_cell(&mut self, row: u32, col: u32) {
        if let Some(cells) = self.rows.get_mut(&row) {
            cells.remove(&col);
            if cells.is_empty() {
                self.rows.remove(&row);
            }
        }
    }

    /// True when the cell exists and holds a non-empty value
    pub fn is_populated(&self, row: u32, col: u32) -> bool {
        self.cell(row, col).is_some_and(|c| !c.value.is_empty())
    }

    /// Iterate stored cells in row-major order
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32, &CellData)> {
        self.rows
            .iter()
            .flat_map(|(&row, cells)| cells.iter().map(move |(&col, data)| (row, col, data)))
    }

    /// Iterate stored cells of one row
    pub fn iter_row(&self, row: u32) -> impl Iterator<Item = (u32, &CellData)> {
        self.rows
            .get(&row)
            .into_iter()
            .flat_map(|cells| cells.iter().map(|(&col, data)| (col, data)))
    }

    /// Smallest rectangle covering every stored cell
    pub fn used_bounds(&self) -> Option<CellRange> {
        let first_row = *self.rows.keys().next()?;
        let last_row = *self.rows.keys().next_back()?;
        let mut min_col = u32::MAX;
        let mut max_col = 0;
        for cells in self.rows.values() {
            if let Some((&lo, _)) = cells.iter().next() {
                min_col = min_col.min(lo);
            }
            if let Some((&hi, _)) = cells.iter().next_back() {
                max_col = max_col.max(hi);
            }
        }
        if max_col == 0 {
            return None;
        }
        Some(CellRange::new(
            CellAddress::new(first_row, min_col),
            CellAddress::new(last_row, max_col),
        ))
    }

    // ---- row structure ----

    /// Row height in points
    pub fn row_height(&self, row: u32) -> f64 {
        self.row_heights.get(&row).copied().unwrap_or(DEFAULT_ROW_HEIGHT)
    }

    /// Set a row height
    pub fn set_row_height(&mut self, row: u32, height: f64) {
        if (height - DEFAULT_ROW_HEIGHT).abs() < f64::EPSILON {
            self.row_heights.remove(&row);
        } else {
            self.row_heights.insert(row, height);
        }
    }

    /// True when a row is hidden
    pub fn is_row_hidden(&self, row: u32) -> bool {
        self.hidden_rows.contains(&row)
    }

    /// Hide or show a row
    pub fn set_row_hidden(&mut self, row: u32, hidden: bool) {
        if hidden {
            self.hidden_rows.insert(row);
        } else {
            self.hidden_rows.remove(&row);
        }
    }

    /// Outline (grouping) level of a row, 0 = ungrouped
    pub fn row_outline_level(&self, row: u32) -> u8 {
        self.row_outline.get(&row).copied().unwrap_or(0)
    }

    /// Set a row's outline level; level 0 clears the entry
    pub fn set_row_outline_level(&mut self, row: u32, level: u8) {
        if level == 0 {
            self.row_outline.remove(&row);
        } else {
            self.row_outline.insert(row, level);
        }
    }

    /// Rows carrying a non-zero outline level
    pub fn outlined_rows(&self) -> Vec<u32> {
        self.row_outline.keys().copied().collect()
    }

    // ---- column structure ----

    /// Column width in characters
    pub fn column_width(&self, col: u32) -> f64 {
        self.column_widths
            .get(&col)
            .copied()
            .unwrap_or(DEFAULT_COLUMN_WIDTH)
    }

    /// Set a column width
    pub fn set_column_width(&mut self, col: u32, width: f64) {
        if (width - DEFAULT_COLUMN_WIDTH).abs() < f64::EPSILON {
            self.column_widths.remove(&col);
        } else {
            self.column_widths.insert(col, width);
        }
    }

    /// True when a column is hidden
    pub fn is_column_hidden(&self, col: u32) -> bool {
        self.hidden_columns.contains(&col)
    }

    /// Hide or show a column
    pub fn set_column_hidden(&mut self, col: u32, hidden: bool) {
        if hidden {
            self.hidden_columns.insert(col);
        } else {
            self.hidden_columns.remove(&col);
        }
    }

    // ---- merged regions ----

    /// All merged regions
    pub fn merged_regions(&self) -> &[CellRange] {
        &self.merged
    }

    /// Record a merged region (validation is the worksheet's job)
    pub fn add_merge(&mut self, range: CellRange) {
        self.merged.push(range);
    }

    /// Remove a merged region, returning whether it existed
    pub fn remove_merge(&mut self, range: &CellRange) -> bool {
        match self.merged.iter().position(|m| m == range) {
            Some(idx) => {
                self.merged.remove(idx);
                true
            }
            None => false,
        }
    }

    /// The merged region containing (row, col), if any
    pub fn merge_containing(&self, row: u32, col: u32) -> Option<CellRange> {
        self.merged.iter().find(|m| m.contains(row, col)).copied()
    }

    // ---- hyperlinks ----

    /// Hyperlink target of a cell
    pub fn hyperlink(&self, row: u32, col: u32) -> Option<&str> {
        self.hyperlinks.get(&(row, col)).map(String::as_str)
    }

    /// Attach a hyperlink to a cell
    pub fn set_hyperlink(&mut self, row: u32, col: u32, url: String) {
        self.hyperlinks.insert((row, col), url);
    }

    /// Remove one hyperlink
    pub fn remove_hyperlink(&mut self, row: u32, col: u32) -> Option<String> {
        self.hyperlinks.remove(&(row, col))
    }

    /// Cells carrying hyperlinks
    pub fn hyperlink_cells(&self) -> Vec<(u32, u32)> {
        self.hyperlinks.keys().copied().collect()
    }

    // ---- ignored-error flags ----

    /// Flag a cell as intentionally holding a number as text
    pub fn flag_number_as_text(&mut self, row: u32, col: u32) {
        self.number_text_flags.insert((row, col));
    }

    /// True when the cell carries the number-as-text flag
    pub fn is_number_as_text(&self, row: u32, col: u32) -> bool {
        self.number_text_flags.contains(&(row, col))
    }

    // ---- array formulas ----

    /// Mark or unmark a cell as holding an array formula
    pub fn set_array_flag(&mut self, row: u32, col: u32, array: bool) {
        if array {
            self.array_formulas.insert((row, col));
        } else {
            self.array_formulas.remove(&(row, col));
        }
    }

    /// True when the cell's formula is an array formula
    pub fn is_array_formula(&self, row: u32, col: u32) -> bool {
        self.array_formulas.contains(&(row, col))
    }

    // ---- structural edits ----

    /// Delete a row, shifting later rows up by one
    pub fn delete_row(&mut self, row: u32) {
        self.rows.remove(&row);
        shift_keys_after_removal(&mut self.rows, row);
        self.row_heights.remove(&row);
        shift_keys_after_removal(&mut self.row_heights, row);
        self.row_outline.remove(&row);
        shift_keys_after_removal(&mut self.row_outline, row);
        self.hidden_rows = shift_set_after_removal(&self.hidden_rows, row);

        self.merged.retain_mut(|m| {
            if m.end.row < row {
                return true;
            }
            if m.start.row > row {
                m.start.row -= 1;
                m.end.row -= 1;
                return true;
            }
            // the deleted row passes through this region
            if m.end.row == m.start.row {
                return false;
            }
            m.end.row -= 1;
            true
        });

        let remap = |(r, c): (u32, u32)| match r.cmp(&row) {
            std::cmp::Ordering::Less => Some((r, c)),
            std::cmp::Ordering::Equal => None,
            std::cmp::Ordering::Greater => Some((r - 1, c)),
        };
        self.hyperlinks = shift_cell_keys(&self.hyperlinks, remap);
        self.number_text_flags = shift_flag_cells(&self.number_text_flags, remap);
        self.array_formulas = shift_flag_cells(&self.array_formulas, remap);
    }

    /// Delete a column, shifting later columns left by one
    pub fn delete_column(&mut self, col: u32) {
        let mut empty_rows = Vec::new();
        for (&row, cells) in self.rows.iter_mut() {
            cells.remove(&col);
            shift_keys_after_removal(cells, col);
            if cells.is_empty() {
                empty_rows.push(row);
            }
        }
        for row in empty_rows {
            self.rows.remove(&row);
        }

        self.column_widths.remove(&col);
        shift_keys_after_removal(&mut self.column_widths, col);
        self.hidden_columns = shift_set_after_removal(&self.hidden_columns, col);

        self.merged.retain_mut(|m| {
            if m.end.col < col {
                return true;
            }
            if m.start.col > col {
                m.start.col -= 1;
                m.end.col -= 1;
                return true;
            }
            if m.end.col == m.start.col {
                return false;
            }
            m.end.col -= 1;
            true
        });

        let remap = |(r, c): (u32, u32)| match c.cmp(&col) {
            std::cmp::Ordering::Less => Some((r, c)),
            std::cmp::Ordering::Equal => None,
            std::cmp::Ordering::Greater => Some((r, c - 1)),
        };
        self.hyperlinks = shift_cell_keys(&self.hyperlinks, remap);
        self.number_text_flags = shift_flag_cells(&self.number_text_flags, remap);
        self.array_formulas = shift_flag_cells(&self.array_formulas, remap);
    }

    /// Insert an empty row before `row`, shifting `row` and later rows down
    pub fn insert_row(&mut self, row: u32) {
        shift_keys_for_insert(&mut self.rows, row);
        shift_keys_for_insert(&mut self.row_heights, row);
        shift_keys_for_insert(&mut self.row_outline, row);
        self.hidden_rows = self
            .hidden_rows
            .iter()
            .map(|&r| if r >= row { r + 1 } else { r })
            .collect();

        for m in self.merged.iter_mut() {
            if m.start.row >= row {
                m.start.row += 1;
                m.end.row += 1;
            } else if m.end.row >= row {
                m.end.row += 1;
            }
        }

        let remap = |(r, c): (u32, u32)| Some(if r >= row { (r + 1, c) } else { (r, c) });
        self.hyperlinks = shift_cell_keys(&self.hyperlinks, remap);
        self.number_text_flags = shift_flag_cells(&self.number_text_flags, remap);
        self.array_formulas = shift_flag_cells(&self.array_formulas, remap);
    }
}

/// Rekey entries above a removed index down by one
fn shift_keys_after_removal<V>(map: &mut BTreeMap<u32, V>, removed: u32) {
    let tail = map.split_off(&removed);
    for (key, value) in tail {
        map.insert(key - 1, value);
    }
}

/// Rekey entries at or above an insertion point up by one
fn shift_keys_for_insert<V>(map: &mut BTreeMap<u32, V>, at: u32) {
    let tail = map.split_off(&at);
    for (key, value) in tail.into_iter().rev() {
        map.insert(key + 1, value);
    }
}

fn shift_set_after_removal(set: &BTreeSet<u32>, removed: u32) -> BTreeSet<u32> {
    set.iter()
        .filter_map(|&k| match k.cmp(&removed) {
            std::cmp::Ordering::Less => Some(k),
            std::cmp::Ordering::Equal => None,
            std::cmp::Ordering::Greater => Some(k - 1),
        })
        .collect()
}

fn shift_cell_keys<F>(map: &BTreeMap<(u32, u32), String>, remap: F) -> BTreeMap<(u32, u32), String>
where
    F: Fn((u32, u32)) -> Option<(u32, u32)>,
{
    map.iter()
        .filter_map(|(&key, url)| remap(key).map(|k| (k, url.clone())))
        .collect()
}

fn shift_flag_cells<F>(set: &BTreeSet<(u32, u32)>, remap: F) -> BTreeSet<(u32, u32)>
where
    F: Fn((u32, u32)) -> Option<(u32, u32)>,
{
    set.iter().filter_map(|&key| remap(key)).collect()
}
