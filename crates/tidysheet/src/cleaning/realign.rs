//! The drift-correcting variant of the standard cleaner

use tidysheet_grid::{CellAddress, CellRange, Worksheet};

use super::{copy_text_styles, MergeCleaner, MergeType, PrimaryMergeCleaner};
use crate::error::Result;
use crate::predicate::is_empty_cell;

/// The standard clean plus a drift pass: values that unmerging left in a
/// column no data claims move sideways into the nearest data column
///
/// Reports that center each value across two or three merged columns
/// dissolve into a checkerboard, with values scattered over half-empty
/// columns. The drift pass gathers them back under their headings before
/// the resize and delete steps run.
pub struct RealigningMergeCleaner {
    inner: PrimaryMergeCleaner,
}

impl RealigningMergeCleaner {
    pub fn new() -> Self {
        Self {
            inner: PrimaryMergeCleaner::new(),
        }
    }

    /// Move stranded cells into the nearest data column with room for them
    fn realign_worksheet(
        &self,
        ws: &mut Worksheet,
        first_table_row: u32,
        records: &[(CellRange, MergeType)],
    ) -> Result<()> {
        let Some(bounds) = ws.dimension() else {
            return Ok(());
        };
        let data_cols = data_columns(ws, first_table_row, bounds);
        let scan_start = records
            .iter()
            .filter(|(_, kind)| *kind == MergeType::Data)
            .map(|(range, _)| range.start.col)
            .min()
            .unwrap_or(bounds.start.col);
        for col in scan_start..=bounds.end.col {
            if data_cols.contains(&col) {
                continue;
            }
            let (nearest, second) = nearest_data_columns(&data_cols, col, bounds.end.col);
            let Some(nearest) = nearest else {
                continue;
            };
            for row in first_table_row..=bounds.end.row {
                if is_empty_cell(ws, row, col) {
                    continue;
                }
                let dest = if is_empty_cell(ws, row, nearest) {
                    Some(nearest)
                } else {
                    second.filter(|&c| is_empty_cell(ws, row, c))
                };
                let Some(dest) = dest else {
                    log::debug!(
                        "No free data column near cell {}, leaving it in place",
                        CellAddress::new(row, col)
                    );
                    continue;
                };
                copy_text_styles(ws, (row, col), (row, dest))?;
                let value = ws.value(row, col);
                ws.set_value(row, dest, value)?;
                ws.clear_value(row, col);
            }
        }
        Ok(())
    }
}

impl Default for RealigningMergeCleaner {
    fn default() -> Self {
        Self::new()
    }
}

/// Columns populated in at least half the table rows
fn data_columns(ws: &Worksheet, first_table_row: u32, bounds: CellRange) -> Vec<u32> {
    let threshold = ((bounds.end.row - first_table_row) as f64 * 0.50) as u32;
    (bounds.start.col..=bounds.end.col)
        .filter(|&col| {
            let populated = (first_table_row..=bounds.end.row)
                .filter(|&row| !is_empty_cell(ws, row, col))
                .count() as u32;
            populated >= threshold
        })
        .collect()
}

/// Nearest and second-nearest data columns, expanding one step both ways at
/// a time
///
/// The right side is checked first, and both cursors advance every step, so
/// a left column tied with a right match is passed over rather than kept as
/// the second choice.
fn nearest_data_columns(
    data_cols: &[u32],
    origin: u32,
    last_col: u32,
) -> (Option<u32>, Option<u32>) {
    let mut found: Vec<u32> = Vec::with_capacity(2);
    let mut right = origin;
    let mut left = origin;
    while (right <= last_col || left >= 1) && found.len() < 2 {
        if data_cols.contains(&right) {
            found.push(right);
        } else if data_cols.contains(&left) {
            found.push(left);
        }
        right += 1;
        left = left.saturating_sub(1);
    }
    (found.first().copied(), found.get(1).copied())
}

impl MergeCleaner for RealigningMergeCleaner {
    fn unmerge(&self, ws: &mut Worksheet) -> Result<()> {
        let mut first_table_row = self.inner.find_table(ws)?;
        let mut records = self.inner.unmerge_regions(ws, first_table_row);
        self.inner
            .split_multiline_headers(ws, &mut records, &mut first_table_row)?;
        self.realign_worksheet(ws, first_table_row, &records)?;
        self.inner.resize_cells(ws, first_table_row, &records);
        self.inner.delete_empty_columns(ws)?;
        self.inner.finishing.run(ws, Some(first_table_row))
    }
}
