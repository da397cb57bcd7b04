//! The width-floor variant of the standard cleaner

use tidysheet_grid::Worksheet;

use super::{MergeCleaner, PrimaryMergeCleaner};
use crate::error::Result;
use crate::predicate::is_empty_cell;

/// Columns used by the first table row are held to at least this width.
const MINIMUM_COLUMN_WIDTH: f64 = 11.0;

/// The standard clean plus a width floor for every column the first table
/// row uses, for reports that squeeze data behind sliver-thin columns
pub struct MinimumWidthMergeCleaner {
    inner: PrimaryMergeCleaner,
}

impl MinimumWidthMergeCleaner {
    pub fn new() -> Self {
        Self {
            inner: PrimaryMergeCleaner::new(),
        }
    }
}

impl Default for MinimumWidthMergeCleaner {
    fn default() -> Self {
        Self::new()
    }
}

fn widen_used_columns(ws: &mut Worksheet, first_table_row: u32) {
    let Some(bounds) = ws.dimension() else {
        return;
    };
    for col in bounds.start.col..=bounds.end.col {
        if is_empty_cell(ws, first_table_row, col) {
            continue;
        }
        if ws.is_column_hidden(col) {
            ws.set_column_hidden(col, false);
        }
        if ws.column_width(col) < MINIMUM_COLUMN_WIDTH {
            ws.set_column_width(col, MINIMUM_COLUMN_WIDTH);
        }
    }
}

impl MergeCleaner for MinimumWidthMergeCleaner {
    fn unmerge(&self, ws: &mut Worksheet) -> Result<()> {
        let mut first_table_row = self.inner.find_table(ws)?;
        let mut records = self.inner.unmerge_regions(ws, first_table_row);
        self.inner
            .split_multiline_headers(ws, &mut records, &mut first_table_row)?;
        self.inner.resize_cells(ws, first_table_row, &records);
        widen_used_columns(ws, first_table_row);
        self.inner.delete_empty_columns(ws)?;
        self.inner.finishing.run(ws, Some(first_table_row))
    }
}
