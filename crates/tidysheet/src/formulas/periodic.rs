//! Section totals for tables split into keyed periods
//!
//! A section is a run of rows belonging to one key cell in the table's
//! first column, the way an invoice report groups charge rows under each
//! vendor. [`PeriodicOnTop`] writes each section's total into the key row
//! itself; [`PeriodicGenerator`] writes it into a summary row at the
//! section's bottom.

use tidysheet_grid::{CellRange, Workbook, Worksheet};

use crate::args::{self, Instruction, TextPattern};
use crate::cursor::{self, Cursor, Direction};
use crate::error::{Error, Result};
use crate::formulas::{put_formula, sum_range, FormulaGenerator};
use crate::predicate::{self, CellTest};

fn bold_dollar() -> CellTest {
    Box::new(|ws, row, col| {
        predicate::is_dollar_value(&ws.display_text(row, col)) && predicate::is_bold(ws, row, col)
    })
}

/// Columns in `header_row` whose text matches one of the anchors
fn data_columns(
    ws: &Worksheet,
    bounds: CellRange,
    header_row: u32,
    anchors: &[&TextPattern],
) -> Vec<u32> {
    Cursor::new(header_row, bounds.start.col)
        .walk(Direction::Right, bounds)
        .filter(|c| {
            let text = ws.display_text(c.row, c.col);
            anchors.iter().any(|a| a.matches(&text))
        })
        .map(|c| c.col)
        .collect()
}

/// Row of the first cell matching the leading anchor, where the table begins
fn find_table_start(
    ws: &Worksheet,
    bounds: CellRange,
    first_anchor: &TextPattern,
) -> Result<u32> {
    cursor::first_matching(bounds, |c| first_anchor.matches(&ws.display_text(c.row, c.col)))
        .map(|c| c.row)
        .ok_or_else(|| {
            Error::NoDataFound(format!(
                "no cell matching {first_anchor} starts the table on sheet {}",
                ws.name()
            ))
        })
}

/// Writes section totals into the key row at the top of each section.
///
/// Anchor arguments name the data column headers. Key cells are found in
/// the first used column below the header row; each key cell receives, in
/// every data column, a SUM over the rows down to the next key.
pub struct PeriodicOnTop {
    is_summary_cell: CellTest,
    cell_has_key: CellTest,
}

impl PeriodicOnTop {
    pub fn new() -> Self {
        PeriodicOnTop {
            is_summary_cell: bold_dollar(),
            cell_has_key: Box::new(|ws, row, col| {
                let text = ws.display_text(row, col);
                !predicate::is_empty_text(&text)
                    && !predicate::is_dollar_value(&text)
                    && predicate::is_bold(ws, row, col)
            }),
        }
    }

    /// Replace the test recognizing a final summary row at the table bottom
    pub fn with_summary_cell<F>(mut self, test: F) -> Self
    where
        F: Fn(&Worksheet, u32, u32) -> bool + Send + Sync + 'static,
    {
        self.is_summary_cell = Box::new(test);
        self
    }

    /// Replace the test recognizing a section key cell
    pub fn with_key_test<F>(mut self, test: F) -> Self
    where
        F: Fn(&Worksheet, u32, u32) -> bool + Send + Sync + 'static,
    {
        self.cell_has_key = Box::new(test);
        self
    }

    /// Key rows below `first_row`, closed with a sentinel so the last
    /// section spans to the table bottom
    fn section_keys(&self, ws: &Worksheet, bounds: CellRange, first_row: u32) -> Vec<u32> {
        let mut keys: Vec<u32> = Cursor::new(first_row + 1, bounds.start.col)
            .walk(Direction::Down, bounds)
            .filter(|c| (self.cell_has_key)(ws, c.row, c.col))
            .map(|c| c.row)
            .collect();
        if self.has_final_summary(ws, bounds) {
            keys.push(bounds.end.row);
        } else {
            keys.push(bounds.end.row + 1);
        }
        keys
    }

    /// A summary row at the very bottom is excluded from the last section
    fn has_final_summary(&self, ws: &Worksheet, bounds: CellRange) -> bool {
        Cursor::new(bounds.end.row, bounds.start.col)
            .walk(Direction::Right, bounds)
            .any(|c| (self.is_summary_cell)(ws, c.row, c.col))
    }
}

impl Default for PeriodicOnTop {
    fn default() -> Self {
        Self::new()
    }
}

impl FormulaGenerator for PeriodicOnTop {
    fn insert_formulas(
        &self,
        book: &mut Workbook,
        sheet: usize,
        args: &[Instruction],
    ) -> Result<()> {
        let anchors = args::anchors(args);
        let Some(&first_anchor) = anchors.first() else {
            return Ok(());
        };
        let ws = book.worksheet_mut(sheet)?;
        let bounds = cursor::used_range(ws)?;
        let first_row = find_table_start(ws, bounds, first_anchor)?;
        let keys = self.section_keys(ws, bounds, first_row);
        let columns = data_columns(ws, bounds, first_row, &anchors);
        for pair in keys.windows(2) {
            let (key_row, next_key) = (pair[0], pair[1]);
            let top = key_row + 1;
            let bottom = next_key - 1;
            if top > bottom {
                log::debug!("Section keyed at row {key_row} has no rows to sum");
                continue;
            }
            for &col in &columns {
                put_formula(ws, key_row, col, &sum_range(top, bottom, col))?;
            }
        }
        Ok(())
    }
}

/// Writes section totals into a summary row at the bottom of each section.
///
/// A section-key argument (`r=` prefix) gives the pattern of key cells in
/// the first used column; anchor arguments name the data column headers.
/// Each section's summary row is the first row below its key whose leading
/// data cell passes the summary test, and receives a SUM from the key row
/// down to the row above it.
pub struct PeriodicGenerator {
    is_summary_cell: CellTest,
}

impl PeriodicGenerator {
    pub fn new() -> Self {
        PeriodicGenerator {
            is_summary_cell: bold_dollar(),
        }
    }

    /// Replace the test recognizing each section's summary row
    pub fn with_summary_cell<F>(mut self, test: F) -> Self
    where
        F: Fn(&Worksheet, u32, u32) -> bool + Send + Sync + 'static,
    {
        self.is_summary_cell = Box::new(test);
        self
    }

    /// First row in `key_row+1..=section_end` whose cell in `col` passes
    /// the summary test
    fn find_summary_row(
        &self,
        ws: &Worksheet,
        key_row: u32,
        section_end: u32,
        col: u32,
    ) -> Option<u32> {
        ((key_row + 1)..=section_end).find(|&row| (self.is_summary_cell)(ws, row, col))
    }
}

impl Default for PeriodicGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl FormulaGenerator for PeriodicGenerator {
    fn insert_formulas(
        &self,
        book: &mut Workbook,
        sheet: usize,
        args: &[Instruction],
    ) -> Result<()> {
        let Some(key) = args::section_key(args) else {
            log::debug!("No section key argument given, nothing to do");
            return Ok(());
        };
        let anchors = args::anchors(args);
        let Some(&first_anchor) = anchors.first() else {
            return Ok(());
        };
        let ws = book.worksheet_mut(sheet)?;
        let bounds = cursor::used_range(ws)?;
        let header_row = find_table_start(ws, bounds, first_anchor)?;
        let columns = data_columns(ws, bounds, header_row, &anchors);
        let Some(&first_column) = columns.first() else {
            log::debug!("No data columns found on sheet {}", ws.name());
            return Ok(());
        };
        let keys: Vec<u32> = Cursor::new(header_row + 1, bounds.start.col)
            .walk(Direction::Down, bounds)
            .filter(|c| key.matches(&ws.display_text(c.row, c.col)))
            .map(|c| c.row)
            .collect();
        for (i, &key_row) in keys.iter().enumerate() {
            let section_end = keys.get(i + 1).map_or(bounds.end.row, |&next| next - 1);
            let summary = self.find_summary_row(ws, key_row, section_end, first_column);
            let Some(summary_row) = summary else {
                log::debug!("Section keyed at row {key_row} has no summary row");
                continue;
            };
            for &col in &columns {
                put_formula(ws, summary_row, col, &sum_range(key_row, summary_row - 1, col))?;
            }
        }
        Ok(())
    }
}
