//! Totals referencing labeled rows scattered around the sheet
//!
//! Handles the cells no contiguous-range strategy can reach, so it runs
//! alongside whichever primary generator a report uses.

use tidysheet_grid::{CellRange, Workbook, Worksheet};

use crate::args::{self, Instruction, SummaryRef, TextPattern};
use crate::cursor::{self, Cursor, Direction};
use crate::error::Result;
use crate::formulas::{cell_ref, put_formula, sum_list, FormulaGenerator};
use crate::predicate::{self, CellTest};

/// Writes totals whose terms are rows named by non-contiguous arguments.
///
/// Each argument names a target label and the row labels to add (or, with a
/// minus prefix, subtract). The labeled rows are located once by scanning
/// backward from the target; every data cell to the target's right then
/// receives a SUM listing those rows at its own column.
pub struct SummaryRowGenerator {
    is_data_cell: CellTest,
}

impl SummaryRowGenerator {
    pub fn new() -> Self {
        SummaryRowGenerator {
            is_data_cell: predicate::dollar_cell(),
        }
    }

    /// Replace the test deciding which cells count as data
    pub fn with_data_cell<F>(mut self, test: F) -> Self
    where
        F: Fn(&Worksheet, u32, u32) -> bool + Send + Sync + 'static,
    {
        self.is_data_cell = Box::new(test);
        self
    }

    /// Rows whose labels match the references, paired with their subtract
    /// flags, in argument order.
    ///
    /// The scan runs backward from the target row, so labels closest above
    /// the target are found first. A reference stops being looked for after
    /// its first match unless it asks for duplicates.
    fn resolve_refs(
        &self,
        ws: &Worksheet,
        bounds: CellRange,
        refs: &[SummaryRef],
        target_row: u32,
    ) -> Vec<(u32, bool)> {
        let mut found: Vec<Vec<u32>> = vec![Vec::new(); refs.len()];
        let mut open: Vec<usize> = (0..refs.len()).collect();
        let from = Cursor::new(target_row, bounds.start.col);
        for c in cursor::scan_reverse_from(bounds, from) {
            if open.is_empty() {
                break;
            }
            let text = ws.display_text(c.row, c.col);
            // Data cells and blanks are never row labels.
            if predicate::is_empty_text(&text) || (self.is_data_cell)(ws, c.row, c.col) {
                continue;
            }
            if let Some(pos) = open.iter().position(|&i| refs[i].pattern.matches(&text)) {
                let index = open[pos];
                found[index].push(c.row);
                if !refs[index].include_duplicates {
                    open.remove(pos);
                }
            }
        }

        let mut rows = Vec::new();
        for (i, r) in refs.iter().enumerate() {
            for &row in &found[i] {
                rows.push((row, r.subtract));
            }
        }
        rows
    }

    fn fill_summary(
        &self,
        ws: &mut Worksheet,
        bounds: CellRange,
        target: &TextPattern,
        refs: &[SummaryRef],
    ) -> Result<()> {
        let found =
            cursor::first_matching(bounds, |c| target.matches(&ws.display_text(c.row, c.col)));
        let Some(label) = found else {
            log::warn!("No cell matching {target} found, formula insertion skipped");
            return Ok(());
        };
        let rows = self.resolve_refs(ws, bounds, refs, label.row);
        for cell in label.walk(Direction::Right, bounds) {
            if !(self.is_data_cell)(ws, cell.row, cell.col) {
                continue;
            }
            let terms: Vec<String> = rows
                .iter()
                .map(|&(row, subtract)| {
                    if subtract {
                        format!("-{}", cell_ref(row, cell.col))
                    } else {
                        cell_ref(row, cell.col)
                    }
                })
                .collect();
            put_formula(ws, cell.row, cell.col, &sum_list(&terms))?;
        }
        Ok(())
    }
}

impl Default for SummaryRowGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl FormulaGenerator for SummaryRowGenerator {
    fn insert_formulas(
        &self,
        book: &mut Workbook,
        sheet: usize,
        args: &[Instruction],
    ) -> Result<()> {
        let ws = book.worksheet_mut(sheet)?;
        let bounds = cursor::used_range(ws)?;
        for (target, refs) in args::summaries(args) {
            self.fill_summary(ws, bounds, target, refs)?;
        }
        Ok(())
    }
}
