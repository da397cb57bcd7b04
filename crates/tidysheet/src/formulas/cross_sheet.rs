//! Totals that reference other sheets' bottom-line formulas

use tidysheet_grid::{CellRange, Workbook, Worksheet};

use crate::args::{self, Instruction};
use crate::cursor;
use crate::error::Result;
use crate::formulas::{cell_ref, put_formula, sum_list, FormulaGenerator};
use crate::predicate::{self, CellTest};

/// Writes grand totals that add up the bottom-line formulas of other sheets.
///
/// Sheet arguments name the source sheets by index. Anchor arguments name
/// the total rows on the current sheet; without them, the bottom-most row
/// already holding formulas is the target. Every formula or data cell in a
/// target row receives a SUM referencing, for each source sheet, the
/// bottom-most formula cell in the same column.
pub struct CrossSheetGenerator {
    is_data_cell: CellTest,
}

impl CrossSheetGenerator {
    pub fn new() -> Self {
        CrossSheetGenerator {
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

    /// Resolve every target cell and its cross-sheet formula before any
    /// placement, since sources are read while the target stays untouched
    fn plan_formulas(
        &self,
        book: &Workbook,
        sheet: usize,
        args: &[Instruction],
        sources: &[usize],
    ) -> Result<Vec<(u32, u32, String)>> {
        let ws = book.worksheet(sheet)?;
        let bounds = cursor::used_range(ws)?;
        let anchors = args::anchors(args);
        let target_rows: Vec<u32> = if anchors.is_empty() {
            bottom_formula_row(ws, bounds).into_iter().collect()
        } else {
            anchors
                .iter()
                .flat_map(|a| {
                    cursor::all_matching(bounds, |c| a.matches(&ws.display_text(c.row, c.col)))
                })
                .map(|c| c.row)
                .collect()
        };

        let mut planned = Vec::new();
        for &row in &target_rows {
            for col in bounds.start.col..=bounds.end.col {
                if !ws.has_formula(row, col) && !(self.is_data_cell)(ws, row, col) {
                    continue;
                }
                let refs = source_refs(book, sources, col)?;
                if refs.is_empty() {
                    log::debug!("No source formulas feed cell {}", cell_ref(row, col));
                    continue;
                }
                planned.push((row, col, sum_list(&refs)));
            }
        }
        Ok(planned)
    }
}

impl Default for CrossSheetGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl FormulaGenerator for CrossSheetGenerator {
    fn insert_formulas(
        &self,
        book: &mut Workbook,
        sheet: usize,
        args: &[Instruction],
    ) -> Result<()> {
        let sources = args::sheet_indices(args);
        if sources.is_empty() {
            return Ok(());
        }
        let planned = self.plan_formulas(book, sheet, args, &sources)?;
        let ws = book.worksheet_mut(sheet)?;
        for (row, col, formula) in planned {
            put_formula(ws, row, col, &formula)?;
        }
        Ok(())
    }
}

/// Bottom-most row holding at least one formula cell
fn bottom_formula_row(ws: &Worksheet, bounds: CellRange) -> Option<u32> {
    (bounds.start.row..=bounds.end.row)
        .rev()
        .find(|&row| (bounds.start.col..=bounds.end.col).any(|col| ws.has_formula(row, col)))
}

/// One reference per source sheet: its bottom-most formula cell in `col`.
/// Sources without a formula in that column contribute nothing.
fn source_refs(book: &Workbook, sources: &[usize], col: u32) -> Result<Vec<String>> {
    let mut refs = Vec::new();
    for &index in sources {
        let src = book.worksheet(index)?;
        let Some(src_bounds) = src.dimension() else {
            continue;
        };
        let found = (src_bounds.start.row..=src_bounds.end.row)
            .rev()
            .find(|&row| src.has_formula(row, col));
        match found {
            Some(row) => refs.push(format!("{}!{}", sheet_ref(src.name()), cell_ref(row, col))),
            None => log::debug!("Sheet {} has no formula in column {col}", src.name()),
        }
    }
    Ok(refs)
}

/// Sheet name as written inside a formula, quoted unless purely alphanumeric
fn sheet_ref(name: &str) -> String {
    if !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric()) {
        name.to_string()
    } else {
        format!("'{name}'")
    }
}
