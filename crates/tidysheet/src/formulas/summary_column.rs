//! A rightmost column whose cells sum the data columns to their left

use tidysheet_grid::{CellRange, Workbook, Worksheet};

use crate::args::{self, Instruction};
use crate::cursor::{self, Cursor, Direction};
use crate::error::Result;
use crate::formulas::{cell_ref, put_formula, row_span_ref, FormulaGenerator};
use crate::predicate::{self, CellTest};

/// Writes row totals down a column named by its header.
///
/// Each anchor names the header of a totals column. Below the header, every
/// cell until the column-end test fires receives a SUM over the cells to
/// its left, ending where the outside-formula test fires. Blank cells along
/// the way are passed over without a formula.
pub struct FullTableSummaryColumn {
    is_data_cell: CellTest,
    outside_formula: CellTest,
    column_ends: Option<CellTest>,
}

impl FullTableSummaryColumn {
    pub fn new() -> Self {
        FullTableSummaryColumn {
            is_data_cell: predicate::dollar_cell(),
            outside_formula: Box::new(|ws, row, col| {
                !predicate::is_dollar_value(&ws.display_text(row, col))
            }),
            column_ends: None,
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

    /// Replace the test deciding where the leftward formula range ends
    pub fn with_outside_formula<F>(mut self, test: F) -> Self
    where
        F: Fn(&Worksheet, u32, u32) -> bool + Send + Sync + 'static,
    {
        self.outside_formula = Box::new(test);
        self
    }

    /// Replace the test deciding where the totals column stops
    pub fn with_column_end<F>(mut self, test: F) -> Self
    where
        F: Fn(&Worksheet, u32, u32) -> bool + Send + Sync + 'static,
    {
        self.column_ends = Some(Box::new(test));
        self
    }

    fn column_ends(&self, ws: &Worksheet, row: u32, col: u32) -> bool {
        match &self.column_ends {
            Some(test) => test(ws, row, col),
            None => !(self.is_data_cell)(ws, row, col),
        }
    }

    /// Leftmost column of the formula range for the cell at (row, col),
    /// walking left from the cell itself
    fn formula_start_column(
        &self,
        ws: &Worksheet,
        bounds: CellRange,
        row: u32,
        col: u32,
    ) -> Option<u32> {
        Cursor::new(row, col)
            .walk(Direction::Left, bounds)
            .take_while(|c| !(self.outside_formula)(ws, c.row, c.col))
            .last()
            .map(|c| c.col)
    }

    fn fill_column(
        &self,
        ws: &mut Worksheet,
        bounds: CellRange,
        header_row: u32,
        col: u32,
    ) -> Result<()> {
        let summary_cells: Vec<Cursor> = Cursor::new(header_row + 1, col)
            .walk(Direction::Down, bounds)
            .take_while(|c| !self.column_ends(ws, c.row, c.col))
            .collect();
        for cell in summary_cells {
            // Column-end overrides may let blanks through; they get nothing.
            if predicate::is_empty_cell(ws, cell.row, cell.col) {
                continue;
            }
            let Some(start_col) = self.formula_start_column(ws, bounds, cell.row, col) else {
                log::debug!("No formula range left of cell {}", cell_ref(cell.row, col));
                continue;
            };
            if start_col >= col {
                log::debug!("No columns to sum left of cell {}", cell_ref(cell.row, col));
                continue;
            }
            let formula = format!("SUM({})", row_span_ref(cell.row, start_col, col - 1));
            put_formula(ws, cell.row, cell.col, &formula)?;
        }
        Ok(())
    }
}

impl Default for FullTableSummaryColumn {
    fn default() -> Self {
        Self::new()
    }
}

impl FormulaGenerator for FullTableSummaryColumn {
    fn insert_formulas(
        &self,
        book: &mut Workbook,
        sheet: usize,
        args: &[Instruction],
    ) -> Result<()> {
        let ws = book.worksheet_mut(sheet)?;
        let bounds = cursor::used_range(ws)?;
        for anchor in args::anchors(args) {
            let header =
                cursor::first_matching(bounds, |c| anchor.matches(&ws.display_text(c.row, c.col)));
            let Some(header) = header else {
                log::debug!("No cell matching {anchor} on sheet {}", ws.name());
                continue;
            };
            self.fill_column(ws, bounds, header.row, header.col)?;
        }
        Ok(())
    }
}
