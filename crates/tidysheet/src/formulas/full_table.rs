//! Totals in labeled rows beneath uninterrupted columns of data

use tidysheet_grid::{CellRange, Workbook, Worksheet};

use crate::args::{self, Instruction};
use crate::cursor::{self, Cursor, Direction};
use crate::error::Result;
use crate::formulas::{
    cell_ref, column_span_ref, place_formula, sum_list, sum_range, BuiltFormula, FormulaGenerator,
};
use crate::predicate::{self, CellTest};

/// Builds the formula for one data column's run: `(sheet, top, bottom, col)`
/// where rows `top..=bottom` are the cells being aggregated.
type RangeFormula = Box<dyn Fn(&Worksheet, u32, u32, u32) -> BuiltFormula + Send + Sync>;

/// Where a column's formula range ends when scanning upward from the total.
enum BeyondRange {
    /// The first populated cell that is not data. Blanks are included in
    /// the range.
    PopulatedNonData,
    /// The first cell that is not data, blanks included.
    NonData,
    Custom(CellTest),
}

/// Writes totals into rows named by anchor arguments.
///
/// Every cell matching an anchor marks a total row. Each data cell to the
/// right of the matched label receives a formula covering the unbroken run
/// of cells directly above it, ending where the beyond-range test fires.
/// Non-data cells inside the total row are stepped over, so gaps between
/// data columns do not cut the row short.
pub struct FullTableGenerator {
    is_data_cell: CellTest,
    beyond_range: BeyondRange,
    range_formula: RangeFormula,
}

impl FullTableGenerator {
    pub fn new() -> Self {
        FullTableGenerator {
            is_data_cell: predicate::dollar_cell(),
            beyond_range: BeyondRange::PopulatedNonData,
            range_formula: Box::new(|_, top, bottom, col| {
                BuiltFormula::Plain(sum_range(top, bottom, col))
            }),
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

    /// End formula ranges at the first non-data cell, even a blank one
    pub fn stop_at_non_data(mut self) -> Self {
        self.beyond_range = BeyondRange::NonData;
        self
    }

    /// Replace the test deciding where a formula range ends
    pub fn with_beyond_range<F>(mut self, test: F) -> Self
    where
        F: Fn(&Worksheet, u32, u32) -> bool + Send + Sync + 'static,
    {
        self.beyond_range = BeyondRange::Custom(Box::new(test));
        self
    }

    fn with_range_formula(mut self, formula: RangeFormula) -> Self {
        self.range_formula = formula;
        self
    }

    fn is_beyond(&self, ws: &Worksheet, row: u32, col: u32) -> bool {
        match &self.beyond_range {
            BeyondRange::PopulatedNonData => {
                !predicate::is_empty_cell(ws, row, col) && !(self.is_data_cell)(ws, row, col)
            }
            BeyondRange::NonData => !(self.is_data_cell)(ws, row, col),
            BeyondRange::Custom(test) => test(ws, row, col),
        }
    }

    /// Top row of the run ending just above `row` in `col`, or `None` when
    /// the cell directly above is already beyond the range
    fn top_of_range(&self, ws: &Worksheet, bounds: CellRange, row: u32, col: u32) -> Option<u32> {
        if row <= bounds.start.row {
            return None;
        }
        Cursor::new(row - 1, col)
            .walk(Direction::Up, bounds)
            .take_while(|c| !self.is_beyond(ws, c.row, c.col))
            .last()
            .map(|c| c.row)
    }

    fn fill_total_row(
        &self,
        ws: &mut Worksheet,
        bounds: CellRange,
        row: u32,
        col: u32,
    ) -> Result<()> {
        for target in Cursor::new(row, col).walk(Direction::Right, bounds) {
            if predicate::is_empty_cell(ws, row, target.col)
                || !(self.is_data_cell)(ws, row, target.col)
            {
                continue;
            }
            let Some(top) = self.top_of_range(ws, bounds, row, target.col) else {
                log::debug!(
                    "No formula range found above cell {}",
                    cell_ref(row, target.col)
                );
                continue;
            };
            let built = (self.range_formula)(ws, top, row - 1, target.col);
            place_formula(ws, row, target.col, &built)?;
        }
        Ok(())
    }
}

impl Default for FullTableGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl FormulaGenerator for FullTableGenerator {
    fn insert_formulas(
        &self,
        book: &mut Workbook,
        sheet: usize,
        args: &[Instruction],
    ) -> Result<()> {
        let ws = book.worksheet_mut(sheet)?;
        let bounds = cursor::used_range(ws)?;
        for anchor in args::anchors(args) {
            let total_rows =
                cursor::all_matching(bounds, |c| anchor.matches(&ws.display_text(c.row, c.col)));
            if total_rows.is_empty() {
                log::debug!("No cell matching {anchor} on sheet {}", ws.name());
                continue;
            }
            for label in total_rows {
                self.fill_total_row(ws, bounds, label.row, label.col)?;
            }
        }
        Ok(())
    }
}

/// A full-table variant whose totals add only the bold cells in each run
pub fn sum_only_bolds() -> FullTableGenerator {
    FullTableGenerator::new().with_range_formula(Box::new(|ws, top, bottom, col| {
        let bolds: Vec<String> = (top..=bottom)
            .filter(|&row| predicate::is_bold(ws, row, col))
            .map(|row| cell_ref(row, col))
            .collect();
        BuiltFormula::Plain(sum_list(&bolds))
    }))
}

/// A full-table variant whose totals re-add only the formula cells in each
/// run, for tables whose data region contains nested subtotal rows
pub fn sum_other_sums() -> FullTableGenerator {
    FullTableGenerator::new().with_range_formula(Box::new(|_, top, bottom, col| {
        let span = column_span_ref(top, bottom, col);
        BuiltFormula::Array(format!("SUM(IF(_xlfn.ISFORMULA({span}), {span}, 0))"))
    }))
}
