//! Formula generation strategies
//!
//! Each generator consumes parsed header-argument [`Instruction`]s and writes
//! aggregate formulas into one worksheet's total cells. The variants differ
//! in where totals live relative to their data:
//!
//! - [`FullTableGenerator`] - totals sit in a labeled row under a column of data
//! - [`RowSegmentGenerator`] - totals close explicit start/end header pairs
//! - [`PeriodicGenerator`] / [`PeriodicOnTop`] - sections delimited by key cells
//! - [`SummaryRowGenerator`] - totals reference non-adjacent named rows
//! - [`FullTableSummaryColumn`] - a rightmost column sums the columns to its left
//! - [`CrossSheetGenerator`] - totals reference other sheets' bottom-line formulas
//! - [`MultiGenerator`] - routes one argument list to several generators
//!
//! Formula cells are locked and left visible, and every insertion is logged.

mod budget;
mod cross_sheet;
mod full_table;
mod multi;
mod periodic;
mod row_segment;
mod segment_sums;
mod summary_column;
mod summary_row;

pub use budget::BudgetSegmentGenerator;
pub use cross_sheet::CrossSheetGenerator;
pub use full_table::{sum_only_bolds, sum_other_sums, FullTableGenerator};
pub use multi::MultiGenerator;
pub use periodic::{PeriodicGenerator, PeriodicOnTop};
pub use row_segment::{internal_segments, RowSegmentGenerator, SegmentFill, SegmentSpan};
pub use segment_sums::{sum_of_sums_periodic, sum_within_segment};
pub use summary_column::FullTableSummaryColumn;
pub use summary_row::SummaryRowGenerator;

use tidysheet_grid::{CellAddress, Workbook, Worksheet};

use crate::args::Instruction;
use crate::error::Result;

/// A strategy that writes aggregate formulas into one worksheet
pub trait FormulaGenerator: Send + Sync {
    /// Insert formulas into sheet `sheet` of `book` as directed by `args`
    fn insert_formulas(&self, book: &mut Workbook, sheet: usize, args: &[Instruction])
        -> Result<()>;
}

/// A formula ready for placement, entered plainly or as an array formula
pub enum BuiltFormula {
    Plain(String),
    Array(String),
}

/// Place a built formula into a cell
pub(crate) fn place_formula(
    ws: &mut Worksheet,
    row: u32,
    col: u32,
    built: &BuiltFormula,
) -> Result<()> {
    match built {
        BuiltFormula::Plain(formula) => put_formula(ws, row, col, formula),
        BuiltFormula::Array(formula) => put_array_formula(ws, row, col, formula),
    }
}

/// A1-style reference for a single cell
pub(crate) fn cell_ref(row: u32, col: u32) -> String {
    CellAddress::new(row, col).to_a1()
}

/// A1-style reference for a vertical run, always in colon form
pub(crate) fn column_span_ref(top: u32, bottom: u32, col: u32) -> String {
    format!("{}:{}", cell_ref(top, col), cell_ref(bottom, col))
}

/// A1-style reference for a horizontal run, always in colon form
pub(crate) fn row_span_ref(row: u32, start_col: u32, end_col: u32) -> String {
    format!("{}:{}", cell_ref(row, start_col), cell_ref(row, end_col))
}

/// SUM formula over a vertical run
pub(crate) fn sum_range(top: u32, bottom: u32, col: u32) -> String {
    format!("SUM({})", column_span_ref(top, bottom, col))
}

/// SUM formula over an explicit reference list, `SUM()` when empty
pub(crate) fn sum_list(refs: &[String]) -> String {
    format!("SUM({})", refs.join(","))
}

/// Write a formula into a cell, lock it, and leave the formula visible
pub(crate) fn put_formula(ws: &mut Worksheet, row: u32, col: u32, formula: &str) -> Result<()> {
    ws.set_formula(row, col, formula)?;
    mark_formula_cell(ws, row, col, formula)
}

/// Write an array formula into a cell, lock it, and leave the formula visible
pub(crate) fn put_array_formula(
    ws: &mut Worksheet,
    row: u32,
    col: u32,
    formula: &str,
) -> Result<()> {
    ws.set_array_formula(row, col, formula)?;
    mark_formula_cell(ws, row, col, formula)
}

fn mark_formula_cell(ws: &mut Worksheet, row: u32, col: u32, formula: &str) -> Result<()> {
    ws.modify_style(row, col, |style| {
        style.protection.locked = true;
        style.protection.hidden = false;
    })?;
    log::debug!("Cell {} given formula {formula}", cell_ref(row, col));
    Ok(())
}
