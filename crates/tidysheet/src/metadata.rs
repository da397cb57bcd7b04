//! Argument derivation read from the worksheet itself
//!
//! A few report layouts cannot be described by a fixed argument list: the
//! headers that matter depend on what the report happens to contain. The
//! functions here scan a worksheet at dispatch time and build the argument
//! strings its generator needs.

use tidysheet_grid::{CellRange, Worksheet};

use crate::cursor::{self, Cursor, Direction};
use crate::predicate;

/// Arguments for a payables-style report with two nested header columns.
///
/// The leftmost column holding start/end header pairs is the outer grouping,
/// the next such column the inner one. Inner ranges are routed to generator
/// 1, outer ranges to generator 2, and two summary arguments over the outer
/// end headers are appended for the summary-row pass.
pub fn payables_account_headers(ws: &Worksheet) -> Vec<String> {
    let Some(bounds) = ws.dimension() else {
        return Vec::new();
    };
    let mut columns = (bounds.start.col..=bounds.end.col)
        .map(|col| header_pairs_in_column(ws, bounds, col))
        .filter(|pairs| !pairs.is_empty());
    let Some(outer) = columns.next() else {
        return Vec::new();
    };
    let inner = columns.next().unwrap_or_default();

    let mut headers: Vec<String> = inner.iter().map(|pair| format!("1{pair}")).collect();
    headers.extend(outer.iter().map(|pair| format!("2{pair}")));

    let ends: Vec<&str> = outer
        .iter()
        .filter_map(|pair| pair.split_once('=').map(|(_, end)| end))
        .collect();
    if !ends.is_empty() {
        headers.push(format!("Total~{}", ends.join(",")));
        headers.push(format!("Total:~{}", ends.join(",")));
    }
    headers
}

/// Start/end header pairs found in one column, as `start=end` arguments.
///
/// A pair is a bold cell whose matching `Total <start>` cell below it is
/// also bold. The scan resumes below each end header, so nested sections in
/// other columns are left for their own column's scan.
fn header_pairs_in_column(ws: &Worksheet, bounds: CellRange, col: u32) -> Vec<String> {
    let mut pairs = Vec::new();
    let mut row = bounds.start.row;
    while row <= bounds.end.row {
        if predicate::is_empty_cell(ws, row, col) || !predicate::is_bold(ws, row, col) {
            row += 1;
            continue;
        }
        let start_text = ws.display_text(row, col);
        match find_end_header(ws, bounds, row, col, &start_text) {
            Some(end_row) if predicate::is_bold(ws, end_row, col) => {
                let end_text = ws.display_text(end_row, col);
                pairs.push(format!("{}={}", start_text.trim(), end_text.trim()));
                row = end_row + 1;
            }
            _ => row += 1,
        }
    }
    pairs
}

fn find_end_header(
    ws: &Worksheet,
    bounds: CellRange,
    start_row: u32,
    col: u32,
    start_text: &str,
) -> Option<u32> {
    let target = format!("Total {start_text}");
    ((start_row + 1)..=bounds.end.row).find(|&row| ws.display_text(row, col) == target)
}

/// Whether an aged-receivables layout carries per-tenant subtotal rows.
///
/// The variant with subtotals repeats a "Total" row under each tenant in
/// the Description column; six or more is taken as that variant.
pub fn aged_receivables_needs_subtotals(ws: &Worksheet) -> bool {
    let Some(bounds) = ws.dimension() else {
        return false;
    };
    let Some(description) = find_trimmed(ws, bounds, "Description") else {
        return false;
    };
    let subtotals = description
        .walk(Direction::Down, bounds)
        .filter(|c| ws.display_text(c.row, c.col).trim() == "Total")
        .count();
    subtotals >= 6
}

/// Column headers right of "Description", routed to generator 2.
///
/// The header texts come straight from the sheet, so they are escaped
/// before being handed to the pattern parser.
pub fn aged_receivables_subtotal_columns(ws: &Worksheet) -> Vec<String> {
    let Some(bounds) = ws.dimension() else {
        return Vec::new();
    };
    let Some(description) = find_trimmed(ws, bounds, "Description") else {
        return Vec::new();
    };
    description
        .walk(Direction::Right, bounds)
        .skip(1)
        .filter(|c| !predicate::is_empty_cell(ws, c.row, c.col))
        .map(|c| format!("2{}", regex::escape(ws.display_text(c.row, c.col).trim())))
        .collect()
}

/// The single anchor argument of a ledger-style report.
///
/// The total label sits in the first column of the last row; anything else
/// there means the sheet gets no formulas.
pub fn ledger_report_headers(ws: &Worksheet) -> Vec<String> {
    let Some(bounds) = ws.dimension() else {
        return Vec::new();
    };
    let row = bounds.end.row;
    if predicate::is_empty_cell(ws, row, 1) || !predicate::is_bold(ws, row, 1) {
        return Vec::new();
    }
    vec![ws.display_text(row, 1).trim().to_string()]
}

fn find_trimmed(ws: &Worksheet, bounds: CellRange, text: &str) -> Option<Cursor> {
    cursor::first_matching(bounds, |c| ws.display_text(c.row, c.col).trim() == text)
}
