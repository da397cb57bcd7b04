//! Totals closing explicit start/end header pairs

use tidysheet_grid::{CellRange, Workbook, Worksheet};

use crate::args::{self, Instruction, TextPattern};
use crate::cursor::{self, Cursor, Direction};
use crate::error::Result;
use crate::formulas::{place_formula, sum_range, BuiltFormula, FormulaGenerator};
use crate::predicate::{self, CellTest};

/// One discovered segment, resolved to the rows a formula should cover
#[derive(Debug, Clone, Copy)]
pub struct SegmentSpan {
    /// First summed row
    pub top: u32,
    /// Last summed row
    pub bottom: u32,
    /// Row receiving the formula (the end header's row)
    pub row: u32,
    /// Column receiving the formula
    pub col: u32,
}

/// Builds the formula for one data column of a segment. The data-cell test
/// in use is passed along so fills can enumerate cells consistently.
pub type SegmentFill = Box<dyn Fn(&Worksheet, &SegmentSpan, &CellTest) -> BuiltFormula + Send + Sync>;

/// A start/end header pair located on the sheet
struct Segment {
    start_row: u32,
    end_row: u32,
    col: u32,
}

/// Writes totals into rows that close a start header.
///
/// Range arguments name a start and an end pattern. Each cell matching the
/// start opens a segment; the first cell below it in the same column
/// matching the end closes it. Every data cell in the closing row receives
/// a formula over the rows strictly between the two headers. A populated
/// non-data cell in the closing row ends that row's fill.
pub struct RowSegmentGenerator {
    is_data_cell: CellTest,
    trim_range: bool,
    pass_through: Option<CellTest>,
    fill: SegmentFill,
    inner_only: bool,
}

impl RowSegmentGenerator {
    pub fn new() -> Self {
        RowSegmentGenerator {
            is_data_cell: predicate::dollar_cell(),
            trim_range: true,
            pass_through: None,
            fill: segment_sum(),
            inner_only: false,
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

    /// Keep or drop the leading-blank trim at the top of each summed column
    pub fn with_trim(mut self, trim: bool) -> Self {
        self.trim_range = trim;
        self
    }

    /// Let cells matching `test` be stepped over in the closing row instead
    /// of ending the fill
    pub fn with_pass_through<F>(mut self, test: F) -> Self
    where
        F: Fn(&Worksheet, u32, u32) -> bool + Send + Sync + 'static,
    {
        self.pass_through = Some(Box::new(test));
        self
    }

    /// Replace the formula built for each data column
    pub fn with_fill(mut self, fill: SegmentFill) -> Self {
        self.fill = fill;
        self
    }

    fn fill_segment(&self, ws: &mut Worksheet, bounds: CellRange, segment: &Segment) -> Result<()> {
        let Segment {
            start_row,
            end_row,
            col,
        } = *segment;
        if end_row == start_row + 1 {
            log::debug!("Segment closing at row {end_row} has no rows to sum");
            return Ok(());
        }
        let bottom = end_row - 1;
        for target_col in (col + 1)..=bounds.end.col {
            if (self.is_data_cell)(ws, end_row, target_col) {
                let mut top = start_row + 1;
                if self.trim_range {
                    top = (top..=bottom)
                        .find(|&r| !predicate::is_empty_cell(ws, r, target_col))
                        .unwrap_or(top);
                }
                let span = SegmentSpan {
                    top,
                    bottom,
                    row: end_row,
                    col: target_col,
                };
                let built = (self.fill)(ws, &span, &self.is_data_cell);
                place_formula(ws, end_row, target_col, &built)?;
                continue;
            }
            if let Some(pass) = &self.pass_through {
                if pass(ws, end_row, target_col) {
                    continue;
                }
            }
            if !predicate::is_empty_cell(ws, end_row, target_col) {
                return Ok(());
            }
        }
        Ok(())
    }
}

impl Default for RowSegmentGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl FormulaGenerator for RowSegmentGenerator {
    fn insert_formulas(
        &self,
        book: &mut Workbook,
        sheet: usize,
        args: &[Instruction],
    ) -> Result<()> {
        let ws = book.worksheet_mut(sheet)?;
        let bounds = cursor::used_range(ws)?;
        for (start, end) in args::ranges(args) {
            let segments = if self.inner_only {
                nested_segments(ws, bounds, start, end)
            } else {
                standard_segments(ws, bounds, start, end)
            };
            if segments.is_empty() {
                log::debug!("No segment matching {start}={end} on sheet {}", ws.name());
            }
            for segment in &segments {
                self.fill_segment(ws, bounds, segment)?;
            }
        }
        Ok(())
    }
}

/// A segment generator whose starts are nested one column inside an outer
/// section header.
///
/// The first start match fixes the outer column; only start headers to its
/// right open segments.
pub fn internal_segments() -> RowSegmentGenerator {
    RowSegmentGenerator {
        inner_only: true,
        ..RowSegmentGenerator::new()
    }
}

fn segment_sum() -> SegmentFill {
    Box::new(|_, span, _| BuiltFormula::Plain(sum_range(span.top, span.bottom, span.col)))
}

/// First cell below `start` in the same column matching `end`
fn find_segment_end(
    ws: &Worksheet,
    bounds: CellRange,
    start: Cursor,
    end: &TextPattern,
) -> Option<u32> {
    Cursor::new(start.row + 1, start.col)
        .walk(Direction::Down, bounds)
        .find(|&c| end.matches(&ws.display_text(c.row, c.col)))
        .map(|c| c.row)
}

/// Row-major successor of `c` inside `bounds`
fn next_cell(bounds: CellRange, c: Cursor) -> Option<Cursor> {
    if c.col < bounds.end.col {
        Some(Cursor::new(c.row, c.col + 1))
    } else if c.row < bounds.end.row {
        Some(Cursor::new(c.row + 1, bounds.start.col))
    } else {
        None
    }
}

/// Locate every start/end pair, resuming below each closed segment.
/// A start with no end below it is skipped.
fn standard_segments(
    ws: &Worksheet,
    bounds: CellRange,
    start: &TextPattern,
    end: &TextPattern,
) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut pos = Some(Cursor::new(bounds.start.row, bounds.start.col));
    while let Some(from) = pos {
        let found = cursor::scan_from(bounds, from)
            .find(|&c| start.matches(&ws.display_text(c.row, c.col)));
        let Some(m) = found else { break };
        match find_segment_end(ws, bounds, m, end) {
            Some(end_row) => {
                segments.push(Segment {
                    start_row: m.row,
                    end_row,
                    col: m.col,
                });
                pos = (end_row < bounds.end.row)
                    .then(|| Cursor::new(end_row + 1, bounds.start.col));
            }
            None => pos = next_cell(bounds, m),
        }
    }
    segments
}

/// Like [`standard_segments`], but the first match only fixes the outer
/// column and segments open at matches strictly to its right
fn nested_segments(
    ws: &Worksheet,
    bounds: CellRange,
    start: &TextPattern,
    end: &TextPattern,
) -> Vec<Segment> {
    let outer =
        cursor::first_matching(bounds, |c| start.matches(&ws.display_text(c.row, c.col)));
    let Some(outer) = outer else {
        return Vec::new();
    };
    let mut segments = Vec::new();
    let mut pos = Some(Cursor::new(outer.row + 1, bounds.start.col));
    while let Some(from) = pos {
        let found = cursor::scan_from(bounds, from)
            .find(|&c| c.col > outer.col && start.matches(&ws.display_text(c.row, c.col)));
        let Some(m) = found else { break };
        match find_segment_end(ws, bounds, m, end) {
            Some(end_row) => {
                segments.push(Segment {
                    start_row: m.row,
                    end_row,
                    col: m.col,
                });
                pos = if end_row < bounds.end.row {
                    Some(Cursor::new(end_row + 1, outer.col + 1))
                } else {
                    next_cell(bounds, m)
                };
            }
            None => pos = next_cell(bounds, m),
        }
    }
    segments
}
