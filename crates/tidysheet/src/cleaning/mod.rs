//! Merge removal and layout repair
//!
//! Reports encode their visual layout in merged regions: a title merged
//! across the page, section names merged over a few columns, data merged so
//! it lines up under its heading. The cleaners here dissolve every merge and
//! then repair the fallout so the sheet reads as a plain grid again.
//!
//! Every cleaner runs the same fixed sequence: locate the table, unmerge,
//! resize squeezed rows and columns, drop columns the unmerging left empty,
//! then finish with header, border, and per-report cleanup work. The
//! variants differ in how much layout they are willing to assume:
//!
//! - [`PrimaryMergeCleaner`] - standard report layout, full repair
//! - [`BackupMergeCleaner`] - no layout assumptions, conservative repair
//! - [`RealigningMergeCleaner`] - primary plus drift correction for cells
//!   stranded outside their data column by the unmerge
//! - [`MinimumWidthMergeCleaner`] - primary plus a width floor for every
//!   column the first table row uses

mod backup;
mod column_width;
pub mod jobs;
mod primary;
mod realign;

pub use backup::BackupMergeCleaner;
pub use column_width::MinimumWidthMergeCleaner;
pub use primary::PrimaryMergeCleaner;
pub use realign::RealigningMergeCleaner;

use tidysheet_grid::{CellRange, HorizontalAlignment, Worksheet};

use crate::error::Result;
use crate::predicate::{has_formula, is_dollar_value, is_empty_cell, CellTest};

/// Header text in columns 2 through this one is a candidate for the
/// move-left pass.
const MAJOR_HEADER_COLUMNS: u32 = 3;

/// A strategy that removes every merged region from one worksheet and
/// repairs the layout damage the removal causes
pub trait MergeCleaner: Send + Sync {
    /// Unmerge `ws` and repair it in place
    fn unmerge(&self, ws: &mut Worksheet) -> Result<()>;
}

/// Extra per-report cleanup run after the structural work
pub type CleanupJob = Box<dyn Fn(&mut Worksheet) -> Result<()> + Send + Sync>;

/// What a merged region holds, decided before it is dissolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeType {
    /// The range is not a merged region
    NotAMerge,
    /// The anchor displays no text
    Empty,
    /// A header above the first table row
    MainHeader,
    /// Inside the table but failing the data test
    MinorHeader,
    /// The anchor passes the data test
    Data,
}

/// Which borders the finishing pass strips from the header region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderRemoval {
    /// Leave all borders alone
    None,
    /// Strip every border except the bottom edge of the last header row
    All,
    /// Strip borders only off empty cells whose neighbor on that side is
    /// also empty
    OnlyEmptyCells,
}

/// Classify the merged region anchored at `range.start`
pub fn classify_merge(
    ws: &Worksheet,
    range: &CellRange,
    first_table_row: u32,
    is_data: &CellTest,
) -> MergeType {
    if !ws.merged_regions().contains(range) {
        return MergeType::NotAMerge;
    }
    let (row, col) = (range.start.row, range.start.col);
    if is_empty_cell(ws, row, col) {
        MergeType::Empty
    } else if is_data(ws, row, col) {
        MergeType::Data
    } else if row < first_table_row {
        MergeType::MainHeader
    } else {
        MergeType::MinorHeader
    }
}

/// Default data test for merge classification: a dollar amount or a cell
/// that already carries a formula
pub(crate) fn dollar_or_formula() -> CellTest {
    Box::new(|ws, row, col| {
        is_dollar_value(&ws.display_text(row, col)) || has_formula(ws, row, col)
    })
}

/// First row holding two or more populated cells, scanning top down
///
/// Merge shadows hold no text in this grid, so a title merged across the
/// page counts as one populated cell.
pub(crate) fn find_first_table_row(ws: &Worksheet) -> Option<u32> {
    let bounds = ws.dimension()?;
    (bounds.start.row..=bounds.end.row).find(|&row| {
        (bounds.start.col..=bounds.end.col)
            .filter(|&col| !is_empty_cell(ws, row, col))
            .count()
            >= 2
    })
}

/// Finishing work shared by every cleaner: header moves, border removal,
/// and the registered per-report jobs
pub(crate) struct Finishing {
    pub move_major_headers: bool,
    pub border_removal: BorderRemoval,
    pub jobs: Vec<CleanupJob>,
}

impl Default for Finishing {
    fn default() -> Self {
        Self {
            move_major_headers: true,
            border_removal: BorderRemoval::OnlyEmptyCells,
            jobs: Vec::new(),
        }
    }
}

impl Finishing {
    /// Run the header and border passes over the region above the table,
    /// then every registered job
    pub(crate) fn run(&self, ws: &mut Worksheet, first_table_row: Option<u32>) -> Result<()> {
        if let Some(first_table_row) = first_table_row {
            if self.move_major_headers {
                move_major_headers_left(ws, first_table_row)?;
            }
            clean_non_merged_major_headers(ws, first_table_row)?;
            remove_unwanted_borders(ws, first_table_row, self.border_removal)?;
        }
        self.run_jobs(ws);
        Ok(())
    }

    /// Run the registered jobs, logging and skipping any that fail
    pub(crate) fn run_jobs(&self, ws: &mut Worksheet) {
        for job in &self.jobs {
            if let Err(err) = job(ws) {
                log::warn!("Cleanup job failed, skipping it: {err}");
            }
        }
    }
}

/// Move header text in the first few columns into column 1 when column 1 is
/// free, so the headers survive later column deletion
pub(crate) fn move_major_headers_left(ws: &mut Worksheet, first_table_row: u32) -> Result<()> {
    let Some(bounds) = ws.dimension() else {
        return Ok(());
    };
    let last_col = MAJOR_HEADER_COLUMNS.min(bounds.end.col);
    for col in 2..=last_col {
        for row in 1..first_table_row {
            if !is_empty_cell(ws, row, 1) || is_empty_cell(ws, row, col) {
                continue;
            }
            ws.copy_style((row, col), (row, 1))?;
            let value = ws.value(row, col);
            ws.set_value(row, 1, value)?;
            ws.clear_value(row, col);
            // Headers at the left edge display off screen unless aligned left.
            ws.modify_style(row, 1, |style| {
                style.alignment.horizontal = HorizontalAlignment::Left;
                style.alignment.wrap_text = false;
            })?;
        }
    }
    Ok(())
}

/// Turn wrap off for every header cell above the table and pin its display
/// text, so a date up there cannot collapse into `#####`
pub(crate) fn clean_non_merged_major_headers(
    ws: &mut Worksheet,
    first_table_row: u32,
) -> Result<()> {
    let Some(bounds) = ws.dimension() else {
        return Ok(());
    };
    for row in 1..first_table_row {
        for col in bounds.start.col..=bounds.end.col {
            if is_empty_cell(ws, row, col) {
                continue;
            }
            ws.modify_style(row, col, |style| style.alignment.wrap_text = false)?;
            let text = ws.display_text(row, col);
            ws.set_value(row, col, text)?;
        }
    }
    Ok(())
}

/// Strip borders from the header region above the table
pub(crate) fn remove_unwanted_borders(
    ws: &mut Worksheet,
    first_table_row: u32,
    mode: BorderRemoval,
) -> Result<()> {
    if mode == BorderRemoval::None {
        return Ok(());
    }
    let Some(bounds) = ws.dimension() else {
        return Ok(());
    };
    for row in 1..first_table_row {
        for col in bounds.start.col..=bounds.end.col {
            match mode {
                BorderRemoval::None => {}
                BorderRemoval::All => {
                    // The bottom edge of the last header row may decorate
                    // the top of the table, leave it alone.
                    strip_all_borders(ws, row, col, row + 1 == first_table_row)?;
                }
                BorderRemoval::OnlyEmptyCells => {
                    strip_borders_if_isolated(ws, row, col, bounds)?;
                }
            }
        }
    }
    Ok(())
}

fn strip_all_borders(ws: &mut Worksheet, row: u32, col: u32, keep_bottom: bool) -> Result<()> {
    let border = &ws.style(row, col).border;
    let any = border.top.is_some()
        || border.left.is_some()
        || border.right.is_some()
        || (!keep_bottom && border.bottom.is_some());
    if !any {
        return Ok(());
    }
    ws.modify_style(row, col, |style| {
        style.border.top = None;
        style.border.left = None;
        style.border.right = None;
        if !keep_bottom {
            style.border.bottom = None;
        }
    })?;
    Ok(())
}

/// A border may belong visually to the neighboring cell, so each side goes
/// only when the cell and its neighbor on that side are both empty
fn strip_borders_if_isolated(
    ws: &mut Worksheet,
    row: u32,
    col: u32,
    bounds: CellRange,
) -> Result<()> {
    if !is_empty_cell(ws, row, col) {
        return Ok(());
    }
    let border = ws.style(row, col).border.clone();
    if border.is_empty() {
        return Ok(());
    }
    let top = border.top.is_some() && (row == 1 || is_empty_cell(ws, row - 1, col));
    let bottom =
        border.bottom.is_some() && (row == bounds.end.row || is_empty_cell(ws, row + 1, col));
    let left = border.left.is_some() && (col == 1 || is_empty_cell(ws, row, col - 1));
    let right =
        border.right.is_some() && (col == bounds.end.col || is_empty_cell(ws, row, col + 1));
    if !(top || bottom || left || right) {
        return Ok(());
    }
    ws.modify_style(row, col, |style| {
        if top {
            style.border.top = None;
        }
        if bottom {
            style.border.bottom = None;
        }
        if left {
            style.border.left = None;
        }
        if right {
            style.border.right = None;
        }
    })?;
    Ok(())
}

/// Split a header whose text holds newlines into one row per line
///
/// Inserts a row per extra line directly below the header, repeats the
/// header's text styling on each line, and walks the bottom border down to
/// the last one. Returns the number of rows inserted.
pub(crate) fn split_header_into_rows(ws: &mut Worksheet, row: u32, col: u32) -> Result<u32> {
    let text = ws.display_text(row, col);
    if !text.contains('\n') {
        return Ok(0);
    }
    let lines: Vec<&str> = text.split('\n').collect();
    let inserted = lines.len() as u32 - 1;
    for _ in 0..inserted {
        ws.insert_row(row + 1)?;
    }
    for (offset, line) in lines.iter().enumerate() {
        let target = row + offset as u32;
        ws.set_value(target, col, line.to_string())?;
        copy_text_styles(ws, (row, col), (target, col))?;
    }
    let bottom = ws.style(row, col).border.bottom.clone();
    ws.modify_style(row + inserted, col, |style| style.border.bottom = bottom)?;
    ws.modify_style(row, col, |style| style.border.bottom = None)?;
    Ok(inserted)
}

/// Copy the style fields a split or realigned cell keeps: alignment, wrap,
/// and the face of the font. Borders and fill stay where they are.
pub(crate) fn copy_text_styles(ws: &mut Worksheet, from: (u32, u32), to: (u32, u32)) -> Result<()> {
    if from == to {
        return Ok(());
    }
    let source = ws.style(from.0, from.1).clone();
    ws.modify_style(to.0, to.1, move |style| {
        style.alignment.horizontal = source.alignment.horizontal;
        style.alignment.vertical = source.alignment.vertical;
        style.alignment.wrap_text = source.alignment.wrap_text;
        style.font.bold = source.font.bold;
        style.font.size = source.font.size;
        style.font.name = source.font.name;
    })?;
    Ok(())
}
