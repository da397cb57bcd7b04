//! Per-report cleanup jobs
//!
//! Small fixups registered on a cleaner with `with_job` and run after the
//! structural work. Each is a free function so report configuration can
//! compose it with whatever parameters the report needs.

use tidysheet_grid::{HorizontalAlignment, Worksheet};

use crate::cursor;
use crate::cursor::Direction;
use crate::error::Result;
use crate::predicate::is_dollar_value;

/// Widen every column to at least `min_width`
pub fn set_columns_to_minimum_width(ws: &mut Worksheet, min_width: f64) -> Result<()> {
    let Some(bounds) = ws.dimension() else {
        return Ok(());
    };
    for col in 1..=bounds.end.col {
        if ws.column_width(col) < min_width {
            ws.set_column_width(col, min_width);
        }
    }
    Ok(())
}

/// Narrow every column to at most `max_width`
pub fn apply_column_max_width(ws: &mut Worksheet, max_width: f64) -> Result<()> {
    let Some(bounds) = ws.dimension() else {
        return Ok(());
    };
    for col in 1..=bounds.end.col {
        if ws.column_width(col) > max_width {
            ws.set_column_width(col, max_width);
        }
    }
    Ok(())
}

/// Line up a drifting money column
///
/// Finds the first dollar cell in the sheet, reads the horizontal alignment
/// most cells below it use, and applies that alignment to every dollar cell
/// in the column. First seen wins ties.
pub fn realign_data_column(ws: &mut Worksheet) -> Result<()> {
    let Some(bounds) = ws.dimension() else {
        return Ok(());
    };
    let Some(top) = cursor::first_matching(bounds, |cur| {
        is_dollar_value(&ws.display_text(cur.row, cur.col))
    }) else {
        return Ok(());
    };

    let mut counts: Vec<(HorizontalAlignment, usize)> = Vec::new();
    for cur in top.walk(Direction::Down, bounds) {
        let alignment = ws.style(cur.row, cur.col).alignment.horizontal;
        match counts.iter_mut().find(|(seen, _)| *seen == alignment) {
            Some((_, n)) => *n += 1,
            None => counts.push((alignment, 1)),
        }
    }
    let mut winner = (HorizontalAlignment::General, 0);
    for (alignment, n) in counts {
        if n > winner.1 {
            winner = (alignment, n);
        }
    }

    for cur in top.walk(Direction::Down, bounds) {
        if is_dollar_value(&ws.display_text(cur.row, cur.col)) {
            ws.modify_style(cur.row, cur.col, |style| {
                style.alignment.horizontal = winner.0;
            })?;
        }
    }
    Ok(())
}

/// Give the first header whose trimmed text is `header_text` the specified
/// alignment
pub fn realign_single_header(
    ws: &mut Worksheet,
    header_text: &str,
    alignment: HorizontalAlignment,
) -> Result<()> {
    let Some(bounds) = ws.dimension() else {
        return Ok(());
    };
    let Some(cur) = cursor::first_matching(bounds, |cur| {
        ws.display_text(cur.row, cur.col).trim() == header_text
    }) else {
        return Ok(());
    };
    ws.modify_style(cur.row, cur.col, |style| {
        style.alignment.horizontal = alignment;
    })?;
    Ok(())
}

/// Turn wrap on for every cell under the column headed `column_header`
pub fn set_column_to_wrap_text(ws: &mut Worksheet, column_header: &str) -> Result<()> {
    let Some(bounds) = ws.dimension() else {
        return Ok(());
    };
    let Some(top) = cursor::first_matching(bounds, |cur| {
        ws.display_text(cur.row, cur.col).trim() == column_header
    }) else {
        return Ok(());
    };
    set_column_to_wrap_text_from(ws, top.row + 1, top.col)
}

/// Turn wrap on from `(row, col)` down to the bottom of the sheet
pub fn set_column_to_wrap_text_from(ws: &mut Worksheet, row: u32, col: u32) -> Result<()> {
    let Some(bounds) = ws.dimension() else {
        return Ok(());
    };
    for row in row..=bounds.end.row {
        ws.modify_style(row, col, |style| style.alignment.wrap_text = true)?;
    }
    Ok(())
}

/// Give the last used row the specified height
pub fn set_last_row_height(ws: &mut Worksheet, height: f64) -> Result<()> {
    if let Some(bounds) = ws.dimension() {
        ws.set_row_height(bounds.end.row, height);
    }
    Ok(())
}

/// Drop any existing freeze and pin back only the rows above the first
/// dollar value, for reports that arrive with data rows stuck to the screen
pub fn refreeze_rows_above_data(ws: &mut Worksheet) -> Result<()> {
    let Some(bounds) = ws.dimension() else {
        return Ok(());
    };
    let Some(first_dollar) = cursor::first_matching(bounds, |cur| {
        is_dollar_value(&ws.display_text(cur.row, cur.col))
    }) else {
        return Ok(());
    };
    let panes = if first_dollar.row > 1 {
        Some((first_dollar.row - 1, 0))
    } else {
        None
    };
    ws.set_freeze_panes(panes);
    Ok(())
}
