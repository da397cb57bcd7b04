//! Cleaning and formula entry points
//!
//! [`clean_worksheet`] runs the fixed repair sequence on one sheet: hidden
//! rows, hyperlinks, merges, row groups, stored-as-text data, and last the
//! report-specific summary-cell move. Order matters here: merges are
//! classified against the rows that survive deletion, and data repair runs
//! after unmerging so it sees final cell positions. [`clean_workbook`] and
//! [`add_formulas`] drive whole workbooks off a [`Registry`].

use once_cell::sync::Lazy;
use regex::Regex;
use tidysheet_grid::{
    CellValue, HorizontalAlignment, NumberFormat, Workbook, Worksheet, FORMAT_CURRENCY_CENTS,
    FORMAT_CURRENCY_WHOLE, FORMAT_PERCENT,
};

use crate::cleaning::{BackupMergeCleaner, MergeCleaner};
use crate::error::{Error, Result};
use crate::formulas::{FormulaGenerator, SummaryRowGenerator};
use crate::predicate::{is_dollar_value, is_percentage};
use crate::registry::{FormulaPlan, Registry, ReportConfig, ReportIdentity};

static TWO_DIGIT_YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d\d/\d\d/\d\d$").unwrap());

/// Clean every worksheet of a report workbook
///
/// Worksheets with no content are removed outright; the rest go through
/// [`clean_worksheet`] with the config registered for their position.
pub fn clean_workbook(
    book: &mut Workbook,
    report: &ReportIdentity,
    registry: &Registry,
) -> Result<()> {
    remove_empty_worksheets(book)?;
    for sheet in 0..book.sheet_count() {
        let config = registry.lookup(&report.name, sheet);
        clean_worksheet(book.worksheet_mut(sheet)?, config)?;
    }
    Ok(())
}

/// Run the cleaning sequence on one worksheet
pub fn clean_worksheet(ws: &mut Worksheet, config: &ReportConfig) -> Result<()> {
    if ws.dimension().is_none() {
        return Ok(());
    }
    delete_hidden_rows(ws)?;
    remove_hyperlinks(ws);
    remove_merges(ws, config)?;
    ungroup_rows(ws);
    correct_cell_data_types(ws)?;
    if config.move_summary_cells {
        move_summary_cells(ws)?;
    }
    Ok(())
}

/// Insert the formulas configured for a report
///
/// Sheets whose config carries no formula plan are left alone. After the
/// plan's generator, the summary-row pass always runs over the same
/// arguments; it consumes only the non-contiguous ones. A failure on one
/// sheet is logged and does not stop the others.
pub fn add_formulas(
    book: &mut Workbook,
    report: &ReportIdentity,
    registry: &Registry,
) -> Result<()> {
    remove_empty_worksheets(book)?;
    for sheet in 0..book.sheet_count() {
        let config = registry.lookup(&report.name, sheet);
        let Some(plan) = config.plan.as_ref() else {
            continue;
        };
        if let Err(err) = insert_planned_formulas(book, sheet, plan) {
            log::warn!("Formulas skipped on sheet {sheet} of {}: {err}", report.name);
        }
    }
    Ok(())
}

fn insert_planned_formulas(book: &mut Workbook, sheet: usize, plan: &FormulaPlan) -> Result<()> {
    let instructions = plan.instructions(book, sheet)?;
    if let Some(generator) = &plan.generator {
        generator.insert_formulas(book, sheet, &instructions)?;
    }
    SummaryRowGenerator::new().insert_formulas(book, sheet, &instructions)
}

pub(crate) fn remove_empty_worksheets(book: &mut Workbook) -> Result<()> {
    for sheet in (0..book.sheet_count()).rev() {
        if book.worksheet(sheet)?.dimension().is_none() {
            let removed = book.remove_worksheet(sheet)?;
            log::debug!("Removed empty worksheet {:?}", removed.name());
        }
    }
    Ok(())
}

fn delete_hidden_rows(ws: &mut Worksheet) -> Result<()> {
    let Some(bounds) = ws.dimension() else {
        return Ok(());
    };
    for row in (1..=bounds.end.row).rev() {
        if ws.is_row_hidden(row) {
            ws.delete_row(row)?;
            log::debug!("Deleted hidden row {row}");
        } else if row_is_safe_to_delete(ws, row) {
            ws.delete_row(row)?;
            log::debug!("Deleted collapsed row {row}");
        }
    }
    Ok(())
}

/// A row nobody will miss: shorter than 3 points and without any text
fn row_is_safe_to_delete(ws: &Worksheet, row: u32) -> bool {
    if ws.row_height(row) >= 3.0 {
        return false;
    }
    let Some(bounds) = ws.dimension() else {
        return false;
    };
    (1..=bounds.end.col).all(|col| ws.display_text(row, col).is_empty())
}

fn remove_hyperlinks(ws: &mut Worksheet) {
    for (row, col) in ws.hyperlink_cells() {
        if let Some(target) = ws.remove_hyperlink(row, col) {
            log::debug!("Removed hyperlink {target} from ({row}, {col})");
        }
    }
}

fn remove_merges(ws: &mut Worksheet, config: &ReportConfig) -> Result<()> {
    match config.cleaner.unmerge(ws) {
        Err(Error::InvalidLayout(reason)) => {
            log::warn!(
                "Sheet {:?} does not fit its configured merge cleaner ({reason}), \
                 retrying with the backup cleaner",
                ws.name()
            );
            BackupMergeCleaner::new().unmerge(ws)
        }
        other => other,
    }
}

fn ungroup_rows(ws: &mut Worksheet) {
    for row in ws.outlined_rows() {
        ws.set_row_outline_level(row, 0);
    }
}

fn correct_cell_data_types(ws: &mut Worksheet) -> Result<()> {
    let Some(bounds) = ws.dimension() else {
        return Ok(());
    };
    for row in 1..=bounds.end.row {
        for col in 1..=bounds.end.col {
            correct_cell(ws, row, col)?;
        }
    }
    Ok(())
}

/// Repair one cell stored with the wrong data type
///
/// Dollar amounts and percentages exported as text become numbers with the
/// matching display format; two-digit years become four-digit ones; plain
/// numeric text is only flagged so spreadsheet applications stop warning
/// about it.
fn correct_cell(ws: &mut Worksheet, row: u32, col: u32) -> Result<()> {
    let text = ws.display_text(row, col);
    if text.is_empty() {
        return Ok(());
    }

    // Some reports hold NaN where a checkmark belongs.
    if matches!(ws.value(row, col), CellValue::Number(n) if n.is_nan()) {
        return Ok(ws.set_value(row, col, "ü")?);
    }
    if !matches!(ws.value(row, col), CellValue::Text(_)) {
        return Ok(());
    }

    if parses_as_plain_number(&text) {
        // An ID or count, not money. Keep it text but silence the
        // number-stored-as-text warning.
        ws.flag_number_as_text(row, col);
        return Ok(());
    }

    if text == "$" {
        // A lone dollar sign stands for an amount of zero.
        ws.set_value(row, col, 0.0)?;
        set_format(ws, row, col, FORMAT_CURRENCY_CENTS)?;
    } else if is_dollar_value(&text) && !text.contains('.') {
        let Some(amount) = parse_dollar_text(&text) else {
            return Ok(());
        };
        ws.set_value(row, col, amount)?;
        set_format(ws, row, col, FORMAT_CURRENCY_WHOLE)?;
    } else if is_dollar_value(&text) {
        let Some(amount) = parse_dollar_text(&text) else {
            return Ok(());
        };
        ws.set_value(row, col, amount)?;
        set_format(ws, row, col, FORMAT_CURRENCY_CENTS)?;
    } else if TWO_DIGIT_YEAR_RE.is_match(&text) {
        let repaired = format!("{}20{}", &text[..6], &text[6..]);
        return Ok(ws.set_value(row, col, repaired)?);
    } else if is_percentage(&text) {
        let Some(amount) = parse_percent_text(&text) else {
            return Ok(());
        };
        ws.set_value(row, col, amount)?;
        set_format(ws, row, col, FORMAT_PERCENT)?;
    } else {
        return Ok(());
    }

    // General alignment renders text left but numbers right; pin the
    // converted cell left so it keeps its place on the page.
    if ws.style(row, col).alignment.horizontal == HorizontalAlignment::General {
        ws.modify_style(row, col, |style| {
            style.alignment.horizontal = HorizontalAlignment::Left;
        })?;
    }
    Ok(())
}

/// Matches the lenient numeric parse report exports rely on: group
/// separators anywhere, optional sign and exponent
fn parses_as_plain_number(text: &str) -> bool {
    text.replace(',', "").trim().parse::<f64>().is_ok()
}

fn strip_parens(text: &str) -> (&str, bool) {
    match text.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
        Some(inner) => (inner, true),
        None => (text, false),
    }
}

/// Strip `(...)`, `$`, and commas off a dollar text, keeping the sign
fn parse_dollar_text(text: &str) -> Option<f64> {
    let (inner, negative) = strip_parens(text);
    let amount: f64 = inner.strip_prefix('$')?.replace(',', "").parse().ok()?;
    Some(if negative { -amount } else { amount })
}

fn parse_percent_text(text: &str) -> Option<f64> {
    let (inner, negative) = strip_parens(text);
    let amount: f64 = inner.strip_suffix('%')?.parse().ok()?;
    Some(if negative { -amount } else { amount })
}

/// Move stray dollar values in the last column one cell left
///
/// Some exports land their summary column one column too far right,
/// leaving a gap between it and the table.
fn move_summary_cells(ws: &mut Worksheet) -> Result<()> {
    let Some(bounds) = ws.dimension() else {
        return Ok(());
    };
    let col = bounds.end.col;
    if col < 2 {
        return Ok(());
    }
    for row in 1..=bounds.end.row {
        if !is_dollar_value(&ws.display_text(row, col)) {
            continue;
        }
        if !ws.display_text(row, col - 1).is_empty() {
            continue;
        }
        ws.copy_style((row, col), (row, col - 1))?;
        let value = ws.value(row, col);
        ws.set_value(row, col - 1, value)?;
        ws.clear_value(row, col);
    }
    Ok(())
}

fn set_format(ws: &mut Worksheet, row: u32, col: u32, format: &str) -> Result<()> {
    ws.modify_style(row, col, |style| {
        style.number_format = NumberFormat::Custom(format.to_string());
    })?;
    Ok(())
}
