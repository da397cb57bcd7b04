//! Cell classifiers
//!
//! Boolean tests over a single cell's display text or style, used to tell
//! data cells from headers and totals. Generators take injectable
//! [`CellTest`] overrides so reports that mark data with plain integers or
//! percentages instead of dollar amounts can swap the classifier without
//! changing the scan logic.

use once_cell::sync::Lazy;
use regex::Regex;
use tidysheet_grid::Worksheet;

/// Injectable cell classifier
pub type CellTest = Box<dyn Fn(&Worksheet, u32, u32) -> bool + Send + Sync>;

static PERCENTAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(100([.]00)?%|[.]\d\d%|\d{1,2}([.]\d\d)?%)$").unwrap());

static INTEGER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(0|-?[1-9]\d*)$").unwrap());

static INTEGER_WITH_COMMAS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(0|-?[1-9]\d{0,2}(,\d{3})*)$").unwrap());

/// True when the display text is zero-length
pub fn is_empty_text(text: &str) -> bool {
    text.is_empty()
}

/// True when the cell at (row, col) displays no text
pub fn is_empty_cell(ws: &Worksheet, row: u32, col: u32) -> bool {
    is_empty_text(&ws.display_text(row, col))
}

/// True when the text starts with `$`, or is parenthesized as `($...)`
/// (currency-formatted negative)
pub fn is_dollar_value(text: &str) -> bool {
    text.starts_with('$') || (text.starts_with("($") && text.ends_with(')'))
}

/// True when the text renders as a percentage between 0% and 100%
///
/// One layer of surrounding parentheses (negative display) is stripped
/// before matching.
pub fn is_percentage(text: &str) -> bool {
    let inner = text
        .strip_prefix('(')
        .and_then(|t| t.strip_suffix(')'))
        .unwrap_or(text);
    PERCENTAGE_RE.is_match(inner)
}

/// True when the text is a plain integer with no separators
pub fn is_integer_value(text: &str) -> bool {
    INTEGER_RE.is_match(text)
}

/// True when the text is an integer with thousands separators
pub fn is_integer_with_commas(text: &str) -> bool {
    INTEGER_WITH_COMMAS_RE.is_match(text)
}

/// True when the cell at (row, col) carries a formula
pub fn has_formula(ws: &Worksheet, row: u32, col: u32) -> bool {
    ws.has_formula(row, col)
}

/// True when the cell's font is bold
pub fn is_bold(ws: &Worksheet, row: u32, col: u32) -> bool {
    ws.style(row, col).font.bold
}

/// Default data-cell classifier: dollar-formatted display text
pub fn dollar_cell() -> CellTest {
    Box::new(|ws, row, col| is_dollar_value(&ws.display_text(row, col)))
}

/// Classifier for empty display text
pub fn empty_cell() -> CellTest {
    Box::new(is_empty_cell)
}
