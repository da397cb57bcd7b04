//! # tidysheet-grid
//!
//! In-memory spreadsheet object model for the tidysheet report cleaner.
//!
//! This crate provides the document types the cleaning and formula passes
//! operate on:
//! - [`CellValue`] - Cell contents (numbers, text, booleans, formulas)
//! - [`CellAddress`] and [`CellRange`] - 1-based A1 addressing and ranges
//! - [`Style`] - Fonts, fills, borders, alignment and number formats
//! - [`Workbook`], [`Worksheet`] - The document structures
//!
//! All cell coordinates are 1-based, matching A1 notation: `(1, 1)` is `A1`.
//!
//! ## Example
//!
//! ```rust
//! use tidysheet_grid::{CellValue, Workbook};
//!
//! let mut workbook = Workbook::new();
//! let sheet = workbook.worksheet_mut(0).unwrap();
//!
//! sheet.set_value(1, 1, "Income").unwrap();
//! sheet.set_value(2, 2, 100.0).unwrap();
//! sheet.set_formula(4, 2, "SUM(B2:B3)").unwrap();
//!
//! assert_eq!(sheet.value(1, 1), CellValue::Text("Income".into()));
//! assert_eq!(sheet.formula_text(4, 2), Some("SUM(B2:B3)"));
//! ```

pub mod cell;
pub mod display;
pub mod error;
pub mod style;
pub mod workbook;
pub mod worksheet;

// Re-exports for convenience
pub use cell::{
    column_to_letters, letters_to_column, CellAddress, CellData, CellRange, CellValue,
    DEFAULT_COLUMN_WIDTH, DEFAULT_ROW_HEIGHT,
};
pub use error::{Error, Result};
pub use workbook::Workbook;
pub use worksheet::Worksheet;

// Re-export all style types for convenience
pub use style::{
    Alignment, BorderEdge, BorderLineStyle, BorderStyle, Color, FillStyle, FontStyle,
    HorizontalAlignment, NumberFormat, Style, StylePool, VerticalAlignment,
    FORMAT_CURRENCY_CENTS, FORMAT_CURRENCY_WHOLE, FORMAT_DATE_MDY, FORMAT_PERCENT,
    FORMAT_THOUSANDS,
};

/// Maximum number of rows in a worksheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet (Excel limit)
pub const MAX_COLS: u32 = 16_384;

/// Maximum length of a sheet name
pub const MAX_SHEET_NAME_LEN: usize = 31;
