//! # tidysheet
//!
//! Rule-driven table structure recovery for exported spreadsheet reports.
//!
//! Report exports arrive as display artifacts: titles merged across half
//! the sheet, dollar amounts stored as text, totals with no formulas
//! behind them. This crate reverses that. A cleaning pipeline unmerges and
//! straightens each worksheet, and a family of formula generators rebuilds
//! live SUM formulas from the table structure the layout implies.
//!
//! - Merge cleaners flatten merged regions while keeping headers readable
//! - Cell data repair turns stored-as-text money, percentages, and dates
//!   back into typed values
//! - Formula generators recompute full-table, segmented, periodic, and
//!   cross-sheet totals
//! - A [`Registry`] maps report names (and single sheets) to the cleaner
//!   and formula plan that fit their layout
//!
//! ## Example
//!
//! ```rust
//! use tidysheet::{add_formulas, clean_workbook, Registry, ReportIdentity, Workbook};
//!
//! # fn demo(mut book: Workbook) -> tidysheet::Result<()> {
//! let registry = Registry::new();
//! let report = ReportIdentity::new("TrialBalance");
//!
//! clean_workbook(&mut book, &report, &registry)?;
//! add_formulas(&mut book, &report, &registry)?;
//! # Ok(())
//! # }
//! ```

pub mod args;
pub mod cleaning;
pub mod cursor;
pub mod error;
pub mod formulas;
pub mod metadata;
pub mod pipeline;
pub mod predicate;
pub mod registry;

pub use error::{Error, Result};
pub use pipeline::{add_formulas, clean_workbook, clean_worksheet};
pub use registry::{FormulaPlan, Registry, ReportConfig, ReportIdentity};

// Strategy seams
pub use cleaning::MergeCleaner;
pub use formulas::FormulaGenerator;

// Re-export the object model so callers need only one crate
pub use tidysheet_grid::{CellAddress, CellRange, CellValue, Workbook, Worksheet};
