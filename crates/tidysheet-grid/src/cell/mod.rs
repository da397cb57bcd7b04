//! Cell-related types
//!
//! - [`CellValue`] - the value stored in a cell
//! - [`CellAddress`] / [`CellRange`] - 1-based positions and rectangles
//! - [`CellData`] - value plus style index
//! - [`CellStorage`] - the sparse grid behind a worksheet

mod address;
mod storage;
mod value;

pub use address::{column_to_letters, letters_to_column, CellAddress, CellRange};
pub use storage::{CellData, CellStorage, DEFAULT_COLUMN_WIDTH, DEFAULT_ROW_HEIGHT};
pub use value::CellValue;
