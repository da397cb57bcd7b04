//! Error types for the grid object model

use thiserror::Error;

/// Errors raised by the worksheet object model
#[derive(Debug, Error)]
pub enum Error {
    /// Cell address could not be parsed
    #[error("Invalid cell address: {0}")]
    InvalidAddress(String),

    /// Cell range could not be parsed
    #[error("Invalid cell range: {0}")]
    InvalidRange(String),

    /// Row index outside worksheet limits
    #[error("Row {row} out of bounds (1..={max})")]
    RowOutOfBounds { row: u32, max: u32 },

    /// Column index outside worksheet limits
    #[error("Column {col} out of bounds (1..={max})")]
    ColumnOutOfBounds { col: u32, max: u32 },

    /// Worksheet index outside workbook
    #[error("Sheet index {0} out of bounds")]
    SheetOutOfBounds(usize),

    /// Worksheet name not found in workbook
    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    /// Worksheet name is empty, too long, or contains illegal characters
    #[error("Invalid sheet name: {0}")]
    InvalidSheetName(String),

    /// Worksheet name already used in this workbook
    #[error("Duplicate sheet name: {0}")]
    DuplicateSheetName(String),

    /// Merge would overlap an existing merged region
    #[error("Merged cell conflict: {0}")]
    MergedCellConflict(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a generic error from any displayable value
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }
}

/// Result alias for grid operations
pub type Result<T> = std::result::Result<T, Error>;
