//! Cleaning and formula-generation error types

use thiserror::Error;

/// Result type for cleaning operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while cleaning a workbook or inserting formulas
#[derive(Debug, Error)]
pub enum Error {
    /// A worksheet contained no cells at all
    #[error("worksheet is not populated")]
    NotPopulated,

    /// A generator could not locate the data it was configured to find
    #[error("no data found: {0}")]
    NoDataFound(String),

    /// The worksheet layout violated an assumption of the chosen cleaner
    #[error("invalid layout: {0}")]
    InvalidLayout(String),

    /// A header argument string could not be parsed
    #[error("malformed argument: {0}")]
    MalformedArgument(String),

    /// Error from the underlying cell grid
    #[error(transparent)]
    Grid(#[from] tidysheet_grid::Error),
}
