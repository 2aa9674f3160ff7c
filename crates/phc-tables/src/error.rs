//! Table loading and validation errors.

use thiserror::Error;

/// Result type for table operations.
pub type TableResult<T> = Result<T, TableError>;

/// Errors that can occur while loading or normalizing a property table.
///
/// These are load-time failures only. Ordinary out-of-range physical
/// queries against a loaded table never error; they degrade to NaN.
#[derive(Error, Debug)]
pub enum TableError {
    /// Table file could not be read.
    #[error("Missing table: {0}")]
    Io(#[from] std::io::Error),

    /// Table file is not valid JSON or does not match the schema.
    #[error("Malformed table document: {0}")]
    Json(#[from] serde_json::Error),

    /// An axis is too short or not strictly increasing.
    #[error("Invalid axis: {what}")]
    Axis { what: &'static str },

    /// A grid's row/column counts do not match its axes.
    #[error("Grid shape mismatch: {what} (rows={rows}, cols={cols})")]
    Shape {
        what: &'static str,
        rows: usize,
        cols: usize,
    },

    /// The saturation record list is unusable.
    #[error("Invalid saturation data: {what}")]
    Saturation { what: &'static str },
}
