//! Error module
//!
//! Defines the error type shared by the field escaper, the row composer and
//! the stats writer.

use thiserror::Error;

/// The main error type for formatting statistics rows.
///
/// Formatting is pure and deterministic, so every variant signals a data or
/// programming error rather than a transient fault. Nothing in this crate
/// retries.
///
/// # Example
///
/// ```rust
/// use stats_csv::csv_handler::{escape_csv, Cell};
/// use stats_csv::error::StatsCsvError;
///
/// let err = escape_csv(&Cell::Absent, None).unwrap_err();
/// assert!(matches!(err, StatsCsvError::Encoding(_)));
/// ```
#[derive(Error, Debug)]
pub enum StatsCsvError {
    /// A value could not be converted to text before escaping.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// A custom count could not be represented as an integer.
    #[error("Coercion error: custom count {key:?} has non-integer value {value}")]
    Coercion { key: String, value: String },

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV encoding error from the csv crate.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// General I/O error from the underlying sink.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Two stats records describe different tasks and cannot be merged.
    #[error("Incompatible stats: {0}")]
    IncompatibleStats(String),

    /// Summing two stats records overflowed a counter.
    #[error("Overflow: {0} does not fit in 64 bits")]
    Overflow(String),
}
