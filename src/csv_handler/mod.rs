//! CSV handler module
//!
//! Formats statistics records as CSV lines and writes them to sinks.

pub mod canonical;
pub mod cell;
pub mod escape;
pub mod record;
pub mod row;
pub mod writer;

pub use canonical::to_canonical_json;
pub use cell::Cell;
pub use escape::{escape_csv, escape_text};
pub use record::{AnonTaskStats, TaskStats, WriteStats};
pub use row::{
    csv_header, format_row, format_seconds, RowFields, COLUMNS, COUNT_WIDTH, SECONDS_WIDTH,
};
pub use writer::StatsWriter;
