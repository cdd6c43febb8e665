use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::{debug, trace};

use super::record::{TaskStats, WriteStats};
use super::row::{csv_header, format_row, RowFields};
use crate::error::StatsCsvError;

/// Line-oriented writer for statistics CSV files.
///
/// The `StatsWriter` appends one formatted row per call to any
/// [`Write`] sink, each followed by a single `\n`.
///
/// # Features
///
/// - Writes the header row on creation (unless appending to a non-empty file)
/// - Accepts typed [`TaskStats`] or raw [`RowFields`]
/// - Tracks [`WriteStats`] for rows written
/// - Provides explicit flush control for data persistence
///
/// # CSV Format
///
/// The column order is
/// `shots,errors,discards,seconds,decoder,strong_id,json_metadata,custom_counts`.
pub struct StatsWriter<W: Write> {
    /// The sink receiving formatted lines.
    sink: W,
    /// Statistics for written rows.
    stats: WriteStats,
}

impl StatsWriter<BufWriter<File>> {
    /// Creates (or truncates) a CSV file and writes the header row.
    pub fn create(path: &Path) -> Result<Self, StatsCsvError> {
        debug!(path = %path.display(), "creating stats csv");
        Self::new(BufWriter::new(File::create(path)?))
    }

    /// Opens a CSV file for appending, creating it if needed.
    ///
    /// The header row is written only when the file is empty, so repeated
    /// runs can keep adding rows to the same file.
    pub fn append(path: &Path) -> Result<Self, StatsCsvError> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let is_empty = file.metadata()?.len() == 0;
        debug!(path = %path.display(), is_empty, "appending to stats csv");

        let sink = BufWriter::new(file);
        if is_empty {
            Self::new(sink)
        } else {
            Ok(Self::without_header(sink))
        }
    }
}

impl<W: Write> StatsWriter<W> {
    /// Wraps a sink, writing the header row to it first.
    pub fn new(sink: W) -> Result<Self, StatsCsvError> {
        let mut writer = Self::without_header(sink);
        writeln!(writer.sink, "{}", csv_header())?;
        Ok(writer)
    }

    /// Wraps a sink that already holds a header row.
    pub fn without_header(sink: W) -> Self {
        Self {
            sink,
            stats: WriteStats::default(),
        }
    }

    /// Writes one task's stats as a row.
    pub fn write_stats(&mut self, stats: &TaskStats) -> Result<(), StatsCsvError> {
        self.write_row(&stats.row_fields())?;
        self.stats.total_shots += stats.shots;
        Ok(())
    }

    /// Writes one row from raw field values.
    pub fn write_row(&mut self, fields: &RowFields) -> Result<(), StatsCsvError> {
        let line = format_row(fields, false)?;
        writeln!(self.sink, "{}", line)?;
        self.stats.rows_written += 1;
        trace!(rows_written = self.stats.rows_written, "wrote stats row");
        Ok(())
    }

    /// Flushes pending writes to the sink.
    pub fn flush(&mut self) -> Result<(), StatsCsvError> {
        self.sink.flush()?;
        Ok(())
    }

    /// Returns a reference to the current write statistics.
    pub fn stats(&self) -> &WriteStats {
        &self.stats
    }

    /// Flushes and returns the underlying sink.
    pub fn into_inner(mut self) -> Result<W, StatsCsvError> {
        self.flush()?;
        Ok(self.sink)
    }
}
