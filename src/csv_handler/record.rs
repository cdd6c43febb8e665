//! Statistics record types for CSV serialization.
//!
//! Defines [`TaskStats`] (a sampled task with its identifying fields),
//! [`AnonTaskStats`] (just the numbers) and [`WriteStats`] for tracking
//! what a [`StatsWriter`](super::StatsWriter) has written.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::cell::Cell;
use super::row::{format_row, RowFields};
use crate::error::StatsCsvError;

/// Sampling statistics for one task.
///
/// A task is identified by its `strong_id`; `decoder` and `json_metadata`
/// describe it. The remaining fields accumulate as more shots are taken.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use stats_csv::csv_handler::TaskStats;
///
/// let stats = TaskStats {
///     shots: 22,
///     errors: 3,
///     discards: 4,
///     seconds: 5.0,
///     ..TaskStats::new("test", "pymatching", json!({"a": [1, 2, 3]}))
/// };
/// assert_eq!(
///     stats.to_csv_line().unwrap(),
///     r#"        22,         3,         4,    5.00,pymatching,test,"{""a"":[1,2,3]}","#
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskStats {
    /// Content-derived identifier of the task.
    pub strong_id: String,

    /// Name of the decoder that produced the results.
    pub decoder: String,

    /// Arbitrary metadata describing the task.
    pub json_metadata: Value,

    /// Number of shots sampled.
    #[serde(default)]
    pub shots: u64,

    /// Number of shots the decoder got wrong.
    #[serde(default)]
    pub errors: u64,

    /// Number of shots discarded by postselection.
    #[serde(default)]
    pub discards: u64,

    /// Total time spent sampling and decoding.
    #[serde(default)]
    pub seconds: f64,

    /// Additional named counters. Zero counts are not kept.
    #[serde(default)]
    pub custom_counts: BTreeMap<String, u64>,
}

impl TaskStats {
    /// Creates empty stats for the given task.
    pub fn new(strong_id: impl Into<String>, decoder: impl Into<String>, json_metadata: Value) -> Self {
        Self {
            strong_id: strong_id.into(),
            decoder: decoder.into(),
            json_metadata,
            ..Self::default()
        }
    }

    /// The row composer inputs for these stats.
    pub fn row_fields(&self) -> RowFields {
        let custom_counts = if self.custom_counts.is_empty() {
            Cell::Absent
        } else {
            self.custom_counts
                .iter()
                .map(|(label, count)| (label.clone(), *count))
                .collect()
        };
        RowFields {
            shots: Cell::from(self.shots),
            errors: Cell::from(self.errors),
            discards: Cell::from(self.discards),
            seconds: Cell::Float(self.seconds),
            decoder: Cell::from(self.decoder.as_str()),
            strong_id: Cell::from(self.strong_id.as_str()),
            json_metadata: Cell::Json(self.json_metadata.clone()),
            custom_counts,
        }
    }

    /// Formats these stats as one CSV line, without a trailing newline.
    pub fn to_csv_line(&self) -> Result<String, StatsCsvError> {
        format_row(&self.row_fields(), false)
    }

    /// Combines the results of two runs of the same task.
    ///
    /// Fails with [`StatsCsvError::IncompatibleStats`] when the two records
    /// differ in `strong_id`, `decoder` or `json_metadata`, and with
    /// [`StatsCsvError::Overflow`] when a summed counter exceeds `u64::MAX`.
    pub fn merge(&self, other: &TaskStats) -> Result<TaskStats, StatsCsvError> {
        let mismatch = if self.strong_id != other.strong_id {
            Some("strong_id")
        } else if self.decoder != other.decoder {
            Some("decoder")
        } else if self.json_metadata != other.json_metadata {
            Some("json_metadata")
        } else {
            None
        };
        if let Some(field) = mismatch {
            tracing::debug!(
                left = %self.strong_id,
                right = %other.strong_id,
                field,
                "refusing to merge stats of different tasks"
            );
            return Err(StatsCsvError::IncompatibleStats(format!(
                "{field} differs between {:?} and {:?}",
                self.strong_id, other.strong_id
            )));
        }

        let numbers = self.to_anon_stats().checked_add(&other.to_anon_stats())?;
        Ok(TaskStats {
            strong_id: self.strong_id.clone(),
            decoder: self.decoder.clone(),
            json_metadata: self.json_metadata.clone(),
            shots: numbers.shots,
            errors: numbers.errors,
            discards: numbers.discards,
            seconds: numbers.seconds,
            custom_counts: numbers.custom_counts,
        })
    }

    /// Drops the identifying fields, keeping only the numbers.
    pub fn to_anon_stats(&self) -> AnonTaskStats {
        AnonTaskStats {
            shots: self.shots,
            errors: self.errors,
            discards: self.discards,
            seconds: self.seconds,
            custom_counts: self.custom_counts.clone(),
        }
    }
}

impl fmt::Display for TaskStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let line = self.to_csv_line().map_err(|_| fmt::Error)?;
        f.write_str(&line)
    }
}

/// Statistics not associated with any particular task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnonTaskStats {
    pub shots: u64,
    pub errors: u64,
    pub discards: u64,
    pub seconds: f64,
    pub custom_counts: BTreeMap<String, u64>,
}

impl AnonTaskStats {
    /// Sums two records, failing with [`StatsCsvError::Overflow`] instead of
    /// wrapping when a counter exceeds `u64::MAX`.
    pub fn checked_add(&self, other: &AnonTaskStats) -> Result<AnonTaskStats, StatsCsvError> {
        let add = |field: &str, a: u64, b: u64| {
            a.checked_add(b)
                .ok_or_else(|| StatsCsvError::Overflow(field.to_string()))
        };
        let mut custom_counts = self.custom_counts.clone();
        for (label, count) in &other.custom_counts {
            let total = custom_counts.entry(label.clone()).or_insert(0);
            *total = add(label.as_str(), *total, *count)?;
        }
        custom_counts.retain(|_, count| *count > 0);

        Ok(AnonTaskStats {
            shots: add("shots", self.shots, other.shots)?,
            errors: add("errors", self.errors, other.errors)?,
            discards: add("discards", self.discards, other.discards)?,
            seconds: self.seconds + other.seconds,
            custom_counts,
        })
    }
}

/// Saturates at `u64::MAX`; use [`AnonTaskStats::checked_add`] to detect
/// overflow.
impl AddAssign for AnonTaskStats {
    fn add_assign(&mut self, other: AnonTaskStats) {
        self.shots = self.shots.saturating_add(other.shots);
        self.errors = self.errors.saturating_add(other.errors);
        self.discards = self.discards.saturating_add(other.discards);
        self.seconds += other.seconds;
        for (label, count) in other.custom_counts {
            let total = self.custom_counts.entry(label).or_insert(0);
            *total = total.saturating_add(count);
        }
        self.custom_counts.retain(|_, count| *count > 0);
    }
}

impl Add for AnonTaskStats {
    type Output = AnonTaskStats;

    fn add(mut self, other: AnonTaskStats) -> AnonTaskStats {
        self += other;
        self
    }
}

/// Counters for the rows a [`StatsWriter`](super::StatsWriter) has written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteStats {
    /// Data rows written, not counting the header.
    pub rows_written: u64,
    /// Sum of the shots column over rows written from [`TaskStats`].
    pub total_shots: u64,
}
