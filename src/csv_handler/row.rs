//! Row composer for statistics CSV lines.
//!
//! A row has eight fields in a fixed order:
//! `shots,errors,discards,seconds,decoder,strong_id,json_metadata,custom_counts`.
//! The count columns are right-justified to [`COUNT_WIDTH`] characters and
//! the seconds column to [`SECONDS_WIDTH`], so files stay readable as plain
//! text. The header line goes through exactly the same composer.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use serde_json::{Number, Value};

use super::canonical::to_canonical_json;
use super::cell::Cell;
use super::escape::{escape_csv, escape_text};
use crate::error::StatsCsvError;

/// Column names, in output order.
pub const COLUMNS: [&str; 8] = [
    "shots",
    "errors",
    "discards",
    "seconds",
    "decoder",
    "strong_id",
    "json_metadata",
    "custom_counts",
];

/// Minimum width of the shots, errors and discards columns.
pub const COUNT_WIDTH: usize = 10;

/// Minimum width of the seconds column.
pub const SECONDS_WIDTH: usize = 8;

/// The eight input values of one row.
#[derive(Debug, Clone, PartialEq)]
pub struct RowFields {
    /// Number of shots taken. An integer or pre-stringified text.
    pub shots: Cell,
    /// Number of errors, or a JSON object mapping error category to count.
    pub errors: Cell,
    /// Number of discarded shots. An integer or pre-stringified text.
    pub discards: Cell,
    /// Elapsed time. Floats get magnitude-dependent precision.
    pub seconds: Cell,
    /// Decoder name.
    pub decoder: Cell,
    /// Content-derived task identifier.
    pub strong_id: Cell,
    /// Arbitrary JSON metadata, written in canonical form.
    pub json_metadata: Cell,
    /// Optional JSON object of label to count. Empty or absent means none.
    pub custom_counts: Cell,
}

impl RowFields {
    /// Fields holding the literal column names, used to build the header.
    pub fn header() -> Self {
        let [shots, errors, discards, seconds, decoder, strong_id, json_metadata, custom_counts] =
            COLUMNS.map(Cell::from);
        Self {
            shots,
            errors,
            discards,
            seconds,
            decoder,
            strong_id,
            json_metadata,
            custom_counts,
        }
    }
}

/// Returns the header line, built once per process by running
/// [`format_row`] in header mode over [`COLUMNS`].
///
/// ```
/// use stats_csv::csv_handler::csv_header;
///
/// assert_eq!(
///     csv_header(),
///     "     shots,    errors,  discards, seconds,decoder,strong_id,json_metadata,custom_counts"
/// );
/// ```
pub fn csv_header() -> &'static str {
    static CSV_HEADER: OnceLock<String> = OnceLock::new();
    CSV_HEADER.get_or_init(|| {
        format_row(&RowFields::header(), true).expect("column names encode as plain fields")
    })
}

/// Formats one row as a single CSV line without a trailing newline.
///
/// Pre-formatting, applied before escaping:
///
/// - `seconds` floats, either [`Cell::Float`] or a JSON float, use 3 decimals
///   below 1, 2 decimals below 10 and 1 decimal otherwise. Integers and text
///   pass through.
/// - outside header mode, `json_metadata` is written as canonical JSON.
/// - outside header mode, non-empty `custom_counts` are coerced to integers,
///   written as canonical JSON and escaped as a CSV field. That escaped text
///   is escaped again with the other fields, so the JSON is double-encoded.
///   Empty or absent custom counts give an empty field.
/// - in header mode `json_metadata` and `custom_counts` are literal text.
/// - an `errors` JSON object is written as canonical JSON.
///
/// Every field then goes through [`escape_csv`] and the results are joined
/// with commas.
pub fn format_row(fields: &RowFields, is_header: bool) -> Result<String, StatsCsvError> {
    let seconds = match float_seconds(&fields.seconds) {
        Some(seconds) => Cell::Text(format_seconds(seconds)),
        None => fields.seconds.clone(),
    };

    let (json_metadata, custom_counts) = if is_header {
        (
            fields.json_metadata.clone(),
            Some(fields.custom_counts.clone()),
        )
    } else {
        let json_metadata = Cell::Text(metadata_json(&fields.json_metadata)?);
        let custom_counts = if fields.custom_counts.is_empty() {
            None
        } else {
            let counts = coerce_counts(&fields.custom_counts)?;
            Some(Cell::Text(escape_text(&counts_json(&counts)?, None)?))
        };
        (json_metadata, custom_counts)
    };

    let errors = match fields.errors.as_object() {
        Some(_) => Cell::Text(metadata_json(&fields.errors)?),
        None => fields.errors.clone(),
    };

    let escaped = [
        escape_csv(&fields.shots, Some(COUNT_WIDTH))?,
        escape_csv(&errors, Some(COUNT_WIDTH))?,
        escape_csv(&fields.discards, Some(COUNT_WIDTH))?,
        escape_csv(&seconds, Some(SECONDS_WIDTH))?,
        escape_csv(&fields.decoder, None)?,
        escape_csv(&fields.strong_id, None)?,
        escape_csv(&json_metadata, None)?,
        match custom_counts {
            Some(cell) => escape_csv(&cell, None)?,
            None => String::new(),
        },
    ];
    Ok(escaped.join(","))
}

/// Renders elapsed seconds with precision that shrinks as magnitude grows.
///
/// ```
/// use stats_csv::csv_handler::format_seconds;
///
/// assert_eq!(format_seconds(0.5), "0.500");
/// assert_eq!(format_seconds(5.25), "5.25");
/// assert_eq!(format_seconds(12.34), "12.3");
/// ```
pub fn format_seconds(seconds: f64) -> String {
    if seconds.is_nan() {
        "nan".to_string()
    } else if seconds < 1.0 {
        format!("{seconds:.3}")
    } else if seconds < 10.0 {
        format!("{seconds:.2}")
    } else {
        format!("{seconds:.1}")
    }
}

fn float_seconds(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Float(seconds) => Some(*seconds),
        Cell::Json(Value::Number(n)) if n.is_f64() => n.as_f64(),
        _ => None,
    }
}

/// Canonical JSON text of an arbitrary cell.
fn metadata_json(cell: &Cell) -> Result<String, StatsCsvError> {
    let value = match cell {
        Cell::Absent => Value::Null,
        Cell::Int(n) => Value::from(*n),
        Cell::Float(f) => serde_json::Number::from_f64(*f)
            .map(Value::Number)
            .ok_or_else(|| {
                StatsCsvError::Encoding(format!("{f} cannot be represented as JSON"))
            })?,
        Cell::Text(text) => Value::String(text.clone()),
        Cell::Json(value) => return to_canonical_json(value),
    };
    to_canonical_json(&value)
}

/// Builds a fresh integer-valued copy of the custom counts.
fn coerce_counts(cell: &Cell) -> Result<BTreeMap<String, Number>, StatsCsvError> {
    let map = cell.as_object().ok_or_else(|| {
        StatsCsvError::Encoding("custom_counts must map labels to counts".to_string())
    })?;
    map.iter()
        .map(|(key, value)| coerce_count(key, value).map(|count| (key.clone(), count)))
        .collect()
}

/// Coerces one count to a JSON integer, signed or unsigned 64-bit.
fn coerce_count(key: &str, value: &Value) -> Result<Number, StatsCsvError> {
    let coerced = match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => Some(n.clone()),
        Value::Number(n) => n.as_f64().and_then(truncate_float),
        Value::Bool(b) => Some(Number::from(u8::from(*b))),
        Value::String(text) => parse_integer(text.trim()),
        _ => None,
    };
    coerced.ok_or_else(|| StatsCsvError::Coercion {
        key: key.to_string(),
        value: value.to_string(),
    })
}

// Truncates toward zero; `u64::MAX as f64` is 2^64, one past the range.
fn truncate_float(f: f64) -> Option<Number> {
    let f = f.trunc();
    if !f.is_finite() {
        None
    } else if f >= 0.0 && f < u64::MAX as f64 {
        Some(Number::from(f as u64))
    } else if f < 0.0 && f >= i64::MIN as f64 {
        Some(Number::from(f as i64))
    } else {
        None
    }
}

fn parse_integer(text: &str) -> Option<Number> {
    text.parse::<i64>()
        .map(Number::from)
        .or_else(|_| text.parse::<u64>().map(Number::from))
        .ok()
}

fn counts_json(counts: &BTreeMap<String, Number>) -> Result<String, StatsCsvError> {
    let value = Value::Object(
        counts
            .iter()
            .map(|(key, count)| (key.clone(), Value::Number(count.clone())))
            .collect(),
    );
    to_canonical_json(&value)
}
