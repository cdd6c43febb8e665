//! Tagged input values for a statistics row.
//!
//! Every column of a row accepts a [`Cell`]. The row composer resolves the
//! per-column formatting rules against the variant before anything reaches
//! the field escaper.

use serde_json::{Map, Value};

use crate::error::StatsCsvError;

/// One input value for a CSV column.
///
/// Mappings (error categories, custom counts, metadata objects) are carried
/// as [`Cell::Json`] holding a JSON object.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// No value supplied.
    Absent,
    /// An integer count.
    Int(i64),
    /// A floating-point value, e.g. elapsed seconds.
    Float(f64),
    /// Pre-stringified text, written as-is.
    Text(String),
    /// An arbitrary JSON value.
    Json(Value),
}

impl Cell {
    /// Renders the cell as the literal text that goes into a CSV field.
    ///
    /// Structured JSON values (arrays, objects, null) and [`Cell::Absent`]
    /// have no literal text form and must be serialized by the caller first.
    pub fn to_text(&self) -> Result<String, StatsCsvError> {
        match self {
            Cell::Absent => Err(StatsCsvError::Encoding(
                "absent value has no text form".to_string(),
            )),
            Cell::Int(n) => Ok(n.to_string()),
            Cell::Float(f) => Ok(float_text(*f)),
            Cell::Text(text) => Ok(text.clone()),
            Cell::Json(Value::String(text)) => Ok(text.clone()),
            Cell::Json(Value::Number(n)) => Ok(n.to_string()),
            Cell::Json(Value::Bool(b)) => Ok(b.to_string()),
            Cell::Json(other) => Err(StatsCsvError::Encoding(format!(
                "structured value {} must be serialized before escaping",
                other
            ))),
        }
    }

    /// Returns true when the cell carries nothing: absent, null, an empty
    /// object or empty text.
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Absent => true,
            Cell::Text(text) => text.is_empty(),
            Cell::Json(Value::Null) => true,
            Cell::Json(Value::Object(map)) => map.is_empty(),
            _ => false,
        }
    }

    /// Returns the JSON object held by this cell, if any.
    pub fn as_object(&self) -> Option<&Map<String, Value>> {
        match self {
            Cell::Json(Value::Object(map)) => Some(map),
            _ => None,
        }
    }
}

// Integral floats keep a trailing ".0" so `3.0` never reads as the count `3`.
fn float_text(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e16 {
        format!("{f:.1}")
    } else {
        f.to_string()
    }
}

impl From<i64> for Cell {
    fn from(n: i64) -> Self {
        Cell::Int(n)
    }
}

impl From<u32> for Cell {
    fn from(n: u32) -> Self {
        Cell::Int(i64::from(n))
    }
}

impl From<u64> for Cell {
    fn from(n: u64) -> Self {
        match i64::try_from(n) {
            Ok(n) => Cell::Int(n),
            Err(_) => Cell::Text(n.to_string()),
        }
    }
}

impl From<f64> for Cell {
    fn from(f: f64) -> Self {
        Cell::Float(f)
    }
}

impl From<&str> for Cell {
    fn from(text: &str) -> Self {
        Cell::Text(text.to_string())
    }
}

impl From<String> for Cell {
    fn from(text: String) -> Self {
        Cell::Text(text)
    }
}

impl From<Value> for Cell {
    fn from(value: Value) -> Self {
        Cell::Json(value)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(value: Option<T>) -> Self {
        value.map_or(Cell::Absent, Into::into)
    }
}

/// Collects `(label, count)` pairs into a JSON object cell.
impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Cell {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Cell::Json(Value::Object(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        ))
    }
}
