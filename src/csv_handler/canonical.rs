//! Canonical JSON encoding.
//!
//! Objects are written with keys in sorted order, no insignificant
//! whitespace, and every non-ASCII character escaped as `\uXXXX`. The same
//! logical value always produces the same bytes, regardless of the key order
//! it was built with.

use std::io;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::ser::Formatter;
use serde_json::Value;

use crate::error::StatsCsvError;

/// Serializes `value` to its canonical JSON text.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use stats_csv::csv_handler::to_canonical_json;
///
/// let text = to_canonical_json(&json!({"b": 1, "a": [2, "é"]})).unwrap();
/// assert_eq!(text, r#"{"a":[2,"\u00e9"],"b":1}"#);
/// ```
pub fn to_canonical_json(value: &Value) -> Result<String, StatsCsvError> {
    let mut out = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, AsciiFormatter);
    Canonical(value).serialize(&mut serializer)?;
    String::from_utf8(out).map_err(|err| StatsCsvError::Encoding(err.to_string()))
}

/// Sorted-key view over a JSON value.
struct Canonical<'a>(&'a Value);

impl Serialize for Canonical<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            Value::Object(map) => {
                let mut entries: Vec<(&String, &Value)> = map.iter().collect();
                entries.sort_by(|a, b| a.0.cmp(b.0));
                let mut out = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    out.serialize_entry(key, &Canonical(value))?;
                }
                out.end()
            }
            Value::Array(items) => {
                let mut out = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    out.serialize_element(&Canonical(item))?;
                }
                out.end()
            }
            scalar => scalar.serialize(serializer),
        }
    }
}

/// Compact formatter that keeps output pure ASCII.
struct AsciiFormatter;

impl Formatter for AsciiFormatter {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if fragment.bytes().all(|b| (b' '..=b'~').contains(&b)) {
            return writer.write_all(fragment.as_bytes());
        }
        let mut units = [0u16; 2];
        for ch in fragment.chars() {
            if (' '..='~').contains(&ch) {
                writer.write_all(&[ch as u8])?;
            } else {
                for unit in ch.encode_utf16(&mut units) {
                    write!(writer, "\\u{:04x}", unit)?;
                }
            }
        }
        Ok(())
    }
}
