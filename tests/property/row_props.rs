//! Property-based tests for the row composer.

use std::collections::BTreeMap;

use proptest::prelude::*;
use serde_json::{json, Map, Value};

use stats_csv::csv_handler::{csv_header, format_row, Cell, RowFields};

fn parse_row(line: &str) -> Vec<String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(line.as_bytes());
    let record = reader
        .records()
        .next()
        .expect("Should have a record")
        .expect("Should parse");
    record.iter().map(str::to_string).collect()
}

fn text_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z0-9_]{1,12}".prop_map(|s| s),
        "[a-zA-Z0-9 ]{0,6},[a-zA-Z0-9 ]{0,6}".prop_map(|s| s),
        "[a-zA-Z0-9 ]{0,6}\"[a-zA-Z0-9 ]{0,6}".prop_map(|s| s),
        "[a-zA-Z0-9 ]{0,6}\n[a-zA-Z0-9 ]{0,6}".prop_map(|s| s),
    ]
}

fn counts_strategy() -> impl Strategy<Value = BTreeMap<String, u32>> {
    prop::collection::btree_map("[a-z]{1,6}", 0u32..1000, 0..5)
}

fn metadata_strategy() -> impl Strategy<Value = Value> {
    prop::collection::vec(("[a-z]{1,4}", any::<i32>()), 0..6).prop_map(|entries| {
        Value::Object(
            entries
                .into_iter()
                .map(|(k, v)| (k, json!(v)))
                .collect::<Map<String, Value>>(),
        )
    })
}

fn fields(
    shots: u64,
    seconds: f64,
    decoder: String,
    strong_id: String,
    metadata: Value,
    counts: &BTreeMap<String, u32>,
) -> RowFields {
    RowFields {
        shots: Cell::from(shots),
        errors: Cell::from(shots / 2),
        discards: Cell::Int(0),
        seconds: Cell::Float(seconds),
        decoder: Cell::Text(decoder),
        strong_id: Cell::Text(strong_id),
        json_metadata: Cell::Json(metadata),
        custom_counts: counts.iter().map(|(k, v)| (k.clone(), *v)).collect(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Every data row has as many fields as the header.
    #[test]
    fn rows_have_header_field_count(
        shots in 0u64..1_000_000_000,
        seconds in 0.0f64..100_000.0,
        decoder in text_strategy(),
        strong_id in text_strategy(),
        metadata in metadata_strategy(),
        counts in counts_strategy(),
    ) {
        let line = format_row(&fields(shots, seconds, decoder, strong_id, metadata, &counts), false)
            .expect("row should format");
        prop_assert_eq!(parse_row(&line).len(), parse_row(csv_header()).len());
        prop_assert_eq!(parse_row(&line).len(), 8);
        prop_assert!(!line.ends_with('\n'));
    }

    // Text fields survive a parse of the row unchanged.
    #[test]
    fn text_fields_roundtrip(decoder in text_strategy(), strong_id in text_strategy()) {
        let line = format_row(
            &fields(1, 1.0, decoder.clone(), strong_id.clone(), json!({}), &BTreeMap::new()),
            false,
        ).unwrap();
        let parsed = parse_row(&line);
        prop_assert_eq!(&parsed[4], &decoder);
        prop_assert_eq!(&parsed[5], &strong_id);
        prop_assert_eq!(&parsed[7], "");
    }

    // Metadata decodes back to the same JSON value, and formatting twice
    // gives the same bytes.
    #[test]
    fn metadata_is_canonical_and_deterministic(metadata in metadata_strategy()) {
        let row = fields(5, 0.5, "d".to_string(), "id".to_string(), metadata.clone(), &BTreeMap::new());
        let first = format_row(&row, false).unwrap();
        prop_assert_eq!(&format_row(&row, false).unwrap(), &first);

        let parsed = parse_row(&first);
        let decoded: Value = serde_json::from_str(&parsed[6]).unwrap();
        prop_assert_eq!(decoded, metadata);
    }

    // Custom counts need two CSV parses before the JSON appears.
    #[test]
    fn custom_counts_are_double_encoded(counts in counts_strategy()) {
        prop_assume!(!counts.is_empty());
        let line = format_row(
            &fields(1, 1.0, "d".to_string(), "id".to_string(), json!({}), &counts),
            false,
        ).unwrap();
        let outer = parse_row(&line);
        let inner = parse_row(&outer[7]);
        prop_assert_eq!(inner.len(), 1);
        let decoded: BTreeMap<String, u32> = serde_json::from_str(&inner[0]).unwrap();
        prop_assert_eq!(decoded, counts);
    }

    // Seconds use 3, 2 or 1 decimals depending on magnitude.
    #[test]
    fn seconds_precision_follows_magnitude(seconds in 0.0f64..1000.0) {
        let line = format_row(
            &fields(1, seconds, "d".to_string(), "id".to_string(), json!({}), &BTreeMap::new()),
            false,
        ).unwrap();
        let rendered = parse_row(&line)[3].trim().to_string();
        let decimals = rendered.split('.').nth(1).map_or(0, str::len);
        let expected = if seconds < 1.0 { 3 } else if seconds < 10.0 { 2 } else { 1 };
        prop_assert_eq!(decimals, expected);
    }
}
