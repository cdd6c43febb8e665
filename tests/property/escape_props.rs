//! Property-based tests for single-field escaping.

use proptest::prelude::*;

use stats_csv::csv_handler::escape_text;

/// Text that always needs quoting: it holds a comma, a quote or a newline.
fn special_text_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z0-9 ]{0,10},[a-zA-Z0-9 ]{0,10}".prop_map(|s| s),
        "[a-zA-Z0-9 ]{0,10}\"[a-zA-Z0-9 ]{0,10}\"[a-zA-Z0-9 ]{0,10}".prop_map(|s| s),
        "[a-zA-Z0-9 ]{0,10}\n[a-zA-Z0-9 ]{0,10}".prop_map(|s| s),
        "[a-zA-Z0-9]{0,5},\"[a-zA-Z0-9]{0,5}\"\n[a-zA-Z0-9]{0,5}".prop_map(|s| s),
        Just(r#"{"key": "value, with comma"}"#.to_string()),
    ]
}

fn parse_single_field(field: &str) -> String {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(field.as_bytes());
    let record = reader
        .records()
        .next()
        .expect("Should have a record")
        .expect("Should parse");
    assert_eq!(record.len(), 1);
    record[0].to_string()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // Escaping then parsing text with special characters recovers it exactly.
    #[test]
    fn escaped_special_text_roundtrips(text in special_text_strategy()) {
        let field = escape_text(&text, None).expect("escape should succeed");
        prop_assert!(field.starts_with('"') && field.ends_with('"'));
        prop_assert_eq!(parse_single_field(&field), text);
    }

    // Plain text without separators or surrounding spaces is left alone.
    #[test]
    fn plain_text_is_unchanged(text in "[a-zA-Z0-9_.:/-]{1,30}") {
        prop_assert_eq!(escape_text(&text, None).unwrap(), text);
    }

    // Padding reaches the requested width and only adds leading spaces.
    #[test]
    fn width_pads_on_the_left(text in "[a-zA-Z0-9,\"]{1,20}", width in 0usize..30) {
        let bare = escape_text(&text, None).unwrap();
        let padded = escape_text(&text, Some(width)).unwrap();
        prop_assert!(padded.chars().count() >= width);
        prop_assert!(padded.ends_with(&bare));
        prop_assert!(padded[..padded.len() - bare.len()].chars().all(|c| c == ' '));
    }
}
