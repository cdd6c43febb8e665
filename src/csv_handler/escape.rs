use csv::{QuoteStyle, Terminator, WriterBuilder};

use super::cell::Cell;
use crate::error::StatsCsvError;

/// Renders a cell as a single CSV field, optionally right-justified.
///
/// See [`escape_text`] for the quoting and padding rules.
pub fn escape_csv(value: &Cell, width: Option<usize>) -> Result<String, StatsCsvError> {
    escape_text(&value.to_text()?, width)
}

/// Renders text as a single CSV field.
///
/// The text is written as a one-field record with RFC 4180 quoting: it is
/// wrapped in double quotes, with embedded quotes doubled, when it contains a
/// comma, a quote, or a line break. The record terminator and any surrounding
/// whitespace left outside the quotes are stripped.
///
/// When `width` is given the field is left-padded with spaces to at least
/// that many characters. Padding always lands outside the quotes.
///
/// # Example
///
/// ```
/// use stats_csv::csv_handler::escape_text;
///
/// assert_eq!(escape_text("plain", None).unwrap(), "plain");
/// assert_eq!(escape_text("a,b", Some(8)).unwrap(), r#"   "a,b""#);
/// assert_eq!(escape_text(r#"say "hi""#, None).unwrap(), r#""say ""hi""""#);
/// ```
pub fn escape_text(text: &str, width: Option<usize>) -> Result<String, StatsCsvError> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::CRLF)
        .from_writer(Vec::with_capacity(text.len() + 4));
    writer.write_record([text])?;
    let encoded = writer
        .into_inner()
        .map_err(|err| StatsCsvError::Io(err.into_error()))?;
    let encoded =
        String::from_utf8(encoded).map_err(|err| StatsCsvError::Encoding(err.to_string()))?;
    let field = encoded.trim_matches(is_strippable);

    Ok(match width {
        Some(width) => format!("{field:>width$}"),
        None => field.to_string(),
    })
}

/// Whitespace as stripped around an encoded field: Unicode whitespace plus
/// the information separators `\x1c`..=`\x1f`.
fn is_strippable(ch: char) -> bool {
    ch.is_whitespace() || ('\x1c'..='\x1f').contains(&ch)
}
