//! Minimal RFC 4180 row encoding for the captions table.
//!
//! Captions are comma-separated phrases, so almost every caption field
//! ends up quoted.

use std::borrow::Cow;

/// Header row of `captions.csv`, without the line terminator.
pub const HEADER: [&str; 2] = ["caption", "image_file"];

/// Quote `field` if it contains a delimiter, quote, CR or LF.
pub fn escape_field(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\r', '\n']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

/// Encode one record terminated by `\n`.
pub fn format_row(fields: &[&str]) -> String {
    let mut row = fields
        .iter()
        .map(|f| escape_field(f))
        .collect::<Vec<_>>()
        .join(",");
    row.push('\n');
    row
}
