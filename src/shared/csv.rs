//! Minimal RFC 4180 reader and writer.
//!
//! Fields are separated by commas, may be wrapped in double quotes, and a
//! quote inside a quoted field is written twice (`""`). Quoted fields may
//! span lines. Both `\n` and `\r\n` terminate records.

use std::borrow::Cow;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CsvError {
    #[error("unterminated quoted field starting on line {line}")]
    UnterminatedQuote { line: usize },
}

/// Split `input` into records of raw field values.
///
/// Blank lines, including lines of only spaces or tabs, are skipped. A quote appearing in the middle of an unquoted
/// field is kept as a literal character.
pub fn read_records(input: &str) -> Result<Vec<Vec<String>>, CsvError> {
    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut field_quoted = false;
    let mut in_quotes = false;
    let mut line = 1;
    let mut quote_line = 1;

    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            ',' => {
                record.push(std::mem::take(&mut field));
                field_quoted = false;
            }
            '\r' | '\n' => {
                if c == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                line += 1;
                finish_record(&mut records, &mut record, &mut field, field_quoted);
                field_quoted = false;
            }
            '"' if field.is_empty() && !field_quoted => {
                in_quotes = true;
                field_quoted = true;
                quote_line = line;
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(CsvError::UnterminatedQuote { line: quote_line });
    }

    finish_record(&mut records, &mut record, &mut field, field_quoted);
    Ok(records)
}

fn finish_record(
    records: &mut Vec<Vec<String>>,
    record: &mut Vec<String>,
    field: &mut String,
    field_quoted: bool,
) {
    let blank_line = record.is_empty() && field.trim().is_empty() && !field_quoted;
    if blank_line {
        return;
    }
    record.push(std::mem::take(field));
    records.push(std::mem::take(record));
}

/// Quote a field when it contains a separator, a quote or a line break.
pub fn escape_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

/// Append one record, terminated by `\n`, to `out`.
pub fn push_record<S: AsRef<str>>(out: &mut String, fields: &[S]) {
    for (i, value) in fields.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&escape_field(value.as_ref()));
    }
    out.push('\n');
}
