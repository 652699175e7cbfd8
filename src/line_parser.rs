//! Fixed-width line parsing.
//!
//! Slices one line into fields according to a [`ColumnTable`] and coerces
//! each field to its declared [`Datatype`]. Offsets are counted in
//! characters, not bytes, so multi-byte text does not shift later columns.

use crate::error::{ConverterError, Result};
use crate::models::{ColumnDefinition, ColumnTable, Datatype, FieldValue, ParsedRecord};

/// Parse one line into a record with one entry per column
///
/// Fails on the first column that is empty after trimming or whose content
/// does not fit its datatype; no partial record is returned. Characters past
/// the table's total width are ignored.
pub fn parse_line(line: &str, columns: &ColumnTable) -> Result<ParsedRecord> {
    let mut record = ParsedRecord::with_capacity(columns.len());
    let mut rest = line;

    for column in columns {
        let (raw, remainder) = split_chars(rest, column.width);
        rest = remainder;

        let value = coerce_field(raw, column)?;
        record.insert(column.name.clone(), value);
    }

    Ok(record)
}

/// Trim a raw slice and convert it to the column's datatype
pub fn coerce_field(raw: &str, column: &ColumnDefinition) -> Result<FieldValue> {
    let value = raw.trim();

    // Short lines produce empty trailing slices and land here too
    if value.is_empty() {
        return Err(ConverterError::parse(
            &column.name,
            format!(
                "no value in {} characters (blank field or line too short)",
                column.width
            ),
        ));
    }

    match column.datatype {
        Datatype::Text => Ok(FieldValue::Text(value.to_string())),
        Datatype::Boolean => parse_boolean(value, column),
        Datatype::Integer => parse_integer(value, column),
    }
}

fn parse_boolean(value: &str, column: &ColumnDefinition) -> Result<FieldValue> {
    match value {
        "1" => Ok(FieldValue::Boolean(true)),
        "0" => Ok(FieldValue::Boolean(false)),
        _ => Err(ConverterError::parse(
            &column.name,
            format!("invalid BOOLEAN value '{}' (expected '0' or '1')", value),
        )),
    }
}

fn parse_integer(value: &str, column: &ColumnDefinition) -> Result<FieldValue> {
    value.parse::<i128>().map(FieldValue::Integer).map_err(|e| {
        ConverterError::parse(
            &column.name,
            format!("invalid INTEGER value '{}' ({})", value, e),
        )
    })
}

/// Split after `count` characters, or return the whole string if shorter
fn split_chars(s: &str, count: usize) -> (&str, &str) {
    match s.char_indices().nth(count) {
        Some((index, _)) => s.split_at(index),
        None => (s, ""),
    }
}
