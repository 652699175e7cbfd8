//! Specification file loading.
//!
//! A specification is a CSV file whose header is exactly
//! `column name,width,datatype`, followed by one row per column of the
//! fixed-width layout, in layout order.

use crate::error::{ConverterError, Result};
use crate::models::{ColumnDefinition, ColumnTable, Datatype};
use csv::StringRecord;
use std::collections::HashSet;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;
use tracing::debug;

/// Header fields every specification must declare, in this order
pub const REQUIRED_FIELDS: [&str; 3] = ["column name", "width", "datatype"];

/// Load the column table for `spec_file` from `spec_dir`
pub fn read_specification(spec_dir: &Path, spec_file: &str) -> Result<ColumnTable> {
    let spec_path = spec_dir.join(spec_file);

    if !spec_path.is_file() {
        return Err(ConverterError::not_found(spec_path));
    }

    let file = File::open(&spec_path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => ConverterError::not_found(&spec_path),
        _ => ConverterError::io(
            format!("Failed to open specification {}", spec_path.display()),
            e,
        ),
    })?;

    let table = parse_specification(file, spec_file)?;

    debug!(
        "Loaded specification {}: {} columns, {} characters per line",
        spec_file,
        table.len(),
        table.total_width()
    );

    Ok(table)
}

/// Parse specification CSV from any reader
///
/// `spec_name` only labels error messages.
pub fn parse_specification<R: Read>(reader: R, spec_name: &str) -> Result<ColumnTable> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| ConverterError::format(spec_name, format!("unreadable header: {}", e)))?;
    validate_header(headers, spec_name)?;

    let mut columns = Vec::new();
    let mut seen = HashSet::new();

    for (index, result) in csv_reader.records().enumerate() {
        // Header is row 1
        let row = index + 2;
        let record = result.map_err(|e| {
            ConverterError::format(spec_name, format!("unreadable row {}: {}", row, e))
        })?;

        let column = parse_row(&record, spec_name, row)?;
        if !seen.insert(column.name.clone()) {
            return Err(ConverterError::format(
                spec_name,
                format!("duplicate column name '{}' on row {}", column.name, row),
            ));
        }
        columns.push(column);
    }

    Ok(ColumnTable::new(columns))
}

fn validate_header(headers: &StringRecord, spec_name: &str) -> Result<()> {
    if headers.iter().eq(REQUIRED_FIELDS.iter().copied()) {
        return Ok(());
    }

    let found: Vec<&str> = headers.iter().collect();
    Err(ConverterError::format(
        spec_name,
        format!(
            "expected header fields {:?}, found {:?}",
            REQUIRED_FIELDS, found
        ),
    ))
}

fn parse_row(record: &StringRecord, spec_name: &str, row: usize) -> Result<ColumnDefinition> {
    let name = required_field(record, 0, spec_name, row)?;
    if name.trim().is_empty() {
        return Err(ConverterError::format(
            spec_name,
            format!("empty column name on row {}", row),
        ));
    }

    let raw_width = required_field(record, 1, spec_name, row)?;
    let width = match raw_width.trim().parse::<usize>() {
        Ok(width) if width > 0 => width,
        _ => {
            return Err(ConverterError::format(
                spec_name,
                format!(
                    "width '{}' for column '{}' on row {} is not a positive integer",
                    raw_width, name, row
                ),
            ));
        }
    };

    let raw_datatype = required_field(record, 2, spec_name, row)?;
    let datatype = raw_datatype.parse::<Datatype>().map_err(|reason| {
        ConverterError::format(
            spec_name,
            format!("{} for column '{}' on row {}", reason, name, row),
        )
    })?;

    Ok(ColumnDefinition::new(name, width, datatype))
}

fn required_field<'a>(
    record: &'a StringRecord,
    index: usize,
    spec_name: &str,
    row: usize,
) -> Result<&'a str> {
    record.get(index).ok_or_else(|| {
        ConverterError::format(
            spec_name,
            format!("missing expected field '{}' on row {}", REQUIRED_FIELDS[index], row),
        )
    })
}
