//! Core data structures for fixed-width conversion.
//!
//! Defines the column layout loaded from a specification, the typed values
//! produced for each line, and the per-file and per-run reports handed back
//! to the caller.

use crate::error::ConverterError;
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Datatypes a column may declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Datatype {
    Text,
    Boolean,
    Integer,
}

impl Datatype {
    /// Canonical uppercase name as written in specification files
    pub fn as_str(&self) -> &'static str {
        match self {
            Datatype::Text => "TEXT",
            Datatype::Boolean => "BOOLEAN",
            Datatype::Integer => "INTEGER",
        }
    }
}

impl fmt::Display for Datatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Datatype {
    type Err = String;

    /// Case-insensitive; surrounding whitespace is ignored
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase();
        match normalized.as_str() {
            "TEXT" => Ok(Datatype::Text),
            "BOOLEAN" => Ok(Datatype::Boolean),
            "INTEGER" => Ok(Datatype::Integer),
            _ => Err(format!("invalid datatype '{}'", normalized)),
        }
    }
}

/// One column of a fixed-width layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    pub name: String,
    /// Width in characters, always greater than zero
    pub width: usize,
    pub datatype: Datatype,
}

impl ColumnDefinition {
    pub fn new(name: impl Into<String>, width: usize, datatype: Datatype) -> Self {
        Self {
            name: name.into(),
            width,
            datatype,
        }
    }
}

/// Ordered column layout of one data file
///
/// Columns are consumed left to right, each taking exactly `width`
/// characters, with no gaps between them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnTable {
    columns: Vec<ColumnDefinition>,
}

impl ColumnTable {
    pub fn new(columns: Vec<ColumnDefinition>) -> Self {
        Self { columns }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ColumnDefinition> {
        self.columns.iter()
    }

    pub fn get(&self, index: usize) -> Option<&ColumnDefinition> {
        self.columns.get(index)
    }

    /// Sum of all column widths, i.e. the expected line length in characters
    pub fn total_width(&self) -> usize {
        self.columns
            .iter()
            .fold(0, |total, c| total.saturating_add(c.width))
    }

    pub fn names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}

impl<'a> IntoIterator for &'a ColumnTable {
    type Item = &'a ColumnDefinition;
    type IntoIter = std::slice::Iter<'a, ColumnDefinition>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}

/// A typed value extracted from one column
///
/// INTEGER values are held as `i128` so wide numeric columns (20-digit
/// account numbers and the like) still serialize as JSON numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Boolean(bool),
    Integer(i128),
    Text(String),
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FieldValueVisitor;

        impl Visitor<'_> for FieldValueVisitor {
            type Value = FieldValue;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a string, boolean or integer")
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
                Ok(FieldValue::Boolean(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(FieldValue::Integer(v.into()))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(FieldValue::Integer(v.into()))
            }

            fn visit_i128<E: de::Error>(self, v: i128) -> Result<Self::Value, E> {
                Ok(FieldValue::Integer(v))
            }

            fn visit_u128<E: de::Error>(self, v: u128) -> Result<Self::Value, E> {
                i128::try_from(v)
                    .map(FieldValue::Integer)
                    .map_err(|_| E::invalid_value(de::Unexpected::Other("u128 above i128::MAX"), &self))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(FieldValue::Text(v.to_string()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
                Ok(FieldValue::Text(v))
            }
        }

        deserializer.deserialize_any(FieldValueVisitor)
    }
}

impl FieldValue {
    pub fn datatype(&self) -> Datatype {
        match self {
            FieldValue::Boolean(_) => Datatype::Boolean,
            FieldValue::Integer(_) => Datatype::Integer,
            FieldValue::Text(_) => Datatype::Text,
        }
    }
}

/// One parsed line: column name to typed value, in column order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedRecord {
    fields: Vec<(String, FieldValue)>,
}

impl ParsedRecord {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: Vec::with_capacity(capacity),
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, value: FieldValue) {
        self.fields.push((name.into(), value));
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl Serialize for ParsedRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ParsedRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RecordVisitor;

        impl<'de> Visitor<'de> for RecordVisitor {
            type Value = ParsedRecord;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON object of column values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut record = ParsedRecord::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, value)) = access.next_entry::<String, FieldValue>()? {
                    record.insert(name, value);
                }
                Ok(record)
            }
        }

        deserializer.deserialize_map(RecordVisitor)
    }
}

/// A data line that could not be converted
#[derive(Debug)]
pub struct LineFailure {
    /// 1-based line number within the data file
    pub line_number: usize,
    pub error: ConverterError,
}

/// Outcome of converting one data file
#[derive(Debug)]
pub struct FileReport {
    pub data_file: String,
    pub spec_file: String,
    pub output_path: PathBuf,
    pub lines_read: usize,
    pub records_written: usize,
    pub failures: Vec<LineFailure>,
    /// Read or write error that stopped the file early; counts and failures
    /// above cover the lines handled before it
    pub aborted: Option<ConverterError>,
}

impl FileReport {
    pub fn new(data_file: impl Into<String>, spec_file: impl Into<String>, output_path: PathBuf) -> Self {
        Self {
            data_file: data_file.into(),
            spec_file: spec_file.into(),
            output_path,
            lines_read: 0,
            records_written: 0,
            failures: Vec::new(),
            aborted: None,
        }
    }

    pub fn lines_failed(&self) -> usize {
        self.failures.len()
    }

    /// True when every line of the data file was read
    pub fn is_complete(&self) -> bool {
        self.aborted.is_none()
    }
}

/// What happened to a single discovered data file
#[derive(Debug)]
pub enum FileOutcome {
    Converted(FileReport),
    Skipped {
        data_file: String,
        spec_file: String,
        error: ConverterError,
    },
}

impl FileOutcome {
    pub fn data_file(&self) -> &str {
        match self {
            FileOutcome::Converted(report) => &report.data_file,
            FileOutcome::Skipped { data_file, .. } => data_file,
        }
    }
}

/// Processing statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProcessingStats {
    pub files_processed: usize,
    pub files_failed: usize,
    pub lines_read: usize,
    pub records_written: usize,
    pub lines_failed: usize,
    pub processing_time_ms: u128,
}

impl ProcessingStats {
    /// Percentage of read lines that produced a record
    pub fn success_rate(&self) -> f64 {
        if self.lines_read == 0 {
            0.0
        } else {
            (self.records_written as f64 / self.lines_read as f64) * 100.0
        }
    }
}

/// Outcome of a whole conversion run
#[derive(Debug, Default)]
pub struct RunReport {
    pub outcomes: Vec<FileOutcome>,
    pub stats: ProcessingStats,
}

impl RunReport {
    /// Add a file outcome and fold it into the aggregate statistics
    ///
    /// An aborted file counts as failed, but the lines it got through still
    /// count towards the line and record totals.
    pub fn record(&mut self, outcome: FileOutcome) {
        match &outcome {
            FileOutcome::Converted(report) => {
                if report.is_complete() {
                    self.stats.files_processed += 1;
                } else {
                    self.stats.files_failed += 1;
                }
                self.stats.lines_read += report.lines_read;
                self.stats.records_written += report.records_written;
                self.stats.lines_failed += report.lines_failed();
            }
            FileOutcome::Skipped { .. } => {
                self.stats.files_failed += 1;
            }
        }
        self.outcomes.push(outcome);
    }

    /// Reports for every file that produced output, including aborted ones
    pub fn converted(&self) -> impl Iterator<Item = &FileReport> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            FileOutcome::Converted(report) => Some(report),
            FileOutcome::Skipped { .. } => None,
        })
    }

    pub fn skipped(&self) -> impl Iterator<Item = (&str, &ConverterError)> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            FileOutcome::Skipped {
                data_file, error, ..
            } => Some((data_file.as_str(), error)),
            FileOutcome::Converted(_) => None,
        })
    }
}
