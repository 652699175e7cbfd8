//! NDJSON output writing.
//!
//! Each record becomes one JSON object on its own line, keys in column
//! order, separated as `{"a": 1, "b": true}`. Non-ASCII text is written as
//! raw UTF-8 rather than `\uXXXX` escapes, so `"café"` stays `"café"`.

use crate::error::{ConverterError, Result};
use crate::models::ParsedRecord;

use serde::Serialize;
use serde_json::ser::Formatter;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// JSON formatter emitting `", "` and `": "` separators on a single line
#[derive(Debug, Clone, Copy, Default)]
pub struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        writer.write_all(b": ")
    }
}

fn write_json<W: Write>(writer: &mut W, record: &ParsedRecord) -> Result<()> {
    let mut serializer = serde_json::Serializer::with_formatter(writer, SpacedFormatter);
    record.serialize(&mut serializer)?;
    Ok(())
}

/// Buffered writer for one output file
#[derive(Debug)]
pub struct NdjsonWriter {
    output_path: PathBuf,
    inner: BufWriter<File>,
    records_written: usize,
}

impl NdjsonWriter {
    /// Create or truncate the output file
    pub fn create(output_path: &Path) -> Result<Self> {
        let file = File::create(output_path).map_err(|e| {
            ConverterError::io(
                format!("Failed to create output file {}", output_path.display()),
                e,
            )
        })?;

        debug!("Writing NDJSON to {}", output_path.display());

        Ok(Self {
            output_path: output_path.to_path_buf(),
            inner: BufWriter::new(file),
            records_written: 0,
        })
    }

    /// Append one record as a JSON line
    pub fn write_record(&mut self, record: &ParsedRecord) -> Result<()> {
        write_json(&mut self.inner, record)?;
        self.inner.write_all(b"\n").map_err(|e| {
            ConverterError::io(
                format!("Failed to write to {}", self.output_path.display()),
                e,
            )
        })?;
        self.records_written += 1;
        Ok(())
    }

    /// Flush buffered output and return the number of records written
    pub fn finish(mut self) -> Result<usize> {
        self.inner.flush().map_err(|e| {
            ConverterError::io(
                format!("Failed to flush {}", self.output_path.display()),
                e,
            )
        })?;
        Ok(self.records_written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FieldValue;
    use std::fs;
    use tempfile::TempDir;

    fn sample_record() -> ParsedRecord {
        let mut record = ParsedRecord::default();
        record.insert("col_a", FieldValue::Text("hello".to_string()));
        record.insert("col_b", FieldValue::Boolean(true));
        record.insert("col_c", FieldValue::Integer(42));
        record
    }

    fn to_json(record: &ParsedRecord) -> String {
        let mut buffer = Vec::new();
        write_json(&mut buffer, record).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_spaced_separators() {
        assert_eq!(
            to_json(&sample_record()),
            r#"{"col_a": "hello", "col_b": true, "col_c": 42}"#
        );
        assert_eq!(to_json(&ParsedRecord::default()), "{}");
    }

    #[test]
    fn test_text_escaping_and_unicode() {
        let mut record = ParsedRecord::default();
        record.insert("quote", FieldValue::Text("say \"hi\"\\".to_string()));
        record.insert("city", FieldValue::Text("café".to_string()));

        let line = to_json(&record);
        assert_eq!(line, r#"{"quote": "say \"hi\"\\", "city": "café"}"#);

        let back: ParsedRecord = serde_json::from_str(&line).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_writer_emits_one_line_per_record() {
        let temp_dir = TempDir::new().unwrap();
        let output_path = temp_dir.path().join("out.ndjson");

        let mut writer = NdjsonWriter::create(&output_path).unwrap();
        writer.write_record(&sample_record()).unwrap();
        writer.write_record(&sample_record()).unwrap();
        assert_eq!(writer.finish().unwrap(), 2);

        let content = fs::read_to_string(&output_path).unwrap();
        assert_eq!(
            content,
            "{\"col_a\": \"hello\", \"col_b\": true, \"col_c\": 42}\n\
             {\"col_a\": \"hello\", \"col_b\": true, \"col_c\": 42}\n"
        );
    }

    #[test]
    fn test_create_truncates_existing_output() {
        let temp_dir = TempDir::new().unwrap();
        let output_path = temp_dir.path().join("out.ndjson");
        fs::write(&output_path, "stale content\n").unwrap();

        let writer = NdjsonWriter::create(&output_path).unwrap();
        assert_eq!(writer.finish().unwrap(), 0);
        assert_eq!(fs::read_to_string(&output_path).unwrap(), "");
    }
}
