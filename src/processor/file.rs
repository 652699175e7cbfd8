//! Single data file conversion.
//!
//! Loads the file's specification once, then streams the data file line by
//! line through the parser into an NDJSON writer. Bad lines are collected in
//! the returned [`FileReport`] instead of stopping the file. A read error
//! stops the file but still returns the report, with the error in
//! [`FileReport::aborted`].

use super::writer::NdjsonWriter;
use crate::config::ConverterConfig;
use crate::error::{ConverterError, Result};
use crate::line_parser::parse_line;
use crate::models::{ColumnTable, FileReport, LineFailure};
use crate::spec::read_specification;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Converts one data file at a time using a fixed directory layout
#[derive(Debug, Clone)]
pub struct FileProcessor {
    config: ConverterConfig,
}

impl FileProcessor {
    pub fn new(config: ConverterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Output location for a data file: its data extension replaced by the
    /// output extension, inside the output directory
    pub fn output_path_for(&self, data_file: &str) -> PathBuf {
        let base = data_file
            .strip_suffix(self.config.data_extension.as_str())
            .and_then(|s| s.strip_suffix('.'))
            .unwrap_or(data_file);
        self.config
            .output_dir
            .join(format!("{}.{}", base, self.config.output_extension))
    }

    /// Convert `data_file` using the layout in `spec_file`
    ///
    /// Nothing is written when the data file or specification is missing or
    /// the specification is malformed; those cases return `Err`. Once the
    /// output file exists it is kept, even if no line converts. An I/O error
    /// after that point ends the file early and is stored in the report.
    pub fn process_file(&self, data_file: &str, spec_file: &str) -> Result<FileReport> {
        let data_path = self.config.data_path(data_file);
        if !data_path.is_file() {
            return Err(ConverterError::not_found(data_path));
        }

        let columns = read_specification(&self.config.spec_dir, spec_file)?;

        let data = File::open(&data_path).map_err(|e| {
            ConverterError::io(format!("Failed to open data file {}", data_path.display()), e)
        })?;

        self.config.ensure_output_directory()?;
        let output_path = self.output_path_for(data_file);
        let mut writer = NdjsonWriter::create(&output_path)?;

        info!(
            "Converting {} with {} ({} columns)",
            data_file,
            spec_file,
            columns.len()
        );

        let mut report = FileReport::new(data_file, spec_file, output_path);
        let converted = convert_lines(BufReader::new(data), &columns, &mut writer, &mut report);

        // Keep whatever was written before a read failure
        report.records_written = writer.finish()?;
        if let Err(error) = converted {
            warn!(
                "Stopped {} after {} lines: {}",
                data_file, report.lines_read, error
            );
            report.aborted = Some(error);
            return Ok(report);
        }

        info!(
            "Finished {}: {} of {} lines written to {}",
            data_file,
            report.records_written,
            report.lines_read,
            report.output_path.display()
        );

        Ok(report)
    }
}

fn convert_lines<R: BufRead>(
    reader: R,
    columns: &ColumnTable,
    writer: &mut NdjsonWriter,
    report: &mut FileReport,
) -> Result<()> {
    for (index, line) in reader.lines().enumerate() {
        let line_number = index + 1;
        let line = line.map_err(|e| {
            ConverterError::io(
                format!("Failed to read line {} of {}", line_number, report.data_file),
                e,
            )
        })?;
        report.lines_read += 1;

        match parse_line(&line, columns) {
            Ok(record) => writer.write_record(&record)?,
            Err(error) => {
                warn!(
                    "Error processing line {} of {}: {}",
                    line_number, report.data_file, error
                );
                report.failures.push(LineFailure { line_number, error });
            }
        }
    }

    debug!(
        "Read {} lines from {}, {} failed",
        report.lines_read,
        report.data_file,
        report.lines_failed()
    );

    Ok(())
}
