//! Fixed-width to NDJSON converter library
//!
//! Converts fixed-width text data files into newline-delimited JSON, one
//! object per line, using a CSV specification per data-file prefix that
//! names each column and gives its width and datatype.
//!
//! This library provides tools for:
//! - Loading column specifications (`column name,width,datatype`)
//! - Slicing fixed-width lines into typed TEXT, BOOLEAN and INTEGER values
//! - Writing NDJSON output with per-line error collection
//! - Discovering data files and resolving their specifications by name
//!
//! ```no_run
//! use fixedwidth_converter::{Converter, ConverterConfig};
//!
//! # fn main() -> fixedwidth_converter::Result<()> {
//! let converter = Converter::new(ConverterConfig::default())?;
//! let report = converter.run()?;
//! println!("{} records written", report.stats.records_written);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod line_parser;
pub mod models;
pub mod processor;
pub mod spec;

// Re-export commonly used types
pub use config::ConverterConfig;
pub use error::{ConverterError, Result};
pub use line_parser::parse_line;
pub use models::{
    ColumnDefinition, ColumnTable, Datatype, FieldValue, FileOutcome, FileReport, LineFailure,
    ParsedRecord, ProcessingStats, RunReport,
};
pub use processor::{Converter, FileProcessor, PlannedFile, PrefixResolver, SpecResolver};
pub use spec::{parse_specification, read_specification};
