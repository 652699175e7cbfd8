//! Conversion driver.
//!
//! Discovers every data file in the input directory, resolves its
//! specification, and converts the files one after another. Per-file
//! failures are collected in the [`RunReport`]; only errors that make the
//! whole run meaningless are returned as `Err`.

pub mod discovery;
pub mod file;
pub mod writer;

#[cfg(test)]
pub mod tests;

pub use self::discovery::{PrefixResolver, SpecResolver, discover_data_files};
pub use self::file::FileProcessor;
pub use self::writer::NdjsonWriter;

use crate::config::ConverterConfig;
use crate::error::Result;
use crate::models::{FileOutcome, RunReport};

use std::fmt;
use std::time::Instant;
use tracing::{debug, info};

/// A data file paired with the specification that describes it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedFile {
    pub data_file: String,
    pub spec_file: String,
}

/// Main driver for a directory of fixed-width files
pub struct Converter {
    config: ConverterConfig,
    file_processor: FileProcessor,
    resolver: Box<dyn SpecResolver>,
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Converter")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Converter {
    /// Create a driver using the `<prefix>_<rest>.txt` → `<prefix>.csv`
    /// naming convention
    pub fn new(config: ConverterConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            file_processor: FileProcessor::new(config.clone()),
            resolver: Box::new(PrefixResolver::from_config(&config)),
            config,
        })
    }

    /// Replace the data-file to specification mapping
    pub fn with_resolver<R>(mut self, resolver: R) -> Self
    where
        R: SpecResolver + 'static,
    {
        self.resolver = Box::new(resolver);
        self
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Discovered data files and the specification each resolves to,
    /// without converting anything
    pub fn plan(&self) -> Result<Vec<PlannedFile>> {
        let files = discover_data_files(&self.config.data_dir, &self.config.data_extension)?;

        Ok(files
            .into_iter()
            .map(|data_file| {
                let spec_file = self.resolver.resolve(&data_file);
                debug!("{} resolves to specification {}", data_file, spec_file);
                PlannedFile {
                    data_file,
                    spec_file,
                }
            })
            .collect())
    }

    /// Convert every data file
    pub fn run(&self) -> Result<RunReport> {
        self.run_with(|_| {})
    }

    /// Convert every data file, calling `on_file` after each one finishes
    pub fn run_with<F>(&self, mut on_file: F) -> Result<RunReport>
    where
        F: FnMut(&FileOutcome),
    {
        let start_time = Instant::now();

        self.config.ensure_output_directory()?;
        let planned = self.plan()?;

        info!(
            "Found {} data files in {}",
            planned.len(),
            self.config.data_dir.display()
        );

        let mut report = RunReport::default();

        for PlannedFile {
            data_file,
            spec_file,
        } in planned
        {
            let outcome = match self.file_processor.process_file(&data_file, &spec_file) {
                Ok(file_report) => FileOutcome::Converted(file_report),
                Err(error) if error.is_fatal() => return Err(error),
                Err(error) => {
                    info!("Skipping {}: {}", data_file, error);
                    FileOutcome::Skipped {
                        data_file,
                        spec_file,
                        error,
                    }
                }
            };

            on_file(&outcome);
            report.record(outcome);
        }

        report.stats.processing_time_ms = start_time.elapsed().as_millis();

        info!(
            "Processed {} files ({} skipped), {} records written",
            report.stats.files_processed,
            report.stats.files_failed,
            report.stats.records_written
        );

        Ok(report)
    }
}
