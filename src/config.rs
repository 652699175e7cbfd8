//! Configuration for a conversion run.
//!
//! The directory layout is fixed in normal use (`specs/`, `data/`,
//! `output/` under the working directory) but is carried as an explicit
//! value so the driver can be pointed at any directory tree.

use crate::error::{ConverterError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default directory holding specification files
pub const DEFAULT_SPEC_DIR: &str = "specs";

/// Default directory holding fixed-width data files
pub const DEFAULT_DATA_DIR: &str = "data";

/// Default directory receiving NDJSON output
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Extension of data files picked up by discovery
pub const DATA_EXTENSION: &str = "txt";

/// Extension appended to a data-file prefix to name its specification
pub const SPEC_EXTENSION: &str = "csv";

/// Extension of generated output files
pub const OUTPUT_EXTENSION: &str = "ndjson";

/// Global configuration for fixed-width conversion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConverterConfig {
    /// Directory containing `<prefix>.csv` specification files
    pub spec_dir: PathBuf,

    /// Directory scanned for data files
    pub data_dir: PathBuf,

    /// Directory where `.ndjson` files are written (created if missing)
    pub output_dir: PathBuf,

    /// Extension identifying data files, without the dot
    pub data_extension: String,

    /// Extension of specification files, without the dot
    pub spec_extension: String,

    /// Extension of output files, without the dot
    pub output_extension: String,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            spec_dir: PathBuf::from(DEFAULT_SPEC_DIR),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            data_extension: DATA_EXTENSION.to_string(),
            spec_extension: SPEC_EXTENSION.to_string(),
            output_extension: OUTPUT_EXTENSION.to_string(),
        }
    }
}

impl ConverterConfig {
    /// Configuration with the standard `specs/`, `data/` and `output/`
    /// subdirectories of `root`
    pub fn rooted_at(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            spec_dir: root.join(DEFAULT_SPEC_DIR),
            data_dir: root.join(DEFAULT_DATA_DIR),
            output_dir: root.join(DEFAULT_OUTPUT_DIR),
            ..Default::default()
        }
    }

    pub fn with_spec_dir(mut self, spec_dir: impl Into<PathBuf>) -> Self {
        self.spec_dir = spec_dir.into();
        self
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    /// Check the configuration for values that would make every file fail
    pub fn validate(&self) -> Result<()> {
        for (label, extension) in [
            ("data", &self.data_extension),
            ("specification", &self.spec_extension),
            ("output", &self.output_extension),
        ] {
            if extension.is_empty() {
                return Err(ConverterError::configuration(format!(
                    "{} file extension must not be empty",
                    label
                )));
            }
            if extension.starts_with('.') {
                return Err(ConverterError::configuration(format!(
                    "{} file extension '{}' must be given without a leading dot",
                    label, extension
                )));
            }
        }

        if self.data_extension == self.output_extension && self.data_dir == self.output_dir {
            return Err(ConverterError::configuration(format!(
                "output would overwrite input files in {}",
                self.data_dir.display()
            )));
        }

        Ok(())
    }

    /// Create the output directory if it does not exist yet
    pub fn ensure_output_directory(&self) -> Result<()> {
        if !self.output_dir.exists() {
            debug!("Creating output directory {}", self.output_dir.display());
        }
        std::fs::create_dir_all(&self.output_dir).map_err(|e| {
            ConverterError::io(
                format!(
                    "Failed to create output directory '{}'",
                    self.output_dir.display()
                ),
                e,
            )
        })
    }

    pub fn spec_path(&self, spec_file: &str) -> PathBuf {
        self.spec_dir.join(spec_file)
    }

    pub fn data_path(&self, data_file: &str) -> PathBuf {
        self.data_dir.join(data_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_layout() {
        let config = ConverterConfig::default();
        assert_eq!(config.spec_dir, PathBuf::from("specs"));
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.output_dir, PathBuf::from("output"));
        assert_eq!(config.data_extension, "txt");
        assert_eq!(config.spec_extension, "csv");
        assert_eq!(config.output_extension, "ndjson");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rooted_at_and_builders() {
        let config = ConverterConfig::rooted_at("/srv/feeds").with_output_dir("/tmp/out");
        assert_eq!(config.spec_dir, PathBuf::from("/srv/feeds/specs"));
        assert_eq!(config.data_dir, PathBuf::from("/srv/feeds/data"));
        assert_eq!(config.output_dir, PathBuf::from("/tmp/out"));
        assert_eq!(
            config.spec_path("orders.csv"),
            PathBuf::from("/srv/feeds/specs/orders.csv")
        );
    }

    #[test]
    fn test_validate_rejects_bad_extensions() {
        let mut config = ConverterConfig::default();
        config.output_extension = ".ndjson".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConverterError::Configuration { .. })
        ));

        let mut config = ConverterConfig::default();
        config.spec_extension.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_self_overwrite() {
        let mut config = ConverterConfig::default().with_output_dir("data");
        config.output_extension = "txt".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_ensure_output_directory_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let config = ConverterConfig::rooted_at(temp_dir.path());

        config.ensure_output_directory().unwrap();
        config.ensure_output_directory().unwrap();
        assert!(config.output_dir.is_dir());
    }
}
