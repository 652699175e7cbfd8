//! Error handling for fixed-width conversion.
//!
//! Errors are recovered at two granularities: a [`ConverterError::Parse`]
//! costs one data line, while [`ConverterError::NotFound`] and
//! [`ConverterError::Format`] cost one data file. Everything else is either
//! an aborted file or, for [`ConverterError::is_fatal`] errors, the whole run.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConverterError {
    #[error("File not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Specification file {spec} is incorrectly formatted: {reason}")]
    Format { spec: String, reason: String },

    #[error("Error parsing column '{column}': {reason}")]
    Parse { column: String, reason: String },

    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl ConverterError {
    /// Create a not-found error for a specification or data file
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Create a specification format error
    pub fn format(spec: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Format {
            spec: spec.into(),
            reason: reason.into(),
        }
    }

    /// Create a line parse error for a single column
    pub fn parse(column: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Parse {
            column: column.into(),
            reason: reason.into(),
        }
    }

    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Whether this error must stop the whole run rather than a single file
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }
}

impl From<std::io::Error> for ConverterError {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConverterError>;
