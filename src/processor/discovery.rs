//! Data file discovery and specification naming.
//!
//! Finds the data files in the input directory and maps each one to the
//! specification that describes it. The mapping is a [`SpecResolver`] so
//! callers can swap the naming convention.

use crate::config::ConverterConfig;
use crate::error::{ConverterError, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Maps a data file name to the name of its specification file
pub trait SpecResolver {
    fn resolve(&self, data_file: &str) -> String;
}

impl<F> SpecResolver for F
where
    F: Fn(&str) -> String,
{
    fn resolve(&self, data_file: &str) -> String {
        self(data_file)
    }
}

/// Default naming convention: `<prefix>_<rest>.txt` → `<prefix>.csv`
///
/// A name without `_` uses its whole base name, so `summary.txt` resolves
/// to `summary.csv`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixResolver {
    data_extension: String,
    spec_extension: String,
}

impl PrefixResolver {
    pub fn new(data_extension: impl Into<String>, spec_extension: impl Into<String>) -> Self {
        Self {
            data_extension: data_extension.into(),
            spec_extension: spec_extension.into(),
        }
    }

    pub fn from_config(config: &ConverterConfig) -> Self {
        Self::new(&config.data_extension, &config.spec_extension)
    }
}

impl Default for PrefixResolver {
    fn default() -> Self {
        Self::from_config(&ConverterConfig::default())
    }
}

impl SpecResolver for PrefixResolver {
    fn resolve(&self, data_file: &str) -> String {
        let base = data_file
            .strip_suffix(self.data_extension.as_str())
            .and_then(|s| s.strip_suffix('.'))
            .unwrap_or(data_file);
        let prefix = base.split('_').next().unwrap_or(base);
        format!("{}.{}", prefix, self.spec_extension)
    }
}

/// List data files in `data_dir` whose name ends with `.<extension>`
///
/// Only regular files are returned, sorted by name.
pub fn discover_data_files(data_dir: &Path, extension: &str) -> Result<Vec<String>> {
    if !data_dir.is_dir() {
        return Err(ConverterError::not_found(data_dir));
    }

    debug!("Searching for data files in: {}", data_dir.display());

    let suffix = format!(".{}", extension);
    let mut files = Vec::new();

    let entries = fs::read_dir(data_dir).map_err(|e| {
        ConverterError::io(
            format!("Failed to read data directory {}", data_dir.display()),
            e,
        )
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| {
            ConverterError::io(
                format!("Failed to read entry in {}", data_dir.display()),
                e,
            )
        })?;
        let path = entry.path();

        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            warn!("Skipping non UTF-8 file name: {}", path.display());
            continue;
        };

        if name.ends_with(&suffix) && path.is_file() {
            files.push(name);
        }
    }

    files.sort();
    debug!("Found {} data files", files.len());

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_prefix_resolver() {
        let resolver = PrefixResolver::default();
        assert_eq!(resolver.resolve("orders_2024.txt"), "orders.csv");
        assert_eq!(resolver.resolve("orders_2024_q1.txt"), "orders.csv");
        assert_eq!(resolver.resolve("summary.txt"), "summary.csv");
        assert_eq!(resolver.resolve("archive.2024.txt"), "archive.2024.csv");
    }

    #[test]
    fn test_prefix_resolver_custom_extensions() {
        let resolver = PrefixResolver::new("dat", "spec");
        assert_eq!(resolver.resolve("feed_01.dat"), "feed.spec");
        assert_eq!(resolver.resolve("feed.dat"), "feed.spec");
    }

    #[test]
    fn test_closure_resolver() {
        let resolver = |_: &str| "fixed.csv".to_string();
        assert_eq!(resolver.resolve("anything_at_all.txt"), "fixed.csv");
    }

    #[test]
    fn test_discover_data_files() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();

        fs::write(dir.join("orders_2024.txt"), "x").unwrap();
        fs::write(dir.join("summary.txt"), "x").unwrap();
        fs::write(dir.join("accounts_b.txt"), "x").unwrap();
        fs::write(dir.join("notes.md"), "x").unwrap();
        fs::write(dir.join("upper.TXT"), "x").unwrap();
        fs::write(dir.join("orders_2024.txt.bak"), "x").unwrap();
        fs::create_dir(dir.join("folder.txt")).unwrap();

        let files = discover_data_files(dir, "txt").unwrap();
        assert_eq!(files, vec!["accounts_b.txt", "orders_2024.txt", "summary.txt"]);
    }

    #[test]
    fn test_discover_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        assert!(discover_data_files(temp_dir.path(), "txt").unwrap().is_empty());
    }

    #[test]
    fn test_discover_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("data");

        match discover_data_files(&missing, "txt") {
            Err(ConverterError::NotFound { path }) => assert_eq!(path, missing),
            other => panic!("Expected NotFound error, got {:?}", other),
        }
    }
}
