//! Integration tests for the processor module
//!
//! Runs the driver end to end over temporary `specs/`, `data/` and
//! `output/` directories.

pub mod basic_processing;

use crate::config::ConverterConfig;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

pub const SAMPLE_SPEC: &str =
    "column name,width,datatype\ncol_a,5,TEXT\ncol_b,1,BOOLEAN\ncol_c,3,INTEGER\n";

/// Create the standard directory layout under a temporary root
pub fn create_layout(temp_dir: &TempDir) -> ConverterConfig {
    let config = ConverterConfig::rooted_at(temp_dir.path());
    fs::create_dir_all(&config.spec_dir).unwrap();
    fs::create_dir_all(&config.data_dir).unwrap();
    config
}

pub fn write_spec(config: &ConverterConfig, name: &str, content: &str) {
    fs::write(config.spec_dir.join(name), content).unwrap();
}

pub fn write_data(config: &ConverterConfig, name: &str, content: &str) {
    fs::write(config.data_dir.join(name), content).unwrap();
}

pub fn read_output_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}
