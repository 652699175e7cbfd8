//! Basic processing integration tests

use super::*;
use crate::models::{FieldValue, FileOutcome, ParsedRecord};
use crate::processor::Converter;

#[test]
fn test_basic_processing_pipeline() {
    let temp_dir = TempDir::new().unwrap();
    let config = create_layout(&temp_dir);
    write_spec(&config, "sample.csv", SAMPLE_SPEC);
    write_data(&config, "sample_2024.txt", "hello1 42\nhello0abc\nworld0 -3\n");

    let converter = Converter::new(config.clone()).unwrap();
    let report = converter.run().unwrap();

    assert_eq!(report.stats.files_processed, 1);
    assert_eq!(report.stats.files_failed, 0);
    assert_eq!(report.stats.lines_read, 3);
    assert_eq!(report.stats.records_written, 2);
    assert_eq!(report.stats.lines_failed, 1);

    let output_path = config.output_dir.join("sample_2024.ndjson");
    let lines = read_output_lines(&output_path);
    assert_eq!(
        lines,
        vec![
            r#"{"col_a": "hello", "col_b": true, "col_c": 42}"#,
            r#"{"col_a": "world", "col_b": false, "col_c": -3}"#,
        ]
    );
}

#[test]
fn test_output_round_trips_to_typed_values() {
    let temp_dir = TempDir::new().unwrap();
    let config = create_layout(&temp_dir);
    write_spec(&config, "sample.csv", SAMPLE_SPEC);
    write_data(&config, "sample.txt", "123451007\n");

    Converter::new(config.clone()).unwrap().run().unwrap();

    let lines = read_output_lines(&config.output_dir.join("sample.ndjson"));
    let record: ParsedRecord = serde_json::from_str(&lines[0]).unwrap();
    assert_eq!(record.get("col_a"), Some(&FieldValue::Text("12345".to_string())));
    assert_eq!(record.get("col_b"), Some(&FieldValue::Boolean(true)));
    assert_eq!(record.get("col_c"), Some(&FieldValue::Integer(7)));
}

#[test]
fn test_failed_line_reported_with_number_and_column() {
    let temp_dir = TempDir::new().unwrap();
    let config = create_layout(&temp_dir);
    write_spec(&config, "sample.csv", SAMPLE_SPEC);
    write_data(&config, "sample_x.txt", "hello1 42\nhello0abc\nhello1  1\n");

    let report = Converter::new(config).unwrap().run().unwrap();

    let file_report = match &report.outcomes[0] {
        FileOutcome::Converted(file_report) => file_report,
        other => panic!("Expected converted file, got {:?}", other),
    };
    assert_eq!(file_report.data_file, "sample_x.txt");
    assert_eq!(file_report.spec_file, "sample.csv");
    assert_eq!(file_report.failures.len(), 1);

    let failure = &file_report.failures[0];
    assert_eq!(failure.line_number, 2);
    assert!(failure.error.to_string().contains("col_c"));
}

#[test]
fn test_output_directory_created_when_missing() {
    let temp_dir = TempDir::new().unwrap();
    let config = create_layout(&temp_dir);
    assert!(!config.output_dir.exists());

    let report = Converter::new(config.clone()).unwrap().run().unwrap();

    assert!(config.output_dir.is_dir());
    assert!(report.outcomes.is_empty());
}

#[test]
fn test_rerun_overwrites_previous_output() {
    let temp_dir = TempDir::new().unwrap();
    let config = create_layout(&temp_dir);
    write_spec(&config, "sample.csv", SAMPLE_SPEC);
    write_data(&config, "sample.txt", "hello1 42\nworld0  1\n");

    let converter = Converter::new(config.clone()).unwrap();
    converter.run().unwrap();

    write_data(&config, "sample.txt", "again1  9\n");
    converter.run().unwrap();

    let lines = read_output_lines(&config.output_dir.join("sample.ndjson"));
    assert_eq!(lines, vec![r#"{"col_a": "again", "col_b": true, "col_c": 9}"#]);
}
