//! Command-line interface components.
//!
//! Parses arguments, sets up logging, runs the converter over the fixed
//! `specs/`, `data/` and `output/` directories, and renders the returned
//! report as diagnostics on stderr and a summary on stdout.

use crate::config::ConverterConfig;
use crate::error::ConverterError;
use crate::models::{FileOutcome, ProcessingStats, RunReport};
use crate::processor::Converter;

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing::debug;

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "fixedwidth-converter")]
#[command(about = "Convert fixed-width text files in data/ to NDJSON in output/ using the layouts in specs/")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    /// Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only report errors; no progress or summary
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// List each data file with the specification it resolves to, then exit
    #[arg(long)]
    pub dry_run: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

impl Args {
    /// Determine the log level from the verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }

    /// Progress is drawn unless quiet, and never alongside verbose logs
    pub fn show_progress(&self) -> bool {
        !self.quiet && self.verbose == 0
    }
}

/// Set up structured logging on stderr
pub fn setup_logging(args: &Args) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("fixedwidth_converter={}", log_level)));

    if args.quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
            .context("Failed to initialize logging")?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .context("Failed to initialize logging")?;
    }

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Run the converter with the fixed directory layout
pub fn run(args: Args) -> Result<ProcessingStats> {
    if args.no_color {
        colored::control::set_override(false);
    }

    setup_logging(&args)?;
    debug!("Command line arguments: {:?}", args);

    let config = ConverterConfig::default();
    let converter = Converter::new(config).context("Invalid converter configuration")?;

    if args.dry_run {
        print_plan(&converter)?;
        return Ok(ProcessingStats::default());
    }

    let progress = create_progress_bar(args.show_progress());
    let report = converter
        .run_with(|outcome| {
            progress.inc(1);
            progress.set_message(outcome.data_file().to_string());
        })
        .with_context(|| {
            format!(
                "Conversion of {} aborted",
                converter.config().data_dir.display()
            )
        });
    progress.finish_and_clear();
    let report = report?;

    print_diagnostics(&report);
    if !args.quiet {
        print_summary(&report.stats);
    }

    Ok(report.stats)
}

fn create_progress_bar(visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    let progress = ProgressBar::new_spinner();
    progress.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {pos} files converted {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    progress.enable_steady_tick(Duration::from_millis(100));
    progress
}

fn print_plan(converter: &Converter) -> Result<()> {
    let plan = converter.plan().with_context(|| {
        format!(
            "Failed to list data files in {}",
            converter.config().data_dir.display()
        )
    })?;

    if plan.is_empty() {
        println!("{}", "No data files found".bright_yellow());
    }

    for planned in plan {
        let spec_path = converter.config().spec_path(&planned.spec_file);
        let status = if spec_path.is_file() {
            "ok".bright_green()
        } else {
            "missing".bright_red()
        };
        println!(
            "  {} {} {} [{}]",
            planned.data_file.bright_cyan(),
            "->".bright_black(),
            planned.spec_file,
            status
        );
    }

    Ok(())
}

/// One diagnostic line per skipped file and per failed line, on stderr
pub fn print_diagnostics(report: &RunReport) {
    for outcome in &report.outcomes {
        match outcome {
            FileOutcome::Skipped {
                data_file, error, ..
            } => {
                eprintln!(
                    "{} {}",
                    "error:".bright_red().bold(),
                    describe_skip(data_file, error)
                );
            }
            FileOutcome::Converted(file_report) => {
                for failure in &file_report.failures {
                    eprintln!(
                        "{} Error processing line {} of {}: {}",
                        "warning:".bright_yellow().bold(),
                        failure.line_number,
                        file_report.data_file,
                        failure.error
                    );
                }
                if let Some(error) = &file_report.aborted {
                    eprintln!(
                        "{} {}",
                        "error:".bright_red().bold(),
                        describe_skip(&file_report.data_file, error)
                    );
                }
            }
        }
    }
}

fn describe_skip(data_file: &str, error: &ConverterError) -> String {
    match error {
        ConverterError::Format { .. } => {
            format!("Error reading specification for {}: {}", data_file, error)
        }
        ConverterError::NotFound { .. } => format!("Skipping {}: {}", data_file, error),
        _ => format!("Error processing data file {}: {}", data_file, error),
    }
}

fn print_summary(stats: &ProcessingStats) {
    println!("\n{}", "Conversion Summary".bright_green().bold());
    println!(
        "  {} {}ms",
        "Time elapsed:".bright_cyan(),
        stats.processing_time_ms.to_string().bright_white()
    );
    println!(
        "  {} {}",
        "Files converted:".bright_cyan(),
        stats.files_processed.to_string().bright_white()
    );
    if stats.files_failed > 0 {
        println!(
            "  {} {}",
            "Files failed:".bright_red(),
            stats.files_failed.to_string().bright_red().bold()
        );
    }
    println!(
        "  {} {} of {} ({:.1}%)",
        "Records written:".bright_cyan(),
        stats.records_written.to_string().bright_white().bold(),
        stats.lines_read,
        stats.success_rate()
    );
    if stats.lines_failed > 0 {
        println!(
            "  {} {}",
            "Lines failed:".bright_yellow(),
            stats.lines_failed.to_string().bright_yellow()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_log_level() {
        let mut args = Args::default();
        assert_eq!(args.get_log_level(), "warn");

        args.verbose = 1;
        assert_eq!(args.get_log_level(), "info");

        args.verbose = 2;
        assert_eq!(args.get_log_level(), "debug");

        args.verbose = 3;
        assert_eq!(args.get_log_level(), "trace");

        args.quiet = true;
        assert_eq!(args.get_log_level(), "error");
    }

    #[test]
    fn test_show_progress() {
        let mut args = Args::default();
        assert!(args.show_progress());

        args.verbose = 1;
        assert!(!args.show_progress());

        args.verbose = 0;
        args.quiet = true;
        assert!(!args.show_progress());
    }

    #[test]
    fn test_argument_parsing() {
        let args = Args::try_parse_from(["fixedwidth-converter", "-vv", "--dry-run"]).unwrap();
        assert_eq!(args.verbose, 2);
        assert!(args.dry_run);
        assert!(!args.quiet);

        assert!(Args::try_parse_from(["fixedwidth-converter", "-q", "-v"]).is_err());
        assert!(Args::try_parse_from(["fixedwidth-converter", "--input", "x"]).is_err());
    }

    #[test]
    fn test_describe_skip() {
        let message = describe_skip("orders_1.txt", &ConverterError::format("orders.csv", "bad header"));
        assert!(message.starts_with("Error reading specification for orders_1.txt"));
        assert!(message.contains("orders.csv"));

        let message = describe_skip("x.txt", &ConverterError::not_found("specs/x.csv"));
        assert!(message.contains("specs/x.csv"));
    }
}
