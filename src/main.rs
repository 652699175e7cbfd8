use clap::Parser;
use fixedwidth_converter::cli::{self, Args};
use std::process;

fn main() {
    let args = Args::parse();

    match cli::run(args) {
        Ok(_stats) => {
            // Per-file and per-line failures were already reported
            process::exit(0);
        }
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}
