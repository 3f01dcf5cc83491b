//! fixcol binary entrypoint.
//!
//! The conversion engine lives in `fixcol-core`; this file only resolves
//! the request (YAML config or flat flags), runs the converter, and maps
//! the outcome onto the process exit contract: 0 on success, 1 on abort
//! with the partial output already removed by the engine.

mod args;
mod config;
mod logging;

use anyhow::{Context, Result};
use args::Cli;
use clap::Parser;
use config::ConvertRequest;
use fixcol_core::{ConversionSummary, Converter};
use std::path::Path;

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let request = ConvertRequest::resolve(cli)?;
    let schema = request.schema()?;

    let converter = Converter::new(schema, &request.input, &request.output, request.options());
    let summary = converter
        .convert()
        .with_context(|| format!("conversion of {} failed", request.input.display()))?;

    if let Some(parse_error) = &summary.stopped_early {
        eprintln!("stopped early after a parse failure: {}", parse_error);
    }

    println!("{}", completion_message(&summary, &request.input, &request.output));
    Ok(())
}

/// User-facing success line. An early stop before the first chunk leaves
/// no output file, but that is not the same as an empty input.
fn completion_message(summary: &ConversionSummary, input: &Path, output: &Path) -> String {
    if summary.output_created {
        format!(
            "wrote {} rows in {} chunks to {}",
            summary.rows_written,
            summary.chunks_written,
            output.display()
        )
    } else if summary.stopped_early.is_some() {
        "stopped before any chunk was written; no output file was produced".to_string()
    } else {
        format!(
            "{} contained no data rows; no output file was produced",
            input.display()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(output_created: bool, stopped_early: Option<&str>, rows: u64) -> ConversionSummary {
        ConversionSummary {
            rows_written: rows,
            chunks_written: rows,
            output_created,
            stopped_early: stopped_early.map(String::from),
        }
    }

    #[test]
    fn test_success_message_names_output() {
        let msg = completion_message(
            &summary(true, None, 3),
            Path::new("in.txt"),
            Path::new("out.parquet"),
        );
        assert!(msg.contains("3 rows"));
        assert!(msg.contains("out.parquet"));
    }

    #[test]
    fn test_early_stop_is_not_reported_as_empty_input() {
        let msg = completion_message(
            &summary(false, Some("Line 1: bad row"), 0),
            Path::new("in.txt"),
            Path::new("out.parquet"),
        );
        assert!(msg.contains("stopped before any chunk"));
        assert!(!msg.contains("no data rows"));
    }

    #[test]
    fn test_empty_input_message() {
        let msg = completion_message(
            &summary(false, None, 0),
            Path::new("in.txt"),
            Path::new("out.parquet"),
        );
        assert!(msg.contains("in.txt"));
        assert!(msg.contains("no data rows"));
    }
}
