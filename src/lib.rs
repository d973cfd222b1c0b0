//! dupefind - find files with identical content
//!
//! A library and CLI that walks one or more directory trees, buckets files
//! by size, and splits each bucket into groups of byte-for-byte identical
//! files, comparing buckets in parallel.
//!
//! # Example
//!
//! ```no_run
//! use std::path::PathBuf;
//!
//! let groups = dupefind::duplicates::find_duplicates(&[PathBuf::from(".")], false).unwrap();
//! for group in groups {
//!     println!("{:?}", group);
//! }
//! ```

pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod scanner;

use std::io::Write;

use anyhow::{Context, Result};

use crate::cli::{Cli, OutputFormat};
use crate::config::Config;
use crate::duplicates::{DuplicateFinder, ScanReport};
use crate::error::ExitCode;
use crate::output::{JsonOutput, TextOutput};

/// Run the application for parsed arguments, writing the report to stdout.
///
/// # Errors
///
/// Fails on invalid configuration, a fatal scan error, or a failed write.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    run_app_with_writer(cli, &mut handle)
}

/// Run the application, writing the report to `writer`.
///
/// # Errors
///
/// Fails on invalid configuration, a fatal scan error, or a failed write.
pub fn run_app_with_writer<W: Write>(cli: Cli, writer: &mut W) -> Result<ExitCode> {
    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_cli(&cli);

    let finder = DuplicateFinder::with_probe(config.finder_config(), config.probe());
    let report = finder
        .find_duplicates(&cli.paths)
        .context("Duplicate scan failed")?;

    let exit_code = exit_code_for(&report);

    match config.output {
        OutputFormat::Text => TextOutput::new(&report).write_to(writer),
        OutputFormat::Json => JsonOutput::new(&report, exit_code).write_to(writer, true),
    }
    .context("Failed to write report")?;

    Ok(exit_code)
}

/// Exit code describing a completed scan.
#[must_use]
pub fn exit_code_for(report: &ScanReport) -> ExitCode {
    if report.is_partial() {
        ExitCode::PartialSuccess
    } else if report.groups.is_empty() {
        ExitCode::NoDuplicates
    } else {
        ExitCode::Success
    }
}
