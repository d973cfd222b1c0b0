//! Output formatters for duplicate scan results.
//!
//! - [`TextOutput`]: human-readable listing with sizes via `bytesize`
//! - [`JsonOutput`]: machine-readable output for scripting
//!
//! # JSON Schema
//!
//! ```json
//! {
//!   "duplicates": [
//!     { "size": 1024, "files": ["/data/a.txt", "/data/b.txt"] }
//!   ],
//!   "failures": [
//!     { "size": 4096, "path": "/data/locked.bin", "error": "I/O error comparing ..." }
//!   ],
//!   "summary": {
//!     "roots": 1,
//!     "total_files": 100,
//!     "total_size": 1048576,
//!     "size_groups": 7,
//!     "duplicate_groups": 5,
//!     "duplicate_files": 10,
//!     "reclaimable_space": 51200,
//!     "failed_buckets": 1,
//!     "scan_duration_ms": 1234,
//!     "exit_code": 3,
//!     "exit_code_name": "DF003"
//!   }
//! }
//! ```
//!
//! # Example
//!
//! ```no_run
//! use dupefind::duplicates::DuplicateFinder;
//! use dupefind::error::ExitCode;
//! use dupefind::output::JsonOutput;
//! use std::path::PathBuf;
//!
//! let report = DuplicateFinder::with_defaults()
//!     .find_duplicates(&[PathBuf::from(".")])
//!     .unwrap();
//!
//! let output = JsonOutput::new(&report, ExitCode::Success);
//! println!("{}", output.to_json_pretty().unwrap());
//! ```

use std::io::Write;

use bytesize::ByteSize;
use serde::Serialize;

use crate::duplicates::{BucketFailure, DuplicateGroup, ScanReport, ScanSummary};
use crate::error::ExitCode;

/// Errors that can occur while writing a report.
#[derive(thiserror::Error, Debug)]
pub enum OutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error writing report: {0}")]
    Io(#[from] std::io::Error),
}

/// A single duplicate group in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDuplicateGroup {
    /// File size in bytes
    pub size: u64,
    /// Member paths, representative first
    pub files: Vec<String>,
}

impl From<&DuplicateGroup> for JsonDuplicateGroup {
    fn from(group: &DuplicateGroup) -> Self {
        Self {
            size: group.size,
            files: group
                .paths
                .iter()
                .map(|p| p.to_string_lossy().into_owned())
                .collect(),
        }
    }
}

/// A failed size bucket in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonFailure {
    /// Byte length shared by the bucket's files
    pub size: u64,
    /// File that could not be read
    pub path: String,
    /// Error message
    pub error: String,
}

impl From<&BucketFailure> for JsonFailure {
    fn from(failure: &BucketFailure) -> Self {
        Self {
            size: failure.size,
            path: failure.error.path().to_string_lossy().into_owned(),
            error: failure.error.to_string(),
        }
    }
}

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Number of roots scanned
    pub roots: usize,
    /// Total number of candidate files
    pub total_files: usize,
    /// Total size of all candidates in bytes
    pub total_size: u64,
    /// Number of size buckets with 2+ files
    pub size_groups: usize,
    /// Number of confirmed duplicate groups
    pub duplicate_groups: usize,
    /// Total number of duplicate files (excluding originals)
    pub duplicate_files: usize,
    /// Space that can be reclaimed by removing duplicates (bytes)
    pub reclaimable_space: u64,
    /// Number of size buckets that could not be compared
    pub failed_buckets: usize,
    /// Duration of the scan in milliseconds
    pub scan_duration_ms: u64,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "DF000")
    pub exit_code_name: String,
}

impl JsonSummary {
    /// Create a JSON summary from a ScanSummary and an exit code.
    #[must_use]
    pub fn from_scan_summary(summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            roots: summary.roots,
            total_files: summary.total_files,
            total_size: summary.total_size,
            size_groups: summary.size_groups,
            duplicate_groups: summary.duplicate_groups,
            duplicate_files: summary.duplicate_files,
            reclaimable_space: summary.reclaimable_space,
            failed_buckets: summary.failed_buckets,
            scan_duration_ms: summary.scan_duration.as_millis() as u64,
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
        }
    }
}

/// Complete JSON output structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// Duplicate groups, largest files first
    pub duplicates: Vec<JsonDuplicateGroup>,
    /// Size buckets that could not be compared
    pub failures: Vec<JsonFailure>,
    /// Scan summary statistics
    pub summary: JsonSummary,
}

impl JsonOutput {
    /// Build the JSON view of a report.
    #[must_use]
    pub fn new(report: &ScanReport, exit_code: ExitCode) -> Self {
        Self {
            duplicates: report.groups.iter().map(JsonDuplicateGroup::from).collect(),
            failures: report.failures.iter().map(JsonFailure::from).collect(),
            summary: JsonSummary::from_scan_summary(&report.summary, exit_code),
        }
    }

    /// Serialize to compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write JSON to a writer, followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), OutputError> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            self.to_json()?
        };
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Human-readable report.
///
/// Each group is printed as a header line followed by its member paths,
/// with a blank line between groups and a one-line summary at the end.
#[derive(Debug)]
pub struct TextOutput<'a> {
    report: &'a ScanReport,
}

impl<'a> TextOutput<'a> {
    /// Wrap a report for text rendering.
    #[must_use]
    pub fn new(report: &'a ScanReport) -> Self {
        Self { report }
    }

    /// Write the report to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), OutputError> {
        let report = self.report;

        for (index, group) in report.groups.iter().enumerate() {
            writeln!(
                writer,
                "Group {}: {} files of {} ({} bytes each)",
                index + 1,
                group.len(),
                ByteSize(group.size),
                group.size
            )?;
            for path in &group.paths {
                writeln!(writer, "  {}", path.display())?;
            }
            writeln!(writer)?;
        }

        for failure in &report.failures {
            writeln!(
                writer,
                "Could not compare {}-byte files: {}",
                failure.size, failure.error
            )?;
        }

        let summary = &report.summary;
        writeln!(
            writer,
            "{} duplicate groups, {} redundant files, {} reclaimable ({} files scanned in {:.2?})",
            summary.duplicate_groups,
            summary.duplicate_files,
            ByteSize(summary.reclaimable_space),
            summary.total_files,
            summary.scan_duration
        )?;
        Ok(())
    }
}
