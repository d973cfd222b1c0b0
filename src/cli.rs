//! Command-line interface definitions for dupefind.
//!
//! This module defines all CLI arguments and options using the clap derive API.
//! Options left unset fall back to the loaded configuration (see [`crate::config`]).
//!
//! # Example
//!
//! ```bash
//! # Report duplicates under two directories
//! dupefind ~/Pictures /mnt/backup/Pictures
//!
//! # JSON output for scripting
//! dupefind ~/Downloads --output json
//!
//! # Follow symbolic links, compare on 8 threads
//! dupefind --follow-symlinks --threads 8 /data
//!
//! # Verbose mode for debugging
//! dupefind -v ~/Downloads
//! ```

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Find files with identical content.
///
/// dupefind groups files by size, then compares same-size files byte for
/// byte. Files are only reported as duplicates if their content matches
/// exactly.
#[derive(Debug, Parser)]
#[command(name = "dupefind")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directories (or files) to scan
    #[arg(value_name = "PATH", required = true)]
    pub paths: Vec<PathBuf>,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Follow symbolic links to directories
    ///
    /// Links that lead back into a directory already being walked are
    /// skipped, so cycles terminate.
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Number of threads for content comparison (0 = all cores)
    #[arg(long, value_name = "N")]
    pub threads: Option<usize>,

    /// Fail the whole scan if any group of files cannot be compared
    #[arg(long)]
    pub strict: bool,

    /// Output format
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Report errors as JSON on stderr
    #[arg(long)]
    pub json_errors: bool,

    /// Configuration file to use instead of the platform default
    #[arg(long, value_name = "PATH", env = "DUPEFIND_CONFIG")]
    pub config: Option<PathBuf>,

    /// Never compare files through memory maps
    #[arg(long)]
    pub no_mmap: bool,

    /// Smallest file compared through memory maps (e.g., 64MiB)
    ///
    /// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB, TB, TiB
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub mmap_threshold: Option<u64>,
}

/// Output format for scan results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable listing
    #[default]
    Text,
    /// JSON output for scripting
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Parse a human-readable size string into bytes.
///
/// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB, TB, TiB
/// Case-insensitive. Numbers without suffix are treated as bytes.
///
/// # Examples
///
/// ```
/// use dupefind::cli::parse_size;
///
/// assert_eq!(parse_size("1024").unwrap(), 1024);
/// assert_eq!(parse_size("1KB").unwrap(), 1000);
/// assert_eq!(parse_size("64MiB").unwrap(), 67_108_864);
/// ```
/// # Errors
///
/// Returns an error if the string is empty, contains an invalid number,
/// or an unknown size suffix.
pub fn parse_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Size cannot be empty".to_string());
    }

    let (num_str, suffix) = match s.find(|c: char| !c.is_ascii_digit() && c != '.') {
        Some(idx) => (&s[..idx], s[idx..].trim().to_uppercase()),
        None => (s, String::new()),
    };

    let num: f64 = num_str
        .parse()
        .map_err(|_| format!("Invalid number: '{num_str}'"))?;

    let multiplier: u64 = match suffix.as_str() {
        "" | "B" => 1,
        "KB" | "K" => 1_000,
        "KIB" => 1_024,
        "MB" | "M" => 1_000_000,
        "MIB" => 1_048_576,
        "GB" | "G" => 1_000_000_000,
        "GIB" => 1_073_741_824,
        "TB" | "T" => 1_000_000_000_000,
        "TIB" => 1_099_511_627_776,
        _ => return Err(format!("Unknown size suffix: '{suffix}'")),
    };

    Ok((num * multiplier as f64) as u64)
}
