//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Size-based candidate bucketing (Phase 1)
//! - Byte-for-byte content clustering within each bucket (Phase 2)
//! - Scan orchestration and result reporting
//!
//! # Architecture
//!
//! - [`compare`]: the [`FileProbe`] seam and the on-disk [`DiskProbe`]
//! - [`groups`]: [`group_by_size`] and [`cluster_by_content`]
//! - [`finder`]: the [`DuplicateFinder`] pipeline

pub mod compare;
pub mod finder;
pub mod groups;

pub use compare::{CompareError, DiskProbe, FileProbe, ProbeError};
pub use finder::{
    find_duplicates, BucketFailure, DuplicateFinder, FinderConfig, FinderError, ScanReport,
    ScanSummary,
};
pub use groups::{cluster_by_content, group_by_size, DuplicateGroup, GroupingStats, SizeGroup};
