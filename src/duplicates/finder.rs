//! Duplicate finder orchestrating traversal, bucketing and clustering.
//!
//! # Overview
//!
//! This module runs the full pipeline:
//! 1. **Walk** - collect every candidate file under the roots (single thread)
//! 2. **Size grouping** - bucket candidates by exact length (see [`group_by_size`])
//! 3. **Clustering** - split each bucket by content (see [`cluster_by_content`]),
//!    one task per bucket on a dedicated rayon pool
//! 4. **Merge** - join the per-bucket results into one [`ScanReport`]
//!
//! A failed length query aborts the scan. A failed content comparison only
//! fails its own bucket; the other buckets still report their groups and the
//! failure is listed in [`ScanReport::failures`].
//!
//! # Example
//!
//! ```no_run
//! use dupefind::duplicates::{DuplicateFinder, FinderConfig};
//! use std::path::PathBuf;
//!
//! let config = FinderConfig::default().with_follow_symlinks(true);
//! let finder = DuplicateFinder::new(config);
//!
//! let report = finder.find_duplicates(&[PathBuf::from("/media/backup")]).unwrap();
//! for group in &report.groups {
//!     println!("{} copies of {} bytes", group.len(), group.size);
//! }
//! if report.is_partial() {
//!     eprintln!("{} size buckets could not be compared", report.failures.len());
//! }
//! ```

use std::path::PathBuf;
use std::time::{Duration, Instant};

use rayon::prelude::*;

use super::compare::{CompareError, DiskProbe, FileProbe, ProbeError};
use super::groups::{cluster_by_content, group_by_size, DuplicateGroup, SizeGroup};
use crate::scanner::{TraversalPolicy, Traverser};

/// Configuration for the duplicate finder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FinderConfig {
    /// Follow symbolic links during traversal.
    pub follow_symlinks: bool,
    /// Worker threads for content comparison. `0` uses available parallelism.
    pub threads: usize,
    /// Fail the whole scan if any bucket fails.
    pub strict: bool,
}

impl FinderConfig {
    /// Set whether symbolic links are followed.
    #[must_use]
    pub fn with_follow_symlinks(mut self, enabled: bool) -> Self {
        self.follow_symlinks = enabled;
        self
    }

    /// Set the number of comparison threads (`0` = available parallelism).
    #[must_use]
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Set fail-fast on any bucket failure.
    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

/// A size bucket whose clustering failed.
#[derive(Debug)]
pub struct BucketFailure {
    /// Byte length shared by the bucket's files
    pub size: u64,
    /// The comparison that failed
    pub error: CompareError,
}

/// Summary statistics for a completed scan.
#[derive(Debug, Clone, Default)]
pub struct ScanSummary {
    /// Number of roots scanned
    pub roots: usize,
    /// Number of candidate files found
    pub total_files: usize,
    /// Total size of all candidates in bytes
    pub total_size: u64,
    /// Number of size buckets with 2+ files
    pub size_groups: usize,
    /// Number of confirmed duplicate groups
    pub duplicate_groups: usize,
    /// Number of redundant copies (excluding one original per group)
    pub duplicate_files: usize,
    /// Space taken by redundant copies
    pub reclaimable_space: u64,
    /// Number of size buckets that could not be compared
    pub failed_buckets: usize,
    /// Wall-clock duration of the scan
    pub scan_duration: Duration,
}

/// Result of a scan: duplicate groups plus any per-bucket failures.
#[derive(Debug, Default)]
pub struct ScanReport {
    /// Confirmed duplicate groups, largest files first
    pub groups: Vec<DuplicateGroup>,
    /// Buckets whose comparison failed, largest files first
    pub failures: Vec<BucketFailure>,
    /// Scan statistics
    pub summary: ScanSummary,
}

impl ScanReport {
    /// Whether some buckets failed, so `groups` may be incomplete.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Just the member paths of each group.
    #[must_use]
    pub fn into_path_groups(self) -> Vec<Vec<PathBuf>> {
        self.groups.into_iter().map(|g| g.paths).collect()
    }
}

/// Errors that can occur during duplicate finding.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// A candidate's length could not be determined.
    #[error(transparent)]
    NotAccessible(#[from] ProbeError),

    /// Content comparison failed in a size bucket.
    #[error("Comparison failed for {size}-byte files: {source}")]
    Compare {
        /// Byte length shared by the failed bucket's files
        size: u64,
        /// The comparison error
        #[source]
        source: CompareError,
    },
}

impl From<BucketFailure> for FinderError {
    fn from(failure: BucketFailure) -> Self {
        Self::Compare {
            size: failure.size,
            source: failure.error,
        }
    }
}

/// Duplicate finder running the walk, size and content phases.
///
/// # Example
///
/// ```no_run
/// use dupefind::duplicates::DuplicateFinder;
/// use std::path::PathBuf;
///
/// let finder = DuplicateFinder::with_defaults();
/// match finder.find_duplicates(&[PathBuf::from(".")]) {
///     Ok(report) => println!("Found {} duplicate groups", report.groups.len()),
///     Err(e) => eprintln!("Scan failed: {}", e),
/// }
/// ```
#[derive(Debug)]
pub struct DuplicateFinder<P = DiskProbe> {
    config: FinderConfig,
    probe: P,
}

impl DuplicateFinder<DiskProbe> {
    /// Create a finder that reads from the local disk.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        Self::with_probe(config, DiskProbe::default())
    }

    /// Create a finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }
}

impl<P: FileProbe> DuplicateFinder<P> {
    /// Create a finder using a custom length/content probe.
    #[must_use]
    pub fn with_probe(config: FinderConfig, probe: P) -> Self {
        Self { config, probe }
    }

    /// The finder's configuration.
    #[must_use]
    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Find all groups of identical files under `roots`.
    ///
    /// Missing roots and unreadable entries are skipped (and logged) during
    /// the walk; the remaining roots are still scanned.
    ///
    /// # Errors
    ///
    /// - [`FinderError::NotAccessible`] if a candidate's size cannot be read
    /// - [`FinderError::Compare`] if a bucket fails and `strict` is set
    pub fn find_duplicates(&self, roots: &[PathBuf]) -> Result<ScanReport, FinderError> {
        let start_time = Instant::now();
        let mut summary = ScanSummary {
            roots: roots.len(),
            ..Default::default()
        };

        if roots.is_empty() {
            log::warn!("No paths provided for scanning");
            summary.scan_duration = start_time.elapsed();
            return Ok(ScanReport {
                summary,
                ..Default::default()
            });
        }

        log::info!("Starting duplicate scan of {} root(s)", roots.len());

        let traverser = Traverser::new(
            roots.to_vec(),
            TraversalPolicy::files_only(self.config.follow_symlinks),
        );
        let (buckets, stats) = group_by_size(&traverser, &self.probe)?;

        summary.total_files = stats.total_files;
        summary.total_size = stats.total_size;
        summary.size_groups = buckets.len();

        log::info!(
            "Found {} files; {} share a size with another file across {} size groups",
            stats.total_files,
            stats.potential_duplicates,
            buckets.len()
        );

        let mut groups = Vec::new();
        let mut failures = Vec::new();

        for (size, outcome) in self.cluster_buckets(buckets) {
            match outcome {
                Ok(found) => groups.extend(found),
                Err(error) => {
                    log::warn!("Skipping {}-byte files: {}", size, error);
                    failures.push(BucketFailure { size, error });
                }
            }
        }

        groups.sort_by(|a, b| {
            b.size
                .cmp(&a.size)
                .then_with(|| a.representative().cmp(b.representative()))
        });
        failures.sort_by(|a, b| b.size.cmp(&a.size));

        if self.config.strict && !failures.is_empty() {
            return Err(failures.swap_remove(0).into());
        }

        summary.duplicate_groups = groups.len();
        summary.duplicate_files = groups.iter().map(DuplicateGroup::duplicate_count).sum();
        summary.reclaimable_space = groups.iter().map(DuplicateGroup::wasted_space).sum();
        summary.failed_buckets = failures.len();
        summary.scan_duration = start_time.elapsed();

        log::info!(
            "Scan complete: {} groups, {} duplicates, {} bytes reclaimable, {} failed buckets",
            summary.duplicate_groups,
            summary.duplicate_files,
            summary.reclaimable_space,
            summary.failed_buckets
        );

        Ok(ScanReport {
            groups,
            failures,
            summary,
        })
    }

    /// Cluster every bucket as an independent task and wait for all of them.
    ///
    /// Each task takes ownership of one bucket; results come back paired with
    /// the bucket's size.
    fn cluster_buckets(
        &self,
        buckets: Vec<SizeGroup>,
    ) -> Vec<(u64, Result<Vec<DuplicateGroup>, CompareError>)> {
        if buckets.is_empty() {
            return Vec::new();
        }

        let probe = &self.probe;
        let run = move || {
            buckets
                .into_par_iter()
                .map(|bucket| {
                    let size = bucket.size;
                    log::debug!("Comparing {} files of {} bytes", bucket.len(), size);
                    (size, cluster_by_content(bucket, probe))
                })
                .collect::<Vec<_>>()
        };

        match rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.threads)
            .thread_name(|i| format!("dupefind-compare-{i}"))
            .build()
        {
            Ok(pool) => pool.install(run),
            Err(e) => {
                log::warn!(
                    "Failed to create comparison thread pool ({}), using global pool with {} threads",
                    e,
                    rayon::current_num_threads()
                );
                run()
            }
        }
    }
}

/// Find groups of identical files under `roots`, files only.
///
/// Convenience wrapper over [`DuplicateFinder`] that returns bare path
/// groups, each with 2+ members.
///
/// # Errors
///
/// Fails on the first inaccessible candidate or failed bucket.
pub fn find_duplicates(
    roots: &[PathBuf],
    follow_symlinks: bool,
) -> Result<Vec<Vec<PathBuf>>, FinderError> {
    let config = FinderConfig::default()
        .with_follow_symlinks(follow_symlinks)
        .with_strict(true);
    DuplicateFinder::new(config)
        .find_duplicates(roots)
        .map(ScanReport::into_path_groups)
}
