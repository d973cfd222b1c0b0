//! Size bucketing and content clustering.
//!
//! # Overview
//!
//! Duplicate detection runs in two steps over the candidate paths:
//!
//! 1. **Size grouping** ([`group_by_size`]): every candidate's length is
//!    queried once and candidates are bucketed by exact length. Files of
//!    different lengths can never be duplicates, so buckets with a single
//!    member are discarded without reading any content.
//! 2. **Content clustering** ([`cluster_by_content`]): within one bucket,
//!    each candidate is compared against the representative (first-seen
//!    member) of each tentative group until one matches. Byte equality is an
//!    equivalence relation, so matching the representative implies matching
//!    every member, and no all-pairs comparison is needed.
//!
//! Buckets never share members, so clustering of different buckets is
//! independent and can run in parallel (see [`crate::duplicates::finder`]).
//!
//! # Example
//!
//! ```no_run
//! use dupefind::duplicates::{cluster_by_content, group_by_size, DiskProbe};
//! use std::path::PathBuf;
//!
//! let probe = DiskProbe::new();
//! let candidates = vec![PathBuf::from("a.jpg"), PathBuf::from("b.jpg")];
//!
//! let (buckets, stats) = group_by_size(candidates, &probe).unwrap();
//! println!("{} of {} files share a size", stats.potential_duplicates, stats.total_files);
//!
//! for bucket in buckets {
//!     for group in cluster_by_content(bucket, &probe).unwrap() {
//!         println!("{:?}", group.paths);
//!     }
//! }
//! ```

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::compare::{CompareError, FileProbe, ProbeError};

/// Candidates sharing one exact byte length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeGroup {
    /// File size in bytes (shared by all paths in this group)
    pub size: u64,
    /// Candidates with this exact size, in discovery order
    pub paths: Vec<PathBuf>,
}

impl SizeGroup {
    /// Create an empty size group.
    #[must_use]
    pub fn new(size: u64) -> Self {
        Self {
            size,
            paths: Vec::new(),
        }
    }

    /// Create a size group with initial paths.
    #[must_use]
    pub fn with_paths(size: u64, paths: Vec<PathBuf>) -> Self {
        Self { size, paths }
    }

    /// Number of candidates in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Check if this group could contain duplicates (2+ candidates).
    #[must_use]
    pub fn has_duplicates(&self) -> bool {
        self.paths.len() > 1
    }

    /// Total size of all candidates in this group.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.size * self.paths.len() as u64
    }

    /// Upper bound on reclaimable space (all copies minus one).
    #[must_use]
    pub fn potential_savings(&self) -> u64 {
        self.size * (self.paths.len() as u64).saturating_sub(1)
    }
}

/// Files confirmed to hold identical bytes.
///
/// Paths are in discovery order; the first is the representative every
/// other member was compared against. A group always has 2+ members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateGroup {
    /// File size in bytes, shared by every member
    pub size: u64,
    /// Member paths, representative first
    pub paths: Vec<PathBuf>,
}

impl DuplicateGroup {
    /// Create a duplicate group.
    #[must_use]
    pub fn new(size: u64, paths: Vec<PathBuf>) -> Self {
        debug_assert!(paths.len() > 1, "duplicate group needs 2+ members");
        Self { size, paths }
    }

    /// The member every other member was compared against.
    #[must_use]
    pub fn representative(&self) -> &Path {
        &self.paths[0]
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Number of redundant copies (total - 1 original).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.paths.len().saturating_sub(1)
    }

    /// Space taken by the redundant copies.
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.size * self.duplicate_count() as u64
    }
}

/// Statistics from the size grouping step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingStats {
    /// Number of distinct candidates processed
    pub total_files: usize,
    /// Total size of all candidates in bytes
    pub total_size: u64,
    /// Number of distinct file sizes seen
    pub unique_sizes: usize,
    /// Number of candidates in groups of 2+
    pub potential_duplicates: usize,
    /// Number of candidates eliminated as the only file of their size
    pub eliminated_unique: usize,
    /// Number of size groups with 2+ candidates
    pub size_groups: usize,
}

impl GroupingStats {
    /// Percentage of candidates eliminated by size alone.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.eliminated_unique as f64 / self.total_files as f64) * 100.0
        }
    }
}

/// Bucket candidates by exact length.
///
/// Pulls `candidates` once, querying each one's length through `probe`.
/// A path that appears more than once (for example through overlapping
/// roots) is counted once. Only buckets with 2+ members are returned,
/// largest size first.
///
/// # Errors
///
/// The first [`ProbeError`] aborts grouping: a candidate of unknown size
/// would make every bucket's result incomplete.
pub fn group_by_size<I, P>(
    candidates: I,
    probe: &P,
) -> Result<(Vec<SizeGroup>, GroupingStats), ProbeError>
where
    I: IntoIterator<Item = PathBuf>,
    P: FileProbe + ?Sized,
{
    let mut stats = GroupingStats::default();
    let mut by_size: HashMap<u64, Vec<PathBuf>> = HashMap::new();
    let mut seen: HashSet<PathBuf> = HashSet::new();

    for path in candidates {
        if seen.contains(&path) {
            log::trace!("Skipping repeated candidate: {}", path.display());
            continue;
        }

        let size = probe.length(&path)?;
        stats.total_files += 1;
        stats.total_size += size;

        seen.insert(path.clone());
        by_size.entry(size).or_default().push(path);
    }

    stats.unique_sizes = by_size.len();

    let mut groups: Vec<SizeGroup> = by_size
        .into_iter()
        .filter_map(|(size, paths)| {
            if paths.len() > 1 {
                stats.potential_duplicates += paths.len();
                Some(SizeGroup::with_paths(size, paths))
            } else {
                stats.eliminated_unique += paths.len();
                None
            }
        })
        .collect();
    groups.sort_unstable_by(|a, b| b.size.cmp(&a.size));
    stats.size_groups = groups.len();

    log::debug!(
        "Size grouping: {} files, {} unique sizes, {} groups ({:.1}% eliminated)",
        stats.total_files,
        stats.unique_sizes,
        stats.size_groups,
        stats.elimination_rate()
    );

    Ok((groups, stats))
}

/// Split one size bucket into groups of identical content.
///
/// Each candidate is compared against the representative of each tentative
/// group in turn; on the first match it joins that group, otherwise it
/// starts a new one. Groups left with a single member are dropped.
///
/// Correctness relies on `probe.content_equals` being an equivalence
/// relation over the bucket's files. Files modified during the scan give
/// unspecified groupings.
///
/// # Errors
///
/// Any [`CompareError`] aborts the whole bucket; a failed comparison is
/// never treated as "different".
pub fn cluster_by_content<P>(
    bucket: SizeGroup,
    probe: &P,
) -> Result<Vec<DuplicateGroup>, CompareError>
where
    P: FileProbe + ?Sized,
{
    let SizeGroup { size, paths } = bucket;
    let mut tentative: Vec<Vec<PathBuf>> = Vec::new();

    'candidates: for candidate in paths {
        for members in &mut tentative {
            if probe.content_equals(&members[0], &candidate)? {
                members.push(candidate);
                continue 'candidates;
            }
        }
        tentative.push(vec![candidate]);
    }

    let groups: Vec<DuplicateGroup> = tentative
        .into_iter()
        .filter(|members| members.len() > 1)
        .map(|members| DuplicateGroup::new(size, members))
        .collect();

    log::trace!("Bucket of {} bytes: {} duplicate groups", size, groups.len());

    Ok(groups)
}
