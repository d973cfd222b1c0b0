//! Directory traverser built on walkdir.
//!
//! # Overview
//!
//! This module provides the [`Traverser`], which walks one or more roots and
//! yields [`Visit`] items according to a [`TraversalPolicy`]. Walking is
//! single-threaded and lazy: nothing touches the file system until the
//! returned [`Traversal`] is polled, and every call to
//! [`Traverser::visits`] starts an independent walk.
//!
//! # Features
//!
//! - Directory enter and leave events (leave follows all descendants)
//! - Symlinks as leaves, or followed with cycle suppression
//! - Failed entries skipped or surfaced per policy
//! - Missing roots skipped without affecting sibling roots
//! - Children sorted by file name for deterministic output
//!
//! # Example
//!
//! ```no_run
//! use dupefind::scanner::{Traverser, TraversalPolicy, Visit};
//! use std::path::PathBuf;
//!
//! let policy = TraversalPolicy::default()
//!     .with_files(true)
//!     .with_failed_entries(true);
//! let traverser = Traverser::new(vec![PathBuf::from("/home/user/Pictures")], policy);
//!
//! for visit in traverser.visits() {
//!     match visit {
//!         Visit::File(path) => println!("{}", path.display()),
//!         Visit::Failed { path, error } => eprintln!("{}: {}", path.display(), error),
//!         _ => {}
//!     }
//! }
//! ```

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use super::{ScanError, TraversalPolicy, Visit};

/// Restartable walker over a fixed set of roots.
///
/// The traverser itself holds no walk state; each call to
/// [`visits`](Self::visits) or [`paths`](Self::paths) performs a fresh walk,
/// so two consumers never share results.
#[derive(Debug, Clone)]
pub struct Traverser {
    /// Roots to walk, in order
    roots: Vec<PathBuf>,
    /// Emission and link policy
    policy: TraversalPolicy,
}

impl Traverser {
    /// Create a traverser over the given roots.
    ///
    /// # Arguments
    ///
    /// * `roots` - Start paths; each may be a file or a directory
    /// * `policy` - Which entries to emit
    #[must_use]
    pub fn new(roots: Vec<PathBuf>, policy: TraversalPolicy) -> Self {
        Self { roots, policy }
    }

    /// Create a traverser over a single root.
    #[must_use]
    pub fn single(root: impl Into<PathBuf>, policy: TraversalPolicy) -> Self {
        Self::new(vec![root.into()], policy)
    }

    /// Roots this traverser walks.
    #[must_use]
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Policy this traverser applies.
    #[must_use]
    pub fn policy(&self) -> &TraversalPolicy {
        &self.policy
    }

    /// Start a fresh walk, yielding every emitted [`Visit`].
    #[must_use]
    pub fn visits(&self) -> Traversal<'_> {
        Traversal {
            roots: self.roots.iter(),
            policy: self.policy,
            current: None,
            open: Vec::new(),
            pending: VecDeque::new(),
        }
    }

    /// Start a fresh walk, yielding only the paths of emitted entries.
    #[must_use]
    pub fn paths(&self) -> Paths<'_> {
        self.visits().map(Visit::into_path as fn(Visit) -> PathBuf)
    }
}

impl<'a> IntoIterator for &'a Traverser {
    type Item = PathBuf;
    type IntoIter = Paths<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths()
    }
}

/// Iterator over the paths of a walk.
pub type Paths<'a> = std::iter::Map<Traversal<'a>, fn(Visit) -> PathBuf>;

/// Build a [`Traverser`] over `roots` with `policy`.
#[must_use]
pub fn traverse(roots: Vec<PathBuf>, policy: TraversalPolicy) -> Traverser {
    Traverser::new(roots, policy)
}

/// A single in-progress walk. Created by [`Traverser::visits`].
pub struct Traversal<'a> {
    /// Roots not yet started
    roots: std::slice::Iter<'a, PathBuf>,
    policy: TraversalPolicy,
    /// Walk of the current root, if one is in progress
    current: Option<walkdir::IntoIter>,
    /// Directories entered but not yet left, with their depth
    open: Vec<(usize, PathBuf)>,
    /// Visits produced but not yet yielded
    pending: VecDeque<Visit>,
}

impl std::fmt::Debug for Traversal<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Traversal")
            .field("remaining_roots", &self.roots.len())
            .field("policy", &self.policy)
            .field("open", &self.open)
            .field("pending", &self.pending.len())
            .finish()
    }
}

impl Iterator for Traversal<'_> {
    type Item = Visit;

    fn next(&mut self) -> Option<Visit> {
        loop {
            if let Some(visit) = self.pending.pop_front() {
                return Some(visit);
            }

            let Some(walk) = self.current.as_mut() else {
                let root = self.roots.next()?;
                log::debug!("Walking root {}", root.display());
                self.current = Some(
                    WalkDir::new(root)
                        .follow_links(self.policy.follow_symlinks)
                        .sort_by_file_name()
                        .into_iter(),
                );
                continue;
            };

            match walk.next() {
                Some(Ok(entry)) => self.on_entry(entry),
                Some(Err(err)) => self.on_error(err),
                None => {
                    self.leave_down_to(0);
                    self.current = None;
                }
            }
        }
    }
}

impl Traversal<'_> {
    /// Leave every open directory at `depth` or deeper.
    fn leave_down_to(&mut self, depth: usize) {
        while self.open.last().is_some_and(|(d, _)| *d >= depth) {
            if let Some((_, dir)) = self.open.pop() {
                self.pending.push_back(Visit::LeaveDirectory(dir));
            }
        }
    }

    fn on_entry(&mut self, entry: DirEntry) {
        self.leave_down_to(entry.depth());

        let file_type = entry.file_type();
        let depth = entry.depth();

        if file_type.is_dir() {
            let path = entry.into_path();
            if self.policy.visit_directories_on_enter {
                self.pending.push_back(Visit::EnterDirectory(path.clone()));
            }
            if self.policy.visit_directories_on_leave {
                self.open.push((depth, path));
            }
        } else if file_type.is_file() {
            if self.policy.visit_files {
                self.pending.push_back(Visit::File(entry.into_path()));
            }
        } else if file_type.is_symlink() {
            // Only reachable when links are not followed.
            self.on_unfollowed_link(entry.into_path());
        } else {
            log::trace!("Skipping special file: {}", entry.path().display());
        }
    }

    /// Emit a link as a leaf according to what it resolves to.
    fn on_unfollowed_link(&mut self, path: PathBuf) {
        match std::fs::metadata(&path) {
            Ok(target) if target.is_dir() => {
                log::trace!("Not descending into symlink: {}", path.display());
                if self.policy.visit_directories_on_enter {
                    self.pending.push_back(Visit::EnterDirectory(path));
                } else if self.policy.visit_directories_on_leave {
                    self.pending.push_back(Visit::LeaveDirectory(path));
                }
            }
            Ok(target) if target.is_file() => {
                if self.policy.visit_files {
                    self.pending.push_back(Visit::File(path));
                }
            }
            Ok(_) => log::trace!("Skipping symlink to special file: {}", path.display()),
            Err(e) => {
                let error = ScanError::from_io(path.clone(), e);
                self.on_failure(path, error);
            }
        }
    }

    fn on_error(&mut self, err: walkdir::Error) {
        let depth = err.depth();
        let path = err.path().map(Path::to_path_buf).unwrap_or_default();

        // A directory whose contents could not be read stays open so that
        // its leave event still follows the failure.
        let is_open_dir = self.open.last().is_some_and(|(_, dir)| *dir == path);
        self.leave_down_to(if is_open_dir { depth + 1 } else { depth });

        if let Some(ancestor) = err.loop_ancestor() {
            let error = ScanError::Loop {
                path: path.clone(),
                ancestor: ancestor.to_path_buf(),
            };
            log::debug!("Refusing to re-enter directory: {}", error);
            self.on_failure(path, error);
            return;
        }

        let source = err
            .into_io_error()
            .unwrap_or_else(|| std::io::Error::other("walk failed"));

        if depth == 0 && source.kind() == std::io::ErrorKind::NotFound {
            log::warn!("{}", ScanError::RootNotFound(path));
            return;
        }

        let error = ScanError::from_io(path.clone(), source);
        self.on_failure(path, error);
    }

    fn on_failure(&mut self, path: PathBuf, error: ScanError) {
        if self.policy.visit_failed_entries {
            self.pending.push_back(Visit::Failed { path, error });
            return;
        }

        match &error {
            ScanError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("Entry not found during walk: {}", path.display());
            }
            ScanError::Loop { .. } => {}
            _ => log::warn!("Skipping entry: {}", error),
        }
    }
}
