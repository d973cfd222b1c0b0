//! Scanner module for directory traversal.
//!
//! This module provides functionality for:
//! - Policy-driven directory walking using walkdir
//! - Optional symbolic link following with cycle suppression
//! - Per-root error isolation
//!
//! # Architecture
//!
//! The scanner is divided into:
//! - this module: the [`TraversalPolicy`], the [`Visit`] items a walk yields,
//!   and [`ScanError`]
//! - [`walker`]: the [`Traverser`] and its lazy [`Traversal`] iterator
//!
//! # Example
//!
//! ```no_run
//! use dupefind::scanner::{Traverser, TraversalPolicy};
//! use std::path::PathBuf;
//!
//! let policy = TraversalPolicy::files_only(false);
//! let traverser = Traverser::new(vec![PathBuf::from(".")], policy);
//!
//! // Every call starts a fresh walk.
//! for path in &traverser {
//!     println!("{}", path.display());
//! }
//! ```

pub mod walker;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub use walker::{traverse, Paths, Traversal, Traverser};

/// Which entry kinds a walk emits, and how it treats symbolic links.
///
/// All gates default to `false`. Use the `with_*` setters or the
/// [`files_only`](Self::files_only) preset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraversalPolicy {
    /// Emit a directory when the walk enters it.
    pub visit_directories_on_enter: bool,
    /// Emit a directory after all of its descendants have been emitted.
    pub visit_directories_on_leave: bool,
    /// Emit regular files.
    pub visit_files: bool,
    /// Descend into symbolic links to directories.
    pub follow_symlinks: bool,
    /// Emit entries that could not be visited instead of skipping them.
    pub visit_failed_entries: bool,
}

impl TraversalPolicy {
    /// Files only: directories and failures are never emitted.
    #[must_use]
    pub fn files_only(follow_symlinks: bool) -> Self {
        Self {
            visit_files: true,
            follow_symlinks,
            ..Self::default()
        }
    }

    /// Set whether directories are emitted on enter.
    #[must_use]
    pub fn with_directories_on_enter(mut self, enabled: bool) -> Self {
        self.visit_directories_on_enter = enabled;
        self
    }

    /// Set whether directories are emitted on leave.
    #[must_use]
    pub fn with_directories_on_leave(mut self, enabled: bool) -> Self {
        self.visit_directories_on_leave = enabled;
        self
    }

    /// Set whether regular files are emitted.
    #[must_use]
    pub fn with_files(mut self, enabled: bool) -> Self {
        self.visit_files = enabled;
        self
    }

    /// Set whether symbolic links to directories are descended into.
    #[must_use]
    pub fn with_follow_symlinks(mut self, enabled: bool) -> Self {
        self.follow_symlinks = enabled;
        self
    }

    /// Set whether failed entries are emitted.
    #[must_use]
    pub fn with_failed_entries(mut self, enabled: bool) -> Self {
        self.visit_failed_entries = enabled;
        self
    }
}

/// The kind of a [`Visit`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisitKind {
    /// A directory, emitted before its contents.
    EnterDirectory,
    /// A directory, emitted after its contents.
    LeaveDirectory,
    /// A regular file (or a link resolving to one).
    File,
    /// An entry that could not be visited.
    Failed,
}

/// A single entry produced by a [`Traversal`].
#[derive(Debug)]
pub enum Visit {
    /// A directory the walk is entering.
    EnterDirectory(PathBuf),
    /// A directory the walk has finished.
    LeaveDirectory(PathBuf),
    /// A regular file.
    File(PathBuf),
    /// An entry that could not be visited, with the reason.
    Failed {
        /// Path of the entry
        path: PathBuf,
        /// Why the visit failed
        error: ScanError,
    },
}

impl Visit {
    /// Path of the visited entry.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::EnterDirectory(path) | Self::LeaveDirectory(path) | Self::File(path) => path,
            Self::Failed { path, .. } => path,
        }
    }

    /// Consume the visit, keeping only its path.
    #[must_use]
    pub fn into_path(self) -> PathBuf {
        match self {
            Self::EnterDirectory(path) | Self::LeaveDirectory(path) | Self::File(path) => path,
            Self::Failed { path, .. } => path,
        }
    }

    /// Kind of the visit.
    #[must_use]
    pub fn kind(&self) -> VisitKind {
        match self {
            Self::EnterDirectory(_) => VisitKind::EnterDirectory,
            Self::LeaveDirectory(_) => VisitKind::LeaveDirectory,
            Self::File(_) => VisitKind::File,
            Self::Failed { .. } => VisitKind::Failed,
        }
    }
}

/// Errors that can occur during directory scanning.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// A configured root does not exist.
    #[error("Root not found: {0}")]
    RootNotFound(PathBuf),

    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// Following a symbolic link would re-enter a directory that is
    /// already open on the current descent path.
    #[error("Symbolic link cycle: {path} leads back to {ancestor}")]
    Loop {
        /// Path of the offending link
        path: PathBuf,
        /// The already-open ancestor it resolves to
        ancestor: PathBuf,
    },

    /// An I/O error occurred while accessing an entry.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl ScanError {
    /// Classify an I/O error raised while visiting `path`.
    pub(crate) fn from_io(path: PathBuf, source: std::io::Error) -> Self {
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            _ => Self::Io { path, source },
        }
    }
}
