//! File length and content equality probes.
//!
//! # Overview
//!
//! Grouping only needs two questions answered about the file system: how
//! long a file is, and whether two files hold the same bytes. [`FileProbe`]
//! captures both so the grouping algorithm can be driven by the real disk
//! ([`DiskProbe`]) or by a test double.
//!
//! [`DiskProbe`] compares content by streaming both files in fixed-size
//! chunks and stopping at the first difference. Files at or above the
//! mmap threshold are compared through read-only memory maps instead,
//! falling back to streaming if either map cannot be created.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use memmap2::Mmap;

/// Default chunk size for streaming comparison (64 KiB).
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// Default size at which comparison switches to memory maps (64 MiB).
pub const DEFAULT_MMAP_THRESHOLD: u64 = 64 * 1024 * 1024;

/// Failure to determine a candidate's length.
#[derive(thiserror::Error, Debug)]
pub enum ProbeError {
    /// The path could not be stat'ed.
    #[error("Cannot determine size of {path}: {source}")]
    NotAccessible {
        /// Path that could not be stat'ed
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

impl ProbeError {
    /// Path the failed query was about.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotAccessible { path, .. } => path,
        }
    }
}

/// Failure while comparing two files' content.
#[derive(thiserror::Error, Debug)]
pub enum CompareError {
    /// One of the files could not be fully read.
    #[error("I/O error comparing {path}: {source}")]
    Io {
        /// The file that could not be read
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

impl CompareError {
    /// Path of the file that could not be read.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Io { path, .. } => path,
        }
    }
}

/// Length and content queries used by duplicate grouping.
///
/// `content_equals` must behave as an equivalence relation over files of
/// equal length for the grouping to be correct. A failed comparison must be
/// reported as an error, never as `Ok(false)`.
pub trait FileProbe: Sync {
    /// Exact length of the file at `path` in bytes.
    fn length(&self, path: &Path) -> Result<u64, ProbeError>;

    /// Whether `a` and `b` hold identical bytes.
    fn content_equals(&self, a: &Path, b: &Path) -> Result<bool, CompareError>;
}

impl<P: FileProbe + ?Sized> FileProbe for &P {
    fn length(&self, path: &Path) -> Result<u64, ProbeError> {
        (**self).length(path)
    }

    fn content_equals(&self, a: &Path, b: &Path) -> Result<bool, CompareError> {
        (**self).content_equals(a, b)
    }
}

/// [`FileProbe`] backed by the local file system.
#[derive(Debug, Clone)]
pub struct DiskProbe {
    /// Chunk size for streaming comparison
    buffer_size: usize,
    /// Whether large files are compared through memory maps
    use_mmap: bool,
    /// Minimum file size for memory-mapped comparison
    mmap_threshold: u64,
}

impl Default for DiskProbe {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            use_mmap: true,
            mmap_threshold: DEFAULT_MMAP_THRESHOLD,
        }
    }
}

impl DiskProbe {
    /// Create a probe with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the chunk size used for streaming comparison.
    #[must_use]
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(1);
        self
    }

    /// Enable or disable memory-mapped comparison.
    #[must_use]
    pub fn with_mmap(mut self, enabled: bool) -> Self {
        self.use_mmap = enabled;
        self
    }

    /// Set the minimum file size for memory-mapped comparison.
    #[must_use]
    pub fn with_mmap_threshold(mut self, threshold: u64) -> Self {
        self.mmap_threshold = threshold;
        self
    }

    fn open(path: &Path) -> Result<File, CompareError> {
        File::open(path).map_err(|source| CompareError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    fn mapped_equals(a: &File, b: &File) -> io::Result<bool> {
        // SAFETY: the maps are read-only and dropped before returning. A file
        // truncated or rewritten by another process mid-compare gives
        // unspecified (but memory-safe on supported platforms) results, the
        // same as any concurrent modification during a scan.
        let map_a = unsafe { Mmap::map(a)? };
        let map_b = unsafe { Mmap::map(b)? };
        Ok(map_a[..] == map_b[..])
    }

    fn streamed_equals(
        &self,
        (a, file_a): (&Path, &mut File),
        (b, file_b): (&Path, &mut File),
    ) -> Result<bool, CompareError> {
        let mut buf_a = vec![0u8; self.buffer_size];
        let mut buf_b = vec![0u8; self.buffer_size];

        loop {
            let n_a = read_full(file_a, &mut buf_a).map_err(|source| CompareError::Io {
                path: a.to_path_buf(),
                source,
            })?;
            let n_b = read_full(file_b, &mut buf_b).map_err(|source| CompareError::Io {
                path: b.to_path_buf(),
                source,
            })?;

            if n_a != n_b || buf_a[..n_a] != buf_b[..n_b] {
                return Ok(false);
            }
            if n_a == 0 {
                return Ok(true);
            }
        }
    }
}

impl FileProbe for DiskProbe {
    fn length(&self, path: &Path) -> Result<u64, ProbeError> {
        std::fs::metadata(path)
            .map(|m| m.len())
            .map_err(|source| ProbeError::NotAccessible {
                path: path.to_path_buf(),
                source,
            })
    }

    fn content_equals(&self, a: &Path, b: &Path) -> Result<bool, CompareError> {
        if a == b {
            return Ok(true);
        }

        let mut file_a = Self::open(a)?;
        let mut file_b = Self::open(b)?;

        let len_a = file_a
            .metadata()
            .map_err(|source| CompareError::Io {
                path: a.to_path_buf(),
                source,
            })?
            .len();
        let len_b = file_b
            .metadata()
            .map_err(|source| CompareError::Io {
                path: b.to_path_buf(),
                source,
            })?
            .len();

        if len_a != len_b {
            log::debug!(
                "Length changed since bucketing ({} vs {}): {} / {}",
                len_a,
                len_b,
                a.display(),
                b.display()
            );
            return Ok(false);
        }

        if self.use_mmap && len_a > 0 && len_a >= self.mmap_threshold {
            match Self::mapped_equals(&file_a, &file_b) {
                Ok(equal) => return Ok(equal),
                Err(e) => log::debug!(
                    "Memory map failed, falling back to buffered compare of {}: {}",
                    a.display(),
                    e
                ),
            }
        }

        self.streamed_equals((a, &mut file_a), (b, &mut file_b))
    }
}

/// Fill `buf` as far as possible, returning fewer bytes only at end of file.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
