use dupefind::duplicates::{
    find_duplicates, CompareError, DiskProbe, DuplicateFinder, FileProbe, FinderConfig,
    FinderError, ProbeError,
};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::tempdir;

/// Disk probe that fails every comparison touching one of `broken`,
/// recording the buckets it was asked about.
struct FlakyProbe {
    inner: DiskProbe,
    broken: Vec<PathBuf>,
    compared: Mutex<Vec<PathBuf>>,
}

impl FlakyProbe {
    fn new(broken: Vec<PathBuf>) -> Self {
        Self {
            inner: DiskProbe::new(),
            broken,
            compared: Mutex::new(Vec::new()),
        }
    }
}

impl FileProbe for FlakyProbe {
    fn length(&self, path: &Path) -> Result<u64, ProbeError> {
        self.inner.length(path)
    }

    fn content_equals(&self, a: &Path, b: &Path) -> Result<bool, CompareError> {
        self.compared.lock().unwrap().push(b.to_path_buf());
        for path in [a, b] {
            if self.broken.iter().any(|p| p == path) {
                return Err(CompareError::Io {
                    path: path.to_path_buf(),
                    source: io::Error::other("device went away"),
                });
            }
        }
        self.inner.content_equals(a, b)
    }
}

#[test]
fn test_failed_bucket_does_not_abort_siblings() {
    let dir = tempdir().unwrap();
    let ok_a = dir.path().join("ok_a");
    let ok_b = dir.path().join("ok_b");
    let bad_a = dir.path().join("bad_a");
    let bad_b = dir.path().join("bad_b");
    fs::write(&ok_a, b"fine").unwrap();
    fs::write(&ok_b, b"fine").unwrap();
    fs::write(&bad_a, b"broken!").unwrap();
    fs::write(&bad_b, b"broken!").unwrap();

    let probe = FlakyProbe::new(vec![bad_b.clone()]);
    let report = DuplicateFinder::with_probe(FinderConfig::default(), &probe)
        .find_duplicates(&[dir.path().to_path_buf()])
        .unwrap();

    assert!(report.is_partial());
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].size, 7);
    assert_eq!(report.failures[0].error.path(), bad_b.as_path());
    assert_eq!(report.into_path_groups(), vec![vec![ok_a, ok_b]]);

    // Both buckets were attempted.
    assert_eq!(probe.compared.lock().unwrap().len(), 2);
}

#[test]
fn test_every_bucket_failing_still_returns_report() {
    let dir = tempdir().unwrap();
    let mut broken = Vec::new();
    for (name, content) in [("a1", "a"), ("a2", "a"), ("b1", "bb"), ("b2", "bb")] {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        if name.ends_with('2') {
            broken.push(path);
        }
    }

    let report = DuplicateFinder::with_probe(FinderConfig::default(), FlakyProbe::new(broken))
        .find_duplicates(&[dir.path().to_path_buf()])
        .unwrap();

    assert!(report.groups.is_empty());
    let sizes: Vec<u64> = report.failures.iter().map(|f| f.size).collect();
    assert_eq!(sizes, vec![2, 1]);
    assert_eq!(report.summary.failed_buckets, 2);
}

#[test]
fn test_strict_mode_surfaces_largest_failed_bucket() {
    let dir = tempdir().unwrap();
    let mut broken = Vec::new();
    for (name, content) in [("a1", "a"), ("a2", "a"), ("b1", "bb"), ("b2", "bb")] {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        broken.push(path);
    }

    let config = FinderConfig::default().with_strict(true);
    let result = DuplicateFinder::with_probe(config, FlakyProbe::new(broken))
        .find_duplicates(&[dir.path().to_path_buf()]);

    match result {
        Err(FinderError::Compare { size, source }) => {
            assert_eq!(size, 2);
            assert!(source.to_string().contains("device went away"));
        }
        other => panic!("Expected Compare error, got: {:?}", other),
    }
}

#[test]
fn test_failed_comparison_is_not_reported_as_unique() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a");
    let b = dir.path().join("b");
    let c = dir.path().join("c");
    fs::write(&a, b"same").unwrap();
    fs::write(&b, b"diff").unwrap();
    fs::write(&c, b"same").unwrap();

    let probe = FlakyProbe::new(vec![c]);
    let report = DuplicateFinder::with_probe(FinderConfig::default(), probe)
        .find_duplicates(&[dir.path().to_path_buf()])
        .unwrap();

    // The whole bucket is withheld rather than reporting a partial grouping.
    assert!(report.groups.is_empty());
    assert_eq!(report.failures.len(), 1);
}

#[test]
#[cfg(unix)]
fn test_unreadable_file_fails_its_bucket_only() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let a = dir.path().join("a");
    let b = dir.path().join("b");
    let locked = dir.path().join("locked");
    let twin = dir.path().join("twin");
    fs::write(&a, b"readable").unwrap();
    fs::write(&b, b"readable").unwrap();
    fs::write(&locked, b"secret").unwrap();
    fs::write(&twin, b"secret").unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Privileged users can read the file anyway.
    if fs::File::open(&locked).is_ok() {
        return;
    }

    let report = DuplicateFinder::with_defaults()
        .find_duplicates(&[dir.path().to_path_buf()])
        .unwrap();
    let strict = find_duplicates(&[dir.path().to_path_buf()], false);

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();

    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.groups[0].paths, vec![a, b]);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].size, 6);
    assert_eq!(report.failures[0].error.path(), locked.as_path());
    assert!(strict.is_err());
}
