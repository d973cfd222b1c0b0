use dupefind::duplicates::{find_duplicates, DuplicateFinder, FinderConfig};
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use tempfile::tempdir;

fn write(path: PathBuf, content: &[u8]) -> PathBuf {
    File::create(&path).unwrap().write_all(content).unwrap();
    path
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let finder = DuplicateFinder::with_defaults();

    let report = finder.find_duplicates(&[dir.path().to_path_buf()]).unwrap();

    assert!(report.groups.is_empty());
    assert_eq!(report.summary.total_files, 0);
    assert_eq!(report.summary.duplicate_groups, 0);
}

#[test]
fn test_scan_unique_files() {
    let dir = tempdir().unwrap();
    write(dir.path().join("a.txt"), b"content a");
    write(dir.path().join("b.txt"), b"content b");
    write(dir.path().join("c.txt"), b"content c");

    let report = DuplicateFinder::with_defaults()
        .find_duplicates(&[dir.path().to_path_buf()])
        .unwrap();

    assert!(report.groups.is_empty());
    assert_eq!(report.summary.total_files, 3);
    assert_eq!(report.summary.size_groups, 1);
    assert_eq!(report.summary.duplicate_groups, 0);
}

#[test]
fn test_scan_nested_directories() {
    let dir = tempdir().unwrap();
    let sub = dir.path().join("subdir");
    let deeper = sub.join("deeper");
    fs::create_dir_all(&deeper).unwrap();

    let a = write(dir.path().join("a.txt"), b"nested duplicate");
    let b = write(sub.join("b.txt"), b"nested duplicate");
    let c = write(deeper.join("c.txt"), b"nested duplicate");

    let groups = find_duplicates(&[dir.path().to_path_buf()], false).unwrap();

    assert_eq!(groups.len(), 1);
    let mut members = groups[0].clone();
    members.sort();
    let mut expected = vec![a, b, c];
    expected.sort();
    assert_eq!(members, expected);
}

#[test]
fn test_scan_mixed_sizes_and_contents() {
    // a, b identical; c same size as a, different content; d different size
    let dir = tempdir().unwrap();
    let a = write(dir.path().join("a"), b"abc");
    let b = write(dir.path().join("b"), b"abc");
    write(dir.path().join("c"), b"xyz");
    write(dir.path().join("d"), b"abcd");

    let groups = find_duplicates(&[dir.path().to_path_buf()], false).unwrap();

    assert_eq!(groups, vec![vec![a, b]]);
}

#[test]
fn test_scan_same_size_different_content_split() {
    let dir = tempdir().unwrap();
    let a1 = write(dir.path().join("a1"), b"aaaa");
    let b1 = write(dir.path().join("b1"), b"bbbb");
    let a2 = write(dir.path().join("a2"), b"aaaa");
    let b2 = write(dir.path().join("b2"), b"bbbb");
    write(dir.path().join("c1"), b"cccc");

    let report = DuplicateFinder::with_defaults()
        .find_duplicates(&[dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(report.summary.size_groups, 1);
    assert_eq!(report.groups.len(), 2);
    let groups = report.into_path_groups();
    assert!(groups.contains(&vec![a1, a2]));
    assert!(groups.contains(&vec![b1, b2]));
}

#[test]
fn test_scan_empty_files_are_duplicates() {
    let dir = tempdir().unwrap();
    write(dir.path().join("empty1"), b"");
    write(dir.path().join("empty2"), b"");
    write(dir.path().join("full"), b"x");

    let report = DuplicateFinder::with_defaults()
        .find_duplicates(&[dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.groups[0].size, 0);
    assert_eq!(report.groups[0].len(), 2);
    assert_eq!(report.summary.reclaimable_space, 0);
}

#[test]
fn test_scan_large_files_across_chunk_boundary() {
    let dir = tempdir().unwrap();
    let content: Vec<u8> = (0..200_000u32).map(|i| (i % 256) as u8).collect();
    write(dir.path().join("big1"), &content);
    write(dir.path().join("big2"), &content);
    let mut late_diff = content.clone();
    late_diff[199_999] ^= 1;
    write(dir.path().join("big3"), &late_diff);

    let report = DuplicateFinder::with_defaults()
        .find_duplicates(&[dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.groups[0].len(), 2);
    assert_eq!(report.summary.reclaimable_space, 200_000);
}

#[test]
fn test_scan_is_idempotent() {
    let dir = tempdir().unwrap();
    for i in 0..6 {
        write(
            dir.path().join(format!("f{i}")),
            format!("content {}", i % 3).as_bytes(),
        );
    }

    let roots = [dir.path().to_path_buf()];
    let first = find_duplicates(&roots, false).unwrap();
    let second = find_duplicates(&roots, false).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.len(), 3);
}

#[test]
fn test_scan_single_thread_matches_parallel() {
    let dir = tempdir().unwrap();
    for i in 0..20 {
        let content = "x".repeat(i % 5 + 1);
        write(dir.path().join(format!("f{i:02}")), content.as_bytes());
    }
    let roots = [dir.path().to_path_buf()];

    let single = DuplicateFinder::new(FinderConfig::default().with_threads(1))
        .find_duplicates(&roots)
        .unwrap()
        .into_path_groups();
    let parallel = DuplicateFinder::new(FinderConfig::default().with_threads(4))
        .find_duplicates(&roots)
        .unwrap()
        .into_path_groups();

    assert_eq!(single, parallel);
    assert_eq!(single.len(), 5);
}
