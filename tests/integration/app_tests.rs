use clap::Parser;
use dupefind::cli::Cli;
use dupefind::error::ExitCode;
use dupefind::run_app_with_writer;
use std::fs;
use tempfile::tempdir;

fn run(args: &[&str]) -> (ExitCode, String) {
    let cli = Cli::try_parse_from(args.iter().copied()).unwrap();
    let mut out = Vec::new();
    let code = run_app_with_writer(cli, &mut out).unwrap();
    (code, String::from_utf8(out).unwrap())
}

#[test]
fn test_app_reports_duplicates_as_text() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "copy").unwrap();
    fs::write(dir.path().join("b.txt"), "copy").unwrap();
    let root = dir.path().to_str().unwrap();

    let (code, out) = run(&["dupefind", root, "--output", "text"]);

    assert_eq!(code, ExitCode::Success);
    assert!(out.contains("Group 1: 2 files of"));
    assert!(out.contains("a.txt"));
    assert!(out.contains("b.txt"));
}

#[test]
fn test_app_no_duplicates_exit_code() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "one").unwrap();
    fs::write(dir.path().join("b.txt"), "two!").unwrap();
    let root = dir.path().to_str().unwrap();

    let (code, out) = run(&["dupefind", root, "--output", "text"]);

    assert_eq!(code, ExitCode::NoDuplicates);
    assert!(out.starts_with("0 duplicate groups"));
}

#[test]
fn test_app_json_output() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a.bin");
    let b = dir.path().join("b.bin");
    fs::write(&a, [1u8, 2, 3]).unwrap();
    fs::write(&b, [1u8, 2, 3]).unwrap();
    let root = dir.path().to_str().unwrap();

    let (code, out) = run(&["dupefind", root, "--output", "json", "--threads", "2"]);
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();

    assert_eq!(code, ExitCode::Success);
    assert_eq!(value["duplicates"][0]["size"], 3);
    assert_eq!(value["duplicates"][0]["files"][0], a.to_str().unwrap());
    assert_eq!(value["duplicates"][0]["files"][1], b.to_str().unwrap());
    assert_eq!(value["summary"]["exit_code_name"], "DF000");
}

#[test]
fn test_app_explicit_config_file() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("data");
    fs::create_dir(&data).unwrap();
    fs::write(data.join("a"), "same").unwrap();
    fs::write(data.join("b"), "same").unwrap();
    let config_path = dir.path().join("dupefind.toml");
    fs::write(&config_path, "output = \"json\"\n").unwrap();

    let (_, out) = run(&[
        "dupefind",
        data.to_str().unwrap(),
        "--config",
        config_path.to_str().unwrap(),
    ]);

    assert!(serde_json::from_str::<serde_json::Value>(&out).is_ok());
}

#[test]
fn test_app_missing_config_file_is_error() {
    let dir = tempdir().unwrap();
    let cli = Cli::try_parse_from([
        "dupefind",
        dir.path().to_str().unwrap(),
        "--config",
        "/nonexistent/dupefind.toml",
    ])
    .unwrap();

    let result = run_app_with_writer(cli, &mut Vec::new());

    assert!(result.is_err());
}
