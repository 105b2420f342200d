//! End-to-end tests for the `den-blocklists` binary.
//!
//! These cover:
//! - successful run prints the summary and the manifest location
//! - missing output directory exits 1 without writing a manifest
//! - malformed input exits 1
//! - per-list failures exit 0, or 1 under `--strict`
//! - `--format json` prints a machine-readable report

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;
use url::Url;

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn sandbox() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().canonicalize().unwrap();
    fs::create_dir(root.join("out")).unwrap();
    (tmp, root)
}

fn file_url(path: &Path) -> String {
    Url::from_file_path(path).unwrap().to_string()
}

/// Write an input document with one list per `(id, source path)` pair.
fn write_input(root: &Path, lists: &[(&str, &Path)]) -> PathBuf {
    let entries: Vec<serde_json::Value> = lists
        .iter()
        .map(|(id, source)| {
            serde_json::json!({
                "id": id,
                "name": id,
                "description": "test list",
                "sourceURL": file_url(source),
            })
        })
        .collect();
    let path = root.join("blocklists.json");
    fs::write(&path, serde_json::to_string(&entries).unwrap()).unwrap();
    path
}

fn den_blocklists(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_den-blocklists"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn path_arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn successful_run_prints_summary() {
    let (_tmp, root) = sandbox();
    let source = root.join("easylist.txt");
    fs::write(&source, "||ads.example.com^\n##.banner\n").unwrap();
    let input = write_input(&root, &[("easylist", source.as_path())]);
    let out = root.join("out");

    let output = den_blocklists(&[path_arg(&input), path_arg(&out)]);

    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Finished processing blocklists!"), "{stdout}");
    assert!(stdout.contains("manifest.json"), "{stdout}");
    assert!(stdout.contains("All 1 lists converted"), "{stdout}");
    assert!(out.join("manifest.json").exists());
    assert!(out.join("easylist.json").exists());
}

#[test]
fn missing_output_directory_fails() {
    let (_tmp, root) = sandbox();
    let source = root.join("list.txt");
    fs::write(&source, "||ads.example.com^\n").unwrap();
    let input = write_input(&root, &[("list", source.as_path())]);
    let out = root.join("missing");

    let output = den_blocklists(&[path_arg(&input), path_arg(&out)]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Output directory does not exist"), "{stderr}");
    assert!(!out.exists());
}

#[test]
fn malformed_input_fails() {
    let (_tmp, root) = sandbox();
    let input = root.join("blocklists.json");
    fs::write(&input, "not json").unwrap();
    let out = root.join("out");

    let output = den_blocklists(&[path_arg(&input), path_arg(&out)]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Failed to load input file"), "{stderr}");
    assert!(!out.join("manifest.json").exists());
}

#[test]
fn failed_list_exits_zero_unless_strict() {
    let (_tmp, root) = sandbox();
    let missing = root.join("missing.txt");
    let input = write_input(&root, &[("missing", missing.as_path())]);
    let out = root.join("out");

    let output = den_blocklists(&[path_arg(&input), path_arg(&out)]);
    assert!(output.status.success(), "{output:?}");
    assert!(out.join("manifest.json").exists());

    fs::remove_file(out.join("manifest.json")).unwrap();
    let output = den_blocklists(&[path_arg(&input), path_arg(&out), "--strict"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(out.join("manifest.json").exists());
}

#[test]
fn json_format_prints_report() {
    let (_tmp, root) = sandbox();
    let source = root.join("list.txt");
    fs::write(&source, "||ads.example.com^\n").unwrap();
    let missing = root.join("missing.txt");
    let input = write_input(&root, &[("list", source.as_path()), ("missing", missing.as_path())]);
    let out = root.join("out");

    let output = den_blocklists(&[path_arg(&input), path_arg(&out), "--format", "json"]);

    assert!(output.status.success(), "{output:?}");
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["manifest"][0]["id"], "list");
    assert_eq!(report["manifest"][0]["conversionSucceeded"], true);
    assert_eq!(report["entry_errors"][0]["id"], "missing");
    assert_eq!(report["entry_errors"][0]["kind"], "FetchFailed");
}

#[test]
fn missing_arguments_is_usage_error() {
    let output = den_blocklists(&[]);
    assert_eq!(output.status.code(), Some(2));
}
