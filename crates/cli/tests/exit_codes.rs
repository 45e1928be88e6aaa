//! Run the `tunegraph` binary end to end and check its exit status.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::TempDir;

const LIBRARY: &str = r#"{
  "Tracks": {
    "1": {"Name": "One", "Artist": "Alpha", "Album": "First", "Play Count": 30},
    "2": {"Name": "Two", "Artist": "Beta", "Album": "Second", "Play Count": 12}
  }
}"#;

const LIBRARY_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple Computer//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
    <key>Tracks</key>
    <dict>
        <key>1</key>
        <dict>
            <key>Name</key><string>One</string>
            <key>Artist</key><string>Alpha</string>
            <key>Play Count</key><integer>30</integer>
            <key>Play Date UTC</key><date>2024-03-04T17:30:00Z</date>
        </dict>
        <key>2</key>
        <dict>
            <key>Name</key><string>Two</string>
            <key>Artist</key><string>Beta</string>
            <key>Play Count</key><integer>12</integer>
            <key>Play Date UTC</key><date>2024-03-09T20:00:00Z</date>
        </dict>
    </dict>
</dict>
</plist>
"#;

fn tunegraph(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tunegraph"))
        .current_dir(dir)
        .env_remove("TUNEGRAPH_TOP")
        .env_remove("TUNEGRAPH_WORKERS")
        .env_remove("RUST_LOG")
        .args(["--config", "/nonexistent/config.yaml"])
        .args(args)
        .output()
        .unwrap()
}

fn write_library(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn combined(output: &Output) -> String {
    format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    )
}

#[test]
fn missing_library_path_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = tunegraph(dir.path(), &[]);
    assert!(!output.status.success());
    assert!(combined(&output).contains("library path is required"));
}

#[test]
fn non_positive_top_fails() {
    let dir = tempfile::tempdir().unwrap();
    let library = write_library(&dir, "Library.json", LIBRARY);
    let output = tunegraph(dir.path(), &[library.to_str().unwrap(), "--top", "0"]);
    assert!(!output.status.success());
    assert!(combined(&output).contains("'--top' must be an integer greater than zero."));
}

#[test]
fn nonexistent_library_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = tunegraph(dir.path(), &["/nonexistent/Library.xml"]);
    assert!(!output.status.success());
    assert!(combined(&output).contains("does not exist"));
}

#[test]
fn empty_library_fails() {
    let dir = tempfile::tempdir().unwrap();
    let library = write_library(&dir, "Library.json", r#"{"Tracks": {}}"#);
    let output = tunegraph(dir.path(), &[library.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(combined(&output).contains("No tracks found"), "{}", combined(&output));
}

#[test]
fn all_analyses_failing_fails() {
    let dir = tempfile::tempdir().unwrap();
    let library = write_library(&dir, "Library.json", LIBRARY);
    let output = tunegraph(
        dir.path(),
        &[library.to_str().unwrap(), "--only", "genre_plays", "--in-process"],
    );
    assert!(!output.status.success());
    assert!(combined(&output).contains("All 1 analyses failed"), "{}", combined(&output));
}

#[test]
fn partial_failure_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let library = write_library(&dir, "Library.json", LIBRARY);
    let out = dir.path().join("charts");
    let output = tunegraph(
        dir.path(),
        &[
            library.to_str().unwrap(),
            "--output",
            out.to_str().unwrap(),
            "--only",
            "artist_plays",
            "--only",
            "genre_plays",
            "--in-process",
        ],
    );
    assert!(output.status.success(), "{}", combined(&output));
    assert!(out.join("artist_plays.json").exists());
    assert!(!out.join("genre_plays.json").exists());
}

#[test]
fn xml_library_runs_in_worker_processes() {
    let dir = tempfile::tempdir().unwrap();
    let library = write_library(&dir, "Library.xml", LIBRARY_XML);
    let output = tunegraph(
        dir.path(),
        &[
            library.to_str().unwrap(),
            "--workers",
            "2",
            "--only",
            "artist_plays",
            "--only",
            "lastplay_heatmap",
            "--only",
            "genre_plays",
            "--time-zone",
            "UTC",
        ],
    );
    assert!(output.status.success(), "{}", combined(&output));

    // Output defaults to the library path without its extension.
    let out = dir.path().join("Library");
    let chart: Value =
        serde_json::from_str(&std::fs::read_to_string(out.join("artist_plays.json")).unwrap()).unwrap();
    assert_eq!(chart["entries"][0]["label"], "Alpha");
    assert_eq!(chart["entries"][0]["value"], 30);

    let heatmap: Value =
        serde_json::from_str(&std::fs::read_to_string(out.join("lastplay_heatmap.json")).unwrap()).unwrap();
    assert_eq!(heatmap["time_zone"], "UTC");
    assert_eq!(heatmap["cells"][0][17], 1);

    // The child's failure comes back through its report.
    assert!(combined(&output).contains("Genre"), "{}", combined(&output));
}

#[test]
fn list_prints_units() {
    let dir = tempfile::tempdir().unwrap();
    let output = tunegraph(dir.path(), &["--list"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.lines().any(|l| l == "artist_plays"));
    assert!(stdout.lines().any(|l| l == "track_play_ratio"));
    assert!(!stdout.lines().any(|l| l == "helpers"));
}

#[test]
fn worker_without_job_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_tunegraph"))
        .current_dir(dir.path())
        .args(["--run-job", "/nonexistent/job-0.json"])
        .output()
        .unwrap();
    assert!(!output.status.success());
}
