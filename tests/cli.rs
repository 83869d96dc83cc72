//! Integration tests driving the `symdex` binary.

use std::path::{Path, PathBuf};
use std::process::Command;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

/// Run symdex with given args against the fixture shards
fn run_symdex(args: &[&str]) -> (String, String, bool) {
    // Point at a missing config so a user config never leaks into the tests
    run_symdex_with_config(args, &fixtures_dir().join("no-such-config.json"))
}

fn run_symdex_with_config(args: &[&str], config: &Path) -> (String, String, bool) {
    let output = Command::new(env!("CARGO_BIN_EXE_symdex"))
        .args(args)
        .args(["--config", config.to_str().unwrap()])
        .output()
        .expect("Failed to run symdex");

    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.success(),
    )
}

#[test]
fn test_search_plain_output() {
    let dir = fixtures_dir();
    let all = dir.join("all_1.js");
    let (stdout, stderr, ok) = run_symdex(&[
        "search",
        "abs",
        "-i",
        all.to_str().unwrap(),
        "--color=never",
    ]);

    assert!(ok, "stderr: {}", stderr);
    // shorter names rank first; equal lengths fall back to name order
    let labels: Vec<_> = stdout.lines().filter(|l| !l.starts_with(' ')).collect();
    assert_eq!(
        labels,
        vec!["abs(int) [abs_28int_29]", "absolute", "abs(float) [abs_28float_29]"]
    );
    assert!(stdout.contains("  std  http://en.cppreference.com/w/cpp/numeric/math/fabs.html"));
}

#[test]
fn test_search_json_with_limit() {
    let dir = fixtures_dir();
    let (stdout, stderr, ok) = run_symdex(&[
        "search",
        "atomic_int",
        "-i",
        dir.to_str().unwrap(),
        "--domain",
        "all",
        "-n",
        "3",
        "--json",
    ]);

    assert!(ok, "stderr: {}", stderr);
    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let labels: Vec<_> = value["groups"]
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["label"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(labels, vec!["atomic_int", "atomic_int8_t", "atomic_int16_t"]);
}

#[test]
fn test_flags_override_config_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let shard = dir.path().join("all_0.js");
    std::fs::write(
        &shard,
        "var searchData=[['abs',['abs',['abs.html',1,'std']]],\n['fabs',['fabs',['fabs.html',1,'std']]]];",
    )
    .unwrap();
    let config = dir.path().join("config.json");
    std::fs::write(&config, r#"{"case_sensitive": true, "match_mode": "substring"}"#).unwrap();

    let labels = |stdout: &str| -> Vec<String> {
        stdout
            .lines()
            .filter(|l| !l.starts_with(' '))
            .map(str::to_string)
            .collect()
    };
    let shard = shard.to_str().unwrap();

    // config alone: case-sensitive substring
    let (stdout, _, ok) = run_symdex_with_config(&["search", "ABS", "-i", shard, "--color=never"], &config);
    assert!(ok);
    assert!(labels(&stdout).is_empty());

    let (stdout, stderr, ok) =
        run_symdex_with_config(&["search", "ABS", "-i", shard, "--ignore-case", "--color=never"], &config);
    assert!(ok, "stderr: {}", stderr);
    assert_eq!(labels(&stdout), vec!["abs", "fabs"]);

    let (stdout, stderr, ok) = run_symdex_with_config(
        &["search", "ABS", "-i", shard, "--ignore-case", "--prefix", "--color=never"],
        &config,
    );
    assert!(ok, "stderr: {}", stderr);
    assert_eq!(labels(&stdout), vec!["abs"]);

    let (_, _, ok) = run_symdex_with_config(
        &["search", "abs", "-i", shard, "--prefix", "--substring"],
        &config,
    );
    assert!(!ok);
}

#[test]
fn test_empty_query_fails() {
    let dir = fixtures_dir();
    let (_, stderr, ok) = run_symdex(&["search", "", "-i", dir.to_str().unwrap()]);
    assert!(!ok);
    assert!(stderr.contains("invalid query"), "stderr: {}", stderr);
}

#[test]
fn test_check_reports_shards() {
    let dir = fixtures_dir();
    let (stdout, stderr, ok) = run_symdex(&["check", "-i", dir.to_str().unwrap()]);
    assert!(ok, "stderr: {}", stderr);
    assert!(stdout.contains("all_1: 145 entries"));
    assert!(stdout.contains("OK: 2 shards"));
}

#[test]
fn test_check_rejects_duplicate_keys() {
    let dir = tempfile::tempdir().unwrap();
    let shard = dir.path().join("all_1.js");
    std::fs::write(
        &shard,
        "var searchData=[['assign',['assign',['a.html',1,'std::string::assign()']]],\n['assign',['assign',['b.html',1,'std::vector::assign()']]]];",
    )
    .unwrap();

    let (_, stderr, ok) = run_symdex(&["check", "-i", shard.to_str().unwrap()]);
    assert!(!ok);
    assert!(stderr.contains("duplicate key `assign`"), "stderr: {}", stderr);
}

#[test]
fn test_stats_json() {
    let dir = fixtures_dir();
    let (stdout, stderr, ok) = run_symdex(&["stats", "-i", dir.to_str().unwrap(), "--json"]);
    assert!(ok, "stderr: {}", stderr);

    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(value["shards"].as_array().unwrap().len(), 2);
    assert_eq!(value["domains"]["all"], 145);
}

#[test]
fn test_missing_index_is_an_error() {
    let (_, stderr, ok) = run_symdex(&["search", "abs"]);
    assert!(!ok);
    assert!(stderr.contains("No index given"), "stderr: {}", stderr);
}
