//! Integration tests for the liftlog binary.
//!
//! These tests verify end-to-end behavior including:
//! - Logging utterances to the journal
//! - Set numbering across invocations
//! - Summaries, export and reset

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Helper to create a test data directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Helper to get the path to the CLI binary
fn cli() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("liftlog"))
}

/// CLI pointed at an isolated data directory and an empty config file
fn cli_in(dir: &Path) -> Command {
    let config_path = dir.join("config.toml");
    if !config_path.exists() {
        fs::write(&config_path, "").expect("Failed to write config");
    }
    let mut cmd = cli();
    cmd.arg("--data-dir")
        .arg(dir.join("data"))
        .arg("--config")
        .arg(config_path);
    cmd
}

fn log(dir: &Path, date: &str, utterance: &str) {
    cli_in(dir)
        .args(["log", "--no-assist", "--date", date])
        .args(utterance.split_whitespace())
        .assert()
        .success();
}

fn stdout_json(output: &[u8]) -> serde_json::Value {
    serde_json::from_slice(output).expect("stdout was not JSON")
}

#[test]
fn test_cli_help() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Log strength workouts from dictated sentences",
        ));
}

#[test]
fn test_log_creates_journal() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();

    cli_in(dir)
        .args(["log", "--no-assist", "--date", "2026-10-19"])
        .args(["bench", "press", "3", "sets", "of", "10", "at", "60", "kg"])
        .assert()
        .success()
        .stdout(predicate::str::contains("bench press (new exercise)"))
        .stdout(predicate::str::contains("Set 3: 10 reps @ 60 kg"));

    let journal = fs::read_to_string(dir.join("data/journal/workouts.jsonl")).unwrap();
    assert_eq!(journal.lines().count(), 1);
    assert!(journal.contains("\"utterance\":\"bench press 3 sets of 10 at 60 kg\""));
    assert!(dir.join("data/journal/session.json").exists());
}

#[test]
fn test_continuation_numbering_across_runs() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();

    log(dir, "2026-10-19", "bench press 3 sets of 10 at 60 kg");

    let output = cli_in(dir)
        .args(["log", "--no-assist", "--json", "--date", "2026-10-19"])
        .args(["next", "set", "8", "reps", "65", "kg"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let outcome = stdout_json(&output.stdout);
    assert_eq!(outcome["exercise"], "bench press");
    assert_eq!(outcome["isContinuation"], true);
    assert_eq!(outcome["isNewExercise"], false);
    assert_eq!(outcome["setNumber"], 4);
    assert_eq!(outcome["sets"][0]["set"], 4);
    assert_eq!(outcome["sets"][0]["weight_kg"], 65.0);
}

#[test]
fn test_voice_continuation_flag() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();

    log(dir, "2026-10-19", "squat 2 sets of 5 at 100 kg");

    let output = cli_in(dir)
        .args(["log", "--no-assist", "--json", "--voice-continuation"])
        .args(["--date", "2026-10-19", "5", "reps", "105", "kg"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let outcome = stdout_json(&output.stdout);
    assert_eq!(outcome["exercise"], "squat");
    assert_eq!(outcome["setNumber"], 3);
}

#[test]
fn test_dry_run_does_not_log() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();

    cli_in(dir)
        .args(["log", "--dry-run", "--no-assist", "deadlift", "5", "reps", "140", "kg"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run"));

    assert!(!dir.join("data/journal/workouts.jsonl").exists());
    assert!(!dir.join("data/journal/session.json").exists());
}

#[test]
fn test_empty_utterance_rejected() {
    let temp_dir = setup_test_dir();

    cli_in(temp_dir.path())
        .args(["log", "--no-assist"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input"));
}

#[test]
fn test_parse_prints_outcome_without_saving() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();

    let output = cli_in(dir)
        .args(["parse", "--last-exercise", "bench press", "--last-set", "3"])
        .args(["another", "set", "6", "reps", "135", "pounds"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let outcome = stdout_json(&output.stdout);
    assert_eq!(outcome["exercise"], "bench press");
    assert_eq!(outcome["setNumber"], 4);
    assert_eq!(outcome["sets"][0]["weight_unit"], "lbs");
    assert!(!dir.join("data/journal").exists());
}

#[test]
fn test_parse_unrecognized_without_context() {
    let temp_dir = setup_test_dir();

    let output = cli_in(temp_dir.path())
        .args(["parse", "xyz", "qwerty"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let outcome = stdout_json(&output.stdout);
    assert_eq!(outcome["exercise"], "xyz qwerty");
    assert_eq!(outcome["isNewExercise"], true);
    assert_eq!(outcome["sets"].as_array().unwrap().len(), 3);
}

#[test]
fn test_summary_without_data() {
    let temp_dir = setup_test_dir();

    cli_in(temp_dir.path())
        .args(["summary", "daily", "--date", "2026-10-19"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No workouts logged for 2026-10-19"));
}

#[test]
fn test_daily_summary_merges_continuations() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();

    log(dir, "2026-10-19", "bench press 3 sets of 10 at 60 kg");
    log(dir, "2026-10-19", "next set 8 reps 65 kg");

    cli_in(dir)
        .args(["summary", "daily", "--date", "2026-10-19"])
        .assert()
        .success()
        .stdout(predicate::str::contains("bench press: 4 sets"));

    let output = cli_in(dir)
        .args(["summary", "daily", "--date", "2026-10-19", "--json"])
        .output()
        .unwrap();
    let summary = stdout_json(&output.stdout);
    assert_eq!(summary["status"], "ready");
    assert_eq!(summary["stats"]["setCount"], 4);
    assert_eq!(summary["stats"]["totalReps"], 38);
}

#[test]
fn test_weekly_summary_json() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();

    log(dir, "2026-10-19", "squat 3 sets of 5 at 100 kg");
    cli_in(dir).arg("reset").assert().success();
    log(dir, "2026-10-21", "squat 2 sets of 5 at 105 kg");
    // Outside the week
    log(dir, "2026-10-26", "squat 5 sets of 5 at 110 kg");

    let output = cli_in(dir)
        .args(["summary", "weekly", "--from", "2026-10-19", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let summary = stdout_json(&output.stdout);
    assert_eq!(summary["end"], "2026-10-25");
    let row = &summary["tableData"][0];
    assert_eq!(row["exercise"], "squat");
    assert_eq!(row["totalSets"], 5);
    assert_eq!(row["workoutsCount"], 2);
    assert_eq!(row["avgSetsPerWorkout"], 2.5);
    assert_eq!(row["maxWeightKg"], 105.0);
}

#[test]
fn test_export_csv() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();
    let out = dir.join("sets.csv");

    log(dir, "2026-10-19", "bench press 3 sets of 10 at 60 kg");

    cli_in(dir)
        .args(["export", "--out"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 3 sets"));

    let csv = fs::read_to_string(&out).unwrap();
    assert_eq!(csv.lines().count(), 4);
    assert!(csv.starts_with("date,exercise,set,reps,weight_kg,weight_lbs,weight_unit"));
}

#[test]
fn test_reset_clears_session() {
    let temp_dir = setup_test_dir();
    let dir = temp_dir.path();

    log(dir, "2026-10-19", "bench press 3 sets of 10 at 60 kg");
    cli_in(dir)
        .arg("reset")
        .assert()
        .success()
        .stdout(predicate::str::contains("Session cleared"));

    assert!(!dir.join("data/journal/session.json").exists());

    // Without context an unrecognized utterance starts fresh
    let output = cli_in(dir)
        .args(["log", "--no-assist", "--json", "--date", "2026-10-19", "xyz", "qwerty"])
        .output()
        .unwrap();
    let outcome = stdout_json(&output.stdout);
    assert_eq!(outcome["isNewExercise"], true);
    assert_eq!(outcome["setNumber"], 3);
}
