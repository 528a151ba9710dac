//! CLI end-to-end tests.
//!
//! Each test runs the built binary against its own data directory and reads
//! the JSON it prints.

use serde_json::Value;
use std::path::Path;
use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(data_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_studyroom"))
        .args(args)
        .env("STUDYROOM_DATA_DIR", data_dir)
        .env_remove("STUDYROOM_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_json(data_dir: &Path, args: &[&str]) -> Value {
    let (stdout, stderr, code) = run_cli(data_dir, args);
    assert_eq!(code, 0, "{args:?} failed: {stderr}");
    serde_json::from_str(&stdout).expect("stdout is JSON")
}

#[test]
fn test_subject_and_chapter_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let subject = run_json(dir.path(), &["subject", "add", "Biology", "--color", "#10B981"]);
    let subject_id = subject["id"].as_str().unwrap();

    let chapter = run_json(dir.path(), &["subject", "chapter-add", subject_id, "Cells"]);
    assert_eq!(chapter["mastery"], 0);

    let list = run_json(dir.path(), &["subject", "list"]);
    assert_eq!(list[0]["name"], "Biology");
    assert_eq!(list[0]["chapters"][0]["title"], "Cells");
}

#[test]
fn test_invalid_color_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["subject", "add", "Art", "--color", "blue"]);
    assert_eq!(code, 1);
    assert!(stderr.starts_with("error:"));
}

#[test]
fn test_task_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let task = run_json(dir.path(), &["task", "add", "Read chapter 3", "--priority", "high"]);
    let id = task["id"].as_str().unwrap();
    assert_eq!(task["status"], "todo");

    let done = run_json(dir.path(), &["task", "done", id, "--minutes", "40"]);
    assert_eq!(done["status"], "completed");

    let stats = run_json(dir.path(), &["task", "stats"]);
    assert_eq!(stats["totalTasks"], 1);
    assert_eq!(stats["completedTasks"], 1);
}

#[test]
fn test_pomodoro_complete_before_focus_ends_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    run_json(dir.path(), &["pomodoro", "start"]);
    let (stdout, stderr, code) = run_cli(dir.path(), &["pomodoro", "complete"]);
    assert_eq!(code, 1);
    assert!(stdout.is_empty());
    assert!(stderr.contains("nothing changed"), "stderr: {stderr}");

    let stats = run_json(dir.path(), &["pomodoro", "stats"]);
    assert_eq!(stats["totalCompleted"], 0);
    let progress = run_json(dir.path(), &["progress", "show"]);
    assert_eq!(progress["xp"]["totalXP"], 0);
}

#[test]
fn test_plan_done_pays_out_once() {
    let dir = tempfile::tempdir().unwrap();
    let subject = run_json(dir.path(), &["subject", "add", "Physics"]);
    let subject_id = subject["id"].as_str().unwrap();
    let chapter = run_json(dir.path(), &["subject", "chapter-add", subject_id, "Optics"]);
    let chapter_id = chapter["id"].as_str().unwrap();
    let session = run_json(dir.path(), &["plan", "add", subject_id, chapter_id]);
    let session_id = session["id"].as_str().unwrap();

    let done = run_json(dir.path(), &["plan", "done", session_id]);
    assert_eq!(done["value"]["xpEarned"], 15);
    let xp = run_json(dir.path(), &["progress", "show"])["xp"]["totalXP"].clone();

    let (_, stderr, code) = run_cli(dir.path(), &["plan", "done", session_id]);
    assert_eq!(code, 1);
    assert!(stderr.contains("nothing changed: already completed"), "stderr: {stderr}");

    let progress = run_json(dir.path(), &["progress", "show"]);
    assert_eq!(progress["statistics"]["totalSessions"], 1);
    assert_eq!(progress["xp"]["totalXP"], xp);
}

#[test]
fn test_noop_exits_with_error() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, stderr, code) = run_cli(dir.path(), &["pomodoro", "stop"]);
    assert_eq!(code, 1);
    assert!(stdout.is_empty());
    assert!(stderr.contains("nothing changed"), "stderr: {stderr}");
}

#[test]
fn test_class_start_requires_known_chapter() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["class", "start", "nope", "nope"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("not found"));
}

#[test]
fn test_config_set_and_get() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["config", "set", "planning.default_session_min", "45"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "ok");

    let (stdout, _, code) = run_cli(dir.path(), &["config", "get", "planning.default_session_min"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "45");

    let (_, _, code) = run_cli(dir.path(), &["config", "get", "no.such.key"]);
    assert_eq!(code, 1);
}

#[test]
fn test_demo_replaces_existing_subjects() {
    let dir = tempfile::tempdir().unwrap();
    run_json(dir.path(), &["subject", "add", "Drawing"]);
    let seeded = run_json(dir.path(), &["config", "demo"]);
    assert_eq!(seeded.as_array().unwrap().len(), 3);

    let list = run_json(dir.path(), &["subject", "list"]);
    let names: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Mathematics", "Physics", "History"]);
}

#[test]
fn test_reset_data_clears_subjects() {
    let dir = tempfile::tempdir().unwrap();
    run_json(dir.path(), &["subject", "add", "History"]);
    let (_, _, code) = run_cli(dir.path(), &["config", "reset", "--data"]);
    assert_eq!(code, 0);
    let list = run_json(dir.path(), &["subject", "list"]);
    assert_eq!(list, Value::Array(Vec::new()));
}
