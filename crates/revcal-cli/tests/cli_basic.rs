//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary with HOME pointed at a temporary directory
//! so the config file never touches the real data directory.

use std::path::Path;
use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(home: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_revcal-cli"))
        .args(args)
        .env("HOME", home)
        .env_remove("REVCAL_ENV")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_cli_success(home: &Path, args: &[&str]) -> String {
    let (stdout, stderr, code) = run_cli(home, args);
    assert_eq!(code, 0, "CLI command failed {args:?}: {stderr}");
    stdout
}

fn parse_json(stdout: &str) -> serde_json::Value {
    serde_json::from_str(stdout).expect("Failed to parse JSON output")
}

#[test]
fn test_topics_lists_default_catalog() {
    let home = tempfile::tempdir().unwrap();
    let stdout = run_cli_success(home.path(), &["topics"]);
    assert!(stdout.contains("Gen chem 1-2"));
    assert!(stdout.contains("32 topics, 6 subjects"));
}

#[test]
fn test_topics_from_file() {
    let home = tempfile::tempdir().unwrap();
    let file = home.path().join("topics.csv");
    std::fs::write(&file, "Topic\nBio 1-2\nBio 3-4\nBio 1-2\nPhysics 1-2\n").unwrap();

    let stdout = run_cli_success(
        home.path(),
        &["topics", "--file", file.to_str().unwrap(), "--json"],
    );
    let json = parse_json(&stdout);
    let lines = json.as_array().unwrap();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0]["subject"], "Bio");
}

#[test]
fn test_generate_json() {
    let home = tempfile::tempdir().unwrap();
    let stdout = run_cli_success(
        home.path(),
        &[
            "generate",
            "--start",
            "2025-07-07",
            "--end",
            "2025-07-13",
            "--per-day",
            "3",
            "--skip-weekends",
            "--seed",
            "7",
            "--json",
        ],
    );
    let json = parse_json(&stdout);
    let entries = json["schedule"].as_array().unwrap();
    assert_eq!(entries.len(), 7);
    assert_eq!(entries[0]["plan"]["kind"], "topics");
    assert_eq!(entries[0]["plan"]["value"].as_array().unwrap().len(), 3);
    assert_eq!(entries[5]["plan"]["kind"], "activity");
    assert_eq!(json["summary"]["total_assignments"], 15);
}

#[test]
fn test_generate_rejects_inverted_range() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(
        home.path(),
        &["generate", "--start", "2025-07-13", "--end", "2025-07-07"],
    );
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_optimize_reports_best_seed() {
    let home = tempfile::tempdir().unwrap();
    let stdout = run_cli_success(
        home.path(),
        &[
            "optimize",
            "--start",
            "2025-07-01",
            "--end",
            "2025-07-31",
            "--trials",
            "10",
            "--base-seed",
            "100",
            "--json",
        ],
    );
    let json = parse_json(&stdout);
    let seed = json["result"]["best_seed"].as_u64().unwrap();
    assert!((100..110).contains(&seed));
    assert_eq!(json["result"]["trials"], 10);
    assert_eq!(json["topics"].as_array().unwrap().len(), 32);
}

#[test]
fn test_config_roundtrip() {
    let home = tempfile::tempdir().unwrap();
    assert_eq!(
        run_cli_success(home.path(), &["config", "get", "schedule.topics_per_day"]).trim(),
        "4"
    );

    run_cli_success(home.path(), &["config", "set", "optimizer.trials", "12"]);
    assert_eq!(
        run_cli_success(home.path(), &["config", "get", "optimizer.trials"]).trim(),
        "12"
    );

    run_cli_success(home.path(), &["config", "reset"]);
    assert_eq!(
        run_cli_success(home.path(), &["config", "get", "optimizer.trials"]).trim(),
        "200"
    );
}

#[test]
fn test_config_unknown_key_fails() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["config", "get", "schedule.nope"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("unknown key"));

    let (_, _, code) = run_cli(home.path(), &["config", "set", "schedule.nope", "1"]);
    assert_eq!(code, 1);
}

#[test]
fn test_config_path_is_under_home() {
    let home = tempfile::tempdir().unwrap();
    let stdout = run_cli_success(home.path(), &["config", "path"]);
    assert!(stdout.trim().ends_with(".config/revcal/config.toml"));
}

#[test]
fn test_plan_without_dates_fails() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["plan"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("schedule.start_date"));
}

#[test]
fn test_plan_from_config_file() {
    let home = tempfile::tempdir().unwrap();
    let config = home.path().join("plan.toml");
    std::fs::write(
        &config,
        r#"
[schedule]
start_date = "2025-07-07"
end_date = "2025-07-20"
skip_weekends = true

[optimizer]
trials = 5

[[blocked]]
purpose = "conference"
start = "2025-07-09"
end = "2025-07-10"
"#,
    )
    .unwrap();

    let stdout = run_cli_success(
        home.path(),
        &["plan", "--config", config.to_str().unwrap(), "--json"],
    );
    let json = parse_json(&stdout);
    assert!(!json["moves"].as_array().unwrap().is_empty());
    for task in json["tasks"].as_array().unwrap() {
        let date = task["date"].as_str().unwrap();
        assert!(date != "2025-07-09" && date != "2025-07-10");
    }
}

#[test]
fn test_resolve_rows_with_vacation() {
    let home = tempfile::tempdir().unwrap();
    let config = home.path().join("resolve.toml");
    std::fs::write(
        &config,
        r#"
[[blocked]]
purpose = "vacation"
start = "2025-06-01"
end = "2025-06-01"
task_types = ["1-Day Review"]
capacity = 6
"#,
    )
    .unwrap();

    let rows: Vec<serde_json::Value> = (1..=7)
        .map(|i| serde_json::json!({ "Topic": format!("Bio {i}"), "1-Day Review": "2025-06-01" }))
        .collect();
    let input = home.path().join("tasks.json");
    std::fs::write(&input, serde_json::to_string(&rows).unwrap()).unwrap();

    let stdout = run_cli_success(
        home.path(),
        &[
            "resolve",
            input.to_str().unwrap(),
            "--config",
            config.to_str().unwrap(),
        ],
    );
    let json = parse_json(&stdout);
    let dates: Vec<&str> = json["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["date"].as_str().unwrap())
        .collect();
    assert_eq!(dates.iter().filter(|d| **d == "2025-06-02").count(), 6);
    assert_eq!(dates.iter().filter(|d| **d == "2025-06-03").count(), 1);
    assert_eq!(json["moves"].as_array().unwrap().len(), 7);
}

#[test]
fn test_resolve_rejects_bad_task_in_task_list() {
    let home = tempfile::tempdir().unwrap();
    let input = home.path().join("tasks.json");
    std::fs::write(
        &input,
        r#"[
            {"topic": "Bio 1-2", "task_type": "Study Date", "date": "2025-06-02"},
            {"topic": "Bio 3-4", "task_type": "Homework", "date": "2025-06-03"}
        ]"#,
    )
    .unwrap();

    let (stdout, stderr, code) = run_cli(home.path(), &["resolve", input.to_str().unwrap()]);
    assert_eq!(code, 1, "stdout: {stdout}");
    assert!(stdout.is_empty());
    assert!(stderr.contains("Homework"), "stderr: {stderr}");
}

#[test]
fn test_resolve_rejects_bad_date_in_task_list() {
    let home = tempfile::tempdir().unwrap();
    let input = home.path().join("tasks.json");
    std::fs::write(
        &input,
        r#"[{"topic": "Bio 1-2", "task_type": "Study Date", "date": "June 2"}]"#,
    )
    .unwrap();

    let (_, stderr, code) = run_cli(home.path(), &["resolve", input.to_str().unwrap()]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_resolve_task_list_keeps_every_task() {
    let home = tempfile::tempdir().unwrap();
    let input = home.path().join("tasks.json");
    std::fs::write(
        &input,
        r#"[
            {"id": "a", "topic": "FL 1", "task_type": "Full Length Exam", "date": "2025-06-10"},
            {"id": "b", "topic": "FL 2", "task_type": "Full Length Exam", "date": "2025-06-10"},
            {"topic": "Bio 1-2", "task_type": "Study Date", "date": "2025-06-02"}
        ]"#,
    )
    .unwrap();

    let stdout = run_cli_success(home.path(), &["resolve", input.to_str().unwrap()]);
    let json = parse_json(&stdout);
    let tasks = json["tasks"].as_array().unwrap();
    assert_eq!(tasks.len(), 3);
    assert_eq!(json["moves"].as_array().unwrap().len(), 1);
    assert_eq!(json["moves"][0]["task_id"], "b");
    assert_eq!(json["moves"][0]["to"], "2025-06-11");
}

#[test]
fn test_completions_bash() {
    let home = tempfile::tempdir().unwrap();
    let stdout = run_cli_success(home.path(), &["completions", "bash"]);
    assert!(stdout.contains("revcal-cli"));
}
