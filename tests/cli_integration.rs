//! CLI integration tests for plankit
//!
//! Each test writes a snapshot into a temp directory, runs the binary
//! against it and inspects stdout, stderr or the rewritten file.

use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Get a command instance for the plankit binary, isolated from any user
/// configuration
fn plankit_cmd(dir: &TempDir) -> assert_cmd::Command {
    let config = dir.path().join("config.toml");
    if !config.exists() {
        fs::write(&config, "").unwrap();
    }
    let mut cmd = assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("plankit"));
    cmd.env("PLANKIT_CONFIG", config).env_remove("RUST_LOG");
    cmd
}

const OFFICE_MOVE: &str = r#"{
  "header": { "title": "Office move" },
  "calendars": [
    {
      "unique_id": 1,
      "name": "Standard",
      "days": [
        { "day": "sunday", "type": "non_working" },
        { "day": "monday", "type": "working" },
        { "day": "tuesday", "type": "working" },
        { "day": "wednesday", "type": "working" },
        { "day": "thursday", "type": "working" },
        { "day": "friday", "type": "working" },
        { "day": "saturday", "type": "non_working" }
      ]
    }
  ],
  "resources": [
    { "id": 1, "unique_id": 1, "name": "Ana" },
    { "id": 2, "unique_id": 2, "name": "Ben" }
  ],
  "tasks": [
    { "id": 5, "unique_id": 10, "name": "Phase", "outline_level": 1 },
    { "id": 7, "unique_id": 11, "name": "Pack", "outline_level": 2,
      "start": "2025-03-03T08:00:00", "finish": "2025-03-03T17:00:00" },
    { "id": 9, "unique_id": 12, "name": "Move", "outline_level": 2,
      "start": "2025-03-04T08:00:00", "finish": "2025-03-04T17:00:00" }
  ],
  "assignments": [
    { "unique_id": 1, "task": 11, "resource": 1 },
    { "unique_id": 2, "task": 12, "resource": 1 },
    { "unique_id": 3, "task": 12, "resource": 2 }
  ],
  "relations": [
    { "predecessor": 11, "successor": 12 }
  ]
}"#;

/// Writes the office-move plan and returns its path
fn setup_plan(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("plan.json");
    fs::write(&path, OFFICE_MOVE).unwrap();
    path
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

fn task_ids(snapshot: &Value) -> Vec<u64> {
    snapshot["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_u64().unwrap())
        .collect()
}

// =============================================================================
// Tree
// =============================================================================

#[test]
fn test_tree_text_shows_wbs() {
    let dir = TempDir::new().unwrap();
    let plan = setup_plan(&dir);

    plankit_cmd(&dir)
        .arg("tree")
        .arg(&plan)
        .assert()
        .success()
        .stdout(predicate::str::contains("Phase"))
        .stdout(predicate::str::contains("1.1"))
        .stdout(predicate::str::contains("1.2"))
        .stdout(predicate::str::contains("Move"));
}

#[test]
fn test_tree_json_is_depth_first() {
    let dir = TempDir::new().unwrap();
    let plan = setup_plan(&dir);

    let output = plankit_cmd(&dir)
        .args(["tree", "--format", "json"])
        .arg(&plan)
        .output()
        .unwrap();
    assert!(output.status.success());

    let rows = stdout_json(&output);
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["name"], "Phase");
    assert_eq!(rows[0]["depth"], 1);
    assert_eq!(rows[1]["wbs"], "1.1");
    assert_eq!(rows[1]["parent_unique_id"], 10);
    assert_eq!(rows[2]["outline_number"], "1.2");
    assert_eq!(rows[2]["depth"], 2);
}

#[test]
fn test_tree_does_not_modify_file() {
    let dir = TempDir::new().unwrap();
    let plan = setup_plan(&dir);

    plankit_cmd(&dir).arg("tree").arg(&plan).assert().success();

    assert_eq!(fs::read_to_string(&plan).unwrap(), OFFICE_MOVE);
}

#[test]
fn test_yaml_snapshot_is_read() {
    let dir = TempDir::new().unwrap();
    let plan = dir.path().join("plan.yaml");
    fs::write(
        &plan,
        "tasks:\n  - { id: 1, unique_id: 1, name: Design, outline_level: 1 }\n  - { id: 2, unique_id: 2, name: Review, outline_level: 2 }\n",
    )
    .unwrap();

    plankit_cmd(&dir)
        .arg("tree")
        .arg(&plan)
        .assert()
        .success()
        .stdout(predicate::str::contains("Review"))
        .stdout(predicate::str::contains("1.1"));
}

// =============================================================================
// Stats
// =============================================================================

#[test]
fn test_stats_json_counts() {
    let dir = TempDir::new().unwrap();
    let plan = setup_plan(&dir);

    let output = plankit_cmd(&dir)
        .args(["stats", "-f", "json"])
        .arg(&plan)
        .output()
        .unwrap();
    assert!(output.status.success());

    let stats = stdout_json(&output);
    assert_eq!(stats["tasks"]["total"], 3);
    assert_eq!(stats["tasks"]["top_level"], 1);
    assert_eq!(stats["tasks"]["summary"], 1);
    assert_eq!(stats["tasks"]["max_depth"], 2);
    assert_eq!(stats["resources"], 2);
    assert_eq!(stats["assignments"], 3);
    assert_eq!(stats["calendars"], 1);
    assert_eq!(stats["relations"], 1);
}

#[test]
fn test_stats_uses_configured_format() {
    let dir = TempDir::new().unwrap();
    let plan = setup_plan(&dir);
    fs::write(
        dir.path().join("config.toml"),
        "[output]\ndefault_format = \"json\"\n",
    )
    .unwrap();

    let output = plankit_cmd(&dir).arg("stats").arg(&plan).output().unwrap();
    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["resources"], 2);
}

#[test]
fn test_stats_text_shows_title() {
    let dir = TempDir::new().unwrap();
    let plan = setup_plan(&dir);

    plankit_cmd(&dir)
        .arg("stats")
        .arg(&plan)
        .assert()
        .success()
        .stdout(predicate::str::contains("Office move"))
        .stdout(predicate::str::contains("Assignments: 3"));
}

// =============================================================================
// Renumber and validate
// =============================================================================

#[test]
fn test_renumber_makes_ids_dense() {
    let dir = TempDir::new().unwrap();
    let plan = setup_plan(&dir);
    let target = dir.path().join("out.json");

    plankit_cmd(&dir)
        .arg("renumber")
        .arg(&plan)
        .arg("-o")
        .arg(&target)
        .assert()
        .success()
        .stdout(predicate::str::contains("Renumbered 3 tasks"));

    assert_eq!(task_ids(&read_json(&target)), vec![1, 2, 3]);
    // source untouched when -o is given
    assert_eq!(task_ids(&read_json(&plan)), vec![5, 7, 9]);
}

#[test]
fn test_renumber_hierarchy_writes_back() {
    let dir = TempDir::new().unwrap();
    let plan = setup_plan(&dir);

    plankit_cmd(&dir)
        .args(["renumber", "--hierarchy"])
        .arg(&plan)
        .assert()
        .success();

    let snapshot = read_json(&plan);
    assert_eq!(task_ids(&snapshot), vec![1, 2, 3]);
    assert_eq!(snapshot["tasks"][1]["wbs"], "1.1");
    // assignments follow their tasks through renumbering
    assert_eq!(snapshot["assignments"].as_array().unwrap().len(), 3);
}

#[test]
fn test_validate_within_range() {
    let dir = TempDir::new().unwrap();
    let plan = setup_plan(&dir);

    plankit_cmd(&dir)
        .arg("validate")
        .arg(&plan)
        .assert()
        .success()
        .stdout(predicate::str::contains("within range"));
}

#[test]
fn test_validate_renumbers_over_ceiling() {
    let dir = TempDir::new().unwrap();
    let plan = setup_plan(&dir);
    fs::write(
        dir.path().join("config.toml"),
        "[identity]\nunique_id_ceiling = 10\n",
    )
    .unwrap();

    let output = plankit_cmd(&dir)
        .args(["validate", "--format", "json"])
        .arg(&plan)
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["renumbered"], serde_json::json!(["task"]));

    let snapshot = read_json(&plan);
    let uids: Vec<u64> = snapshot["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["unique_id"].as_u64().unwrap())
        .collect();
    assert_eq!(uids, vec![1, 2, 3]);
    assert_eq!(snapshot["relations"][0]["predecessor"], 2);
    assert_eq!(snapshot["relations"][0]["successor"], 3);
}

#[test]
fn test_invalid_config_fails() {
    let dir = TempDir::new().unwrap();
    let plan = setup_plan(&dir);
    fs::write(
        dir.path().join("config.toml"),
        "[identity]\nunique_id_ceiling = 0\n",
    )
    .unwrap();

    plankit_cmd(&dir)
        .arg("stats")
        .arg(&plan)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unique_id_ceiling"));
}

// =============================================================================
// Removal
// =============================================================================

#[test]
fn test_remove_task_cascades() {
    let dir = TempDir::new().unwrap();
    let plan = setup_plan(&dir);

    plankit_cmd(&dir)
        .arg("remove-task")
        .arg(&plan)
        .arg("5")
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 3 task(s) and 3 assignment(s)"));

    let snapshot = read_json(&plan);
    assert!(snapshot["tasks"].as_array().map_or(true, |t| t.is_empty()));
    assert!(snapshot["assignments"].as_array().map_or(true, |a| a.is_empty()));
    assert!(snapshot["relations"].as_array().map_or(true, |r| r.is_empty()));
    assert_eq!(snapshot["resources"].as_array().unwrap().len(), 2);
}

#[test]
fn test_remove_task_not_found() {
    let dir = TempDir::new().unwrap();
    let plan = setup_plan(&dir);

    plankit_cmd(&dir)
        .arg("remove-task")
        .arg(&plan)
        .arg("99")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Task not found: 99"));
}

#[test]
fn test_remove_resource_keeps_other_assignments() {
    let dir = TempDir::new().unwrap();
    let plan = setup_plan(&dir);

    plankit_cmd(&dir)
        .arg("remove-resource")
        .arg(&plan)
        .arg("1")
        .assert()
        .success()
        .stdout(predicate::str::contains("2 assignment(s)"));

    let snapshot = read_json(&plan);
    let assignments = snapshot["assignments"].as_array().unwrap();
    assert_eq!(assignments.len(), 1);
    assert_eq!(assignments[0]["task"], 12);
    assert_eq!(assignments[0]["resource"], 2);
    assert_eq!(snapshot["tasks"].as_array().unwrap().len(), 3);
}

// =============================================================================
// Span
// =============================================================================

#[test]
fn test_span_on_default_calendar() {
    let dir = TempDir::new().unwrap();
    let plan = setup_plan(&dir);

    plankit_cmd(&dir)
        .arg("span")
        .arg(&plan)
        .assert()
        .success()
        .stdout(predicate::str::contains("2025-03-03 08:00"))
        .stdout(predicate::str::contains("2025-03-04 17:00"))
        .stdout(predicate::str::contains("Duration: 2d (Standard)"));
}

#[test]
fn test_span_unknown_calendar_fails() {
    let dir = TempDir::new().unwrap();
    let plan = setup_plan(&dir);

    plankit_cmd(&dir)
        .args(["span", "--calendar", "Night shift"])
        .arg(&plan)
        .assert()
        .failure()
        .stderr(predicate::str::contains("calendar 'Night shift' not found"));
}

#[test]
fn test_missing_snapshot_fails() {
    let dir = TempDir::new().unwrap();

    plankit_cmd(&dir)
        .arg("tree")
        .arg(dir.path().join("absent.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to open snapshot"));
}

#[test]
fn test_repeated_task_id_is_rejected() {
    let dir = TempDir::new().unwrap();
    let plan = dir.path().join("plan.json");
    fs::write(
        &plan,
        r#"{"tasks": [
            {"id": 1, "unique_id": 10, "name": "A"},
            {"id": 1, "unique_id": 11, "name": "B"}
        ]}"#,
    )
    .unwrap();

    plankit_cmd(&dir)
        .arg("remove-task")
        .arg(&plan)
        .arg("1")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Duplicate task ID: 1"));
}
