#![cfg(feature = "cli")]

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin;
use predicates::str::contains as str_contains;
use std::path::Path;
use tempfile::TempDir;

const TEMPLATE: &str = r#"{
  "monday": { "shifts": [{ "from": "09:00", "to": "17:00", "requiredEmployees": 2 }] },
  "tuesday": { "shifts": [] },
  "wednesday": { "shifts": [] },
  "thursday": { "shifts": [] },
  "friday": { "shifts": [] },
  "saturday": { "shifts": [] },
  "sunday": { "shifts": [] }
}"#;

fn cli(db: Option<&Path>) -> Command {
    let mut cmd = Command::new(cargo_bin!("cli"));
    cmd.env_remove("SHIFT_PLANNER_DB")
        .env_remove("SHIFT_PLANNER_WEEK_MATH")
        .env_remove("SHIFT_PLANNER_FAN_OUT")
        .env_remove("SHIFT_PLANNER_SEED");
    if let Some(db) = db {
        cmd.env("SHIFT_PLANNER_DB", db);
    }
    cmd
}

fn run_cli(script: &str) -> assert_cmd::assert::Assert {
    cli(None).write_stdin(script.to_string()).assert()
}

fn template_file(dir: &TempDir) -> String {
    let path = dir.path().join("template.json");
    std::fs::write(&path, TEMPLATE).expect("write template");
    path.display().to_string()
}

#[test]
fn cli_reports_missing_default_timetable() {
    run_cli("timetable 2024-03-04 2024-03-10\nquit\n")
        .success()
        .stdout(str_contains("Default timetable not yet set."));
}

#[test]
fn cli_expands_loaded_template() {
    let dir = TempDir::new().expect("temp dir");
    let script = format!(
        "template load {}\ntimetable 2024-03-04 2024-03-10\ndays 2024-03-04 2024-03-05 csv\nquit\n",
        template_file(&dir)
    );
    let assert = run_cli(&script).success();
    let output = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(output.contains("Default timetable updated."), "{output}");
    assert!(output.contains("\"firstWeekDate\": \"2024-03-04\""), "{output}");
    assert!(output.contains("\"weekStr\": \"Week 10\""), "{output}");
    assert!(output.contains("2024-03-04,monday,09:00,17:00,2"), "{output}");
}

#[test]
fn cli_keeps_running_after_bad_input() {
    let assert = run_cli("timetable 2024-03-10 2024-03-04\ntimetable yesterday today\nfrobnicate\nhelp\n")
        .success();
    let output = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(output.contains("Rejected:"), "{output}");
    assert!(output.contains("Invalid date 'yesterday'"), "{output}");
    assert!(output.contains("Unknown command 'frobnicate'"), "{output}");
    assert!(output.contains("Commands:"), "{output}");
}

#[test]
fn cli_manages_employees_and_reconciles_weeks() {
    let dir = TempDir::new().expect("temp dir");
    let script = format!(
        "template load {}\nemployee add ana@example.com Ana Lopez\nemployee list\nschedule reconcile 2024-03-06\nemployee remove ana@example.com\nquit\n",
        template_file(&dir)
    );
    let assert = run_cli(&script).success();
    let output = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(output.contains("Created employee ana@example.com with"), "{output}");
    assert!(output.contains("Ana Lopez"), "{output}");
    assert!(output.contains("Total shortfall: 2"), "{output}");
    assert!(output.contains("Removed employee ana@example.com."), "{output}");
}

#[cfg(feature = "sqlite")]
#[test]
fn cli_sqlite_database_survives_restart() {
    let dir = TempDir::new().expect("temp dir");
    let db = dir.path().join("planner.db");
    cli(Some(&db))
        .write_stdin(format!("template load {}\nquit\n", template_file(&dir)))
        .assert()
        .success()
        .stdout(str_contains("Default timetable updated."));

    cli(Some(&db))
        .write_stdin("template show\nquit\n")
        .assert()
        .success()
        .stdout(str_contains("\"requiredEmployees\": 2"));
}
