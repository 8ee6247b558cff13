//! End-to-end CLI smoke tests over a temp workspace.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn stride(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("stride").expect("binary builds");
    cmd.current_dir(dir.path());
    cmd.env_remove("STRIDE_DIR");
    cmd
}

#[test]
fn init_add_list_done_flow() {
    let dir = TempDir::new().unwrap();

    stride(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("initialized stride workspace"));

    stride(&dir)
        .args(["add", "Ship release", "--priority", "high"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ship release"));

    stride(&dir)
        .arg("ls")
        .assert()
        .success()
        .stdout(predicate::str::contains("#1"))
        .stdout(predicate::str::contains("Ship release"));

    stride(&dir)
        .args(["done", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[x]"))
        .stdout(predicate::str::contains("level"));

    // Completed tasks drop out of the default listing.
    stride(&dir)
        .arg("ls")
        .assert()
        .success()
        .stdout(predicate::str::contains("no tasks"));

    stride(&dir)
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Level"))
        .stdout(predicate::str::contains("First Steps"));
}

#[test]
fn dep_validation_errors_are_specific() {
    let dir = TempDir::new().unwrap();
    stride(&dir).arg("init").assert().success();
    stride(&dir).args(["add", "A"]).assert().success();

    stride(&dir)
        .args(["dep", "add", "1", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot depend on itself"));
}

#[test]
fn activity_shows_log_rows() {
    let dir = TempDir::new().unwrap();
    stride(&dir).arg("init").assert().success();
    stride(&dir).args(["add", "Tracked"]).assert().success();

    stride(&dir)
        .arg("activity")
        .assert()
        .success()
        .stdout(predicate::str::contains("created"));
}

#[test]
fn json_output_is_parseable() {
    let dir = TempDir::new().unwrap();
    stride(&dir).arg("init").assert().success();
    stride(&dir)
        .args(["add", "Machine readable", "--json"])
        .assert()
        .success()
        .stdout(predicate::function(|out: &str| {
            serde_json::from_str::<serde_json::Value>(out).is_ok()
        }));
}

#[test]
fn missing_workspace_is_a_clear_error() {
    let dir = TempDir::new().unwrap();
    stride(&dir)
        .arg("ls")
        .assert()
        .failure()
        .stderr(predicate::str::contains("stride init"));
}
