//! Smoke tests for the command-line surface. Only offline paths are
//! exercised; the remote protocol is covered in `remote_contract.rs`.

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn split_prints_numbered_sentences() {
    Command::cargo_bin("writeaid")
        .unwrap()
        .args(["split", "First one. Second one! Third?"])
        .assert()
        .success()
        .stdout(predicate::str::contains("3 sentence(s):"))
        .stdout(predicate::str::contains("1. First one."))
        .stdout(predicate::str::contains("3. Third?"));
}

#[test]
fn split_emits_json_when_asked() {
    Command::cargo_bin("writeaid")
        .unwrap()
        .args(["split", "--json", "Only one sentence here."])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"sentence_count\": 1"));
}

#[test]
fn split_rejects_empty_input() {
    Command::cargo_bin("writeaid")
        .unwrap()
        .args(["split", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("paragraph"));
}

#[test]
fn run_rejects_a_missing_paragraph() {
    Command::cargo_bin("writeaid")
        .unwrap()
        .args(["run", "--paragraph", ""])
        .assert()
        .failure()
        .stderr(predicate::str::contains("paragraph"));
}

#[test]
fn run_rejects_reprocessing_with_parallel_dispatch() {
    Command::cargo_bin("writeaid")
        .unwrap()
        .args([
            "run",
            "--paragraph",
            "One. Two.",
            "--dispatch",
            "parallel",
            "--rounds",
            "1",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("rounds"));
}

#[test]
fn run_rejects_an_unknown_direction() {
    Command::cargo_bin("writeaid")
        .unwrap()
        .args(["run", "--paragraph", "One.", "--direction", "sideways"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("direction"));
}

#[test]
fn schema_describes_the_config_shape() {
    Command::cargo_bin("writeaid")
        .unwrap()
        .arg("schema")
        .assert()
        .success()
        .stdout(predicate::str::contains("backoff_ms"))
        .stdout(predicate::str::contains("concurrency_limit"));
}
