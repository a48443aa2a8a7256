#![forbid(unsafe_code)]
use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::{tempdir, NamedTempFile};

fn sample_table() -> NamedTempFile {
    let mut f = NamedTempFile::new().unwrap();
    f.write_all(
        b"Name,Group,1,5-1,5-2\n\
          alice,0,0,0,0\n\
          bob,0,0,0,0\n\
          carol,1,0,0,0\n",
    )
    .unwrap();
    f.flush().unwrap();
    f
}

#[test]
fn schedule_prints_roster_and_summary() {
    let input = sample_table();
    Command::cargo_bin("toban-cli")
        .unwrap()
        .args([
            "schedule",
            "--input",
            input.path().to_str().unwrap(),
            "--year",
            "2025",
            "--month",
            "6",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Shift,Duty_G0,Duty_G1,Oncall_G0"))
        .stdout(predicate::str::contains("Name,Group,Duty,Oncall,Total"))
        .stdout(predicate::str::contains("carol,1,2,0,2"));
}

#[test]
fn schedule_then_check_round_trips_through_json() {
    let input = sample_table();
    let dir = tempdir().unwrap();
    let roster = dir.path().join("roster.json");

    Command::cargo_bin("toban-cli")
        .unwrap()
        .args([
            "schedule",
            "--input",
            input.path().to_str().unwrap(),
            "--year",
            "2025",
            "--month",
            "6",
            "--strategy",
            "exact-feasible",
            "--out-json",
            roster.to_str().unwrap(),
        ])
        .assert()
        .success();

    Command::cargo_bin("toban-cli")
        .unwrap()
        .args([
            "check",
            "--input",
            input.path().to_str().unwrap(),
            "--year",
            "2025",
            "--month",
            "6",
            "--roster",
            roster.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("OK"));

    Command::cargo_bin("toban-cli")
        .unwrap()
        .args(["calendar", "--roster", roster.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Sun"));
}

#[test]
fn unknown_strategy_is_an_error() {
    let input = sample_table();
    Command::cargo_bin("toban-cli")
        .unwrap()
        .args([
            "schedule",
            "--input",
            input.path().to_str().unwrap(),
            "--year",
            "2025",
            "--month",
            "6",
            "--strategy",
            "brute-force",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("strategy"));
}
