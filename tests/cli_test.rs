use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

mod common;

#[test]
fn test_cli_end_to_end() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin!());
    cmd.arg("tests/fixtures/scenario.csv");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(
            r#"{"action":"fund","status":200,"result":{"id":"p1","points":100}}"#,
        ))
        .stdout(predicate::str::contains(
            r#"{"action":"join","status":422,"error":{"code":"insufficientBalanceError""#,
        ))
        .stdout(predicate::str::contains(
            r#"{"action":"results","status":200,"result":{"winners":[{"id":"p1","points":50,"prize":50}]}}"#,
        ))
        .stdout(predicate::str::contains(
            r#"{"action":"balance","status":200,"result":{"id":"p1","points":100}}"#,
        ));

    Ok(())
}

#[test]
fn test_cli_document_backend_matches() {
    let mut cmd = Command::new(cargo_bin!("tourney"));
    cmd.arg("tests/fixtures/scenario.csv")
        .arg("--backend")
        .arg("document")
        .arg("--ledger-strategy")
        .arg("log");

    cmd.assert().success().stdout(predicate::str::contains(
        r#"{"action":"balance","status":200,"result":{"id":"p1","points":100}}"#,
    ));
}

#[test]
fn test_cli_empty_tournament() {
    let file = common::script(&["announce, , t3, 10", "results, , t3,", "results, , t3,"]);

    let mut cmd = Command::new(cargo_bin!("tourney"));
    cmd.arg(file.path());

    let output = cmd.output().expect("Failed to execute command");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let results: Vec<&str> = stdout
        .lines()
        .filter(|line| line.contains(r#""action":"results""#))
        .collect();
    assert_eq!(results.len(), 2);
    for line in results {
        assert!(line.contains(r#""status":409"#));
        assert!(line.contains("noneParticipantsError"));
    }
}

#[test]
fn test_cli_backend_from_environment() {
    let file = common::script(&["fund, p1, , 5", "take, p1, , 6"]);

    let mut cmd = Command::new(cargo_bin!("tourney"));
    cmd.arg(file.path()).env("TOURNEY_BACKEND", "document");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(r#""status":422"#));
}

#[test]
fn test_cli_missing_input_fails() {
    let mut cmd = Command::new(cargo_bin!("tourney"));
    cmd.arg("tests/fixtures/does_not_exist.csv");

    cmd.assert().failure();
}
