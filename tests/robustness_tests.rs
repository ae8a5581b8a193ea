use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

mod common;

#[test]
fn test_malformed_rows_are_skipped() {
    let file = common::script(&[
        "fund, p1, , 10",
        "explode, p1, , 10",
        "fund, p1, , not_a_number",
        "fund, p1, , 5",
        "balance, p1, ,",
    ]);

    let mut cmd = Command::new(cargo_bin!("tourney"));
    cmd.arg(file.path());

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Error reading command"))
        .stdout(predicate::str::contains(
            r#"{"action":"balance","status":200,"result":{"id":"p1","points":15}}"#,
        ));
}

#[test]
fn test_invalid_input_is_rejected_without_effect() {
    let file = common::script(&[
        "fund, p1, , -5",
        "fund, , , 5",
        "announce, , t1, 0",
        "join, p1, ,",
        "balance, p1, ,",
        "results, , t1,",
    ]);

    let mut cmd = Command::new(cargo_bin!("tourney"));
    cmd.arg(file.path());

    let output = cmd.output().expect("Failed to execute command");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let statuses: Vec<u64> = stdout
        .lines()
        .map(|line| {
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            value["status"].as_u64().unwrap()
        })
        .collect();
    assert_eq!(statuses, vec![400, 400, 400, 400, 404, 404]);
}
