#![cfg(feature = "storage-rocksdb")]

use assert_cmd::cargo_bin;
use std::process::Command;
use tempfile::tempdir;

mod common;

#[test]
fn test_rocksdb_persistence_recovery() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("test_db");

    // 1. First run: fund a player and open a tournament
    let script1 = common::script(&["fund, p1, , 100", "announce, , t1, 40", "join, p1, t1,"]);

    let mut cmd1 = Command::new(cargo_bin!("tourney"));
    cmd1.arg(script1.path()).arg("--db-path").arg(&db_path);

    let output1 = cmd1.output().expect("Failed to execute command");
    assert!(output1.status.success());

    // 2. Second run: settle the tournament using the same DB path
    let script2 = common::script(&["results, , t1,", "balance, p1, ,"]);

    let mut cmd2 = Command::new(cargo_bin!("tourney"));
    cmd2.arg(script2.path()).arg("--db-path").arg(&db_path);

    let output2 = cmd2.output().expect("Failed to execute command");
    assert!(output2.status.success());
    let stdout2 = String::from_utf8_lossy(&output2.stdout);

    // Recovered 60 after the deposit, then won back the 40 pool
    assert!(stdout2.contains(r#"{"id":"p1","points":60,"prize":40}"#));
    assert!(stdout2.contains(r#"{"id":"p1","points":100}"#));
}
