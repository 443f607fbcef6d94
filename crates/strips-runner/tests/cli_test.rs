//! Integration tests for the `strips` binary.

use std::process::Command;

fn strips(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_strips"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("strips binary should start")
}

#[test]
fn test_downlink_prints_translation() {
    let output = strips(&["downlink", "--port", "10", "--data", "0105"]);
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains(r#""data": "0105""#), "{}", stdout);
}

#[test]
fn test_failure_reported_once() {
    let output = strips(&["--log-format", "json", "downlink", "--port", "999", "--data", "01"]);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());

    let stderr = String::from_utf8(output.stderr).unwrap();
    assert_eq!(
        stderr.matches("Unrecognized downlink: port 999, command 0x01").count(),
        1,
        "{}",
        stderr
    );
}
