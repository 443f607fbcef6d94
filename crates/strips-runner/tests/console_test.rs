//! Integration tests for the interactive console.

use strips_runner::console::{DATA_PROMPT, PORT_PROMPT};
use strips_runner::run_console;

fn run(input: &str) -> String {
    let mut out = Vec::new();
    run_console(input.as_bytes(), &mut out).expect("console should not fail on in-memory IO");
    String::from_utf8(out).unwrap()
}

#[test]
fn test_every_command_round_trips() {
    let input = "11\n0102000003e8\n11\n020203\n2\n0100010002\n10\n0105\n10\n08001e\n224\n06\n";
    let out = run(input);

    for cmd in [
        "Set setting",
        "Get setting",
        "Get history",
        "Set profile",
        "Unjoin",
        "End compliance test",
    ] {
        assert!(out.contains(&format!(r#""cmd":"{}""#, cmd)), "missing {}", cmd);
    }
    assert!(!out.contains("WARN"));
    assert_eq!(out.matches(DATA_PROMPT).count(), 6);
}

#[test]
fn test_empty_input() {
    let out = run("");
    assert!(out.starts_with(PORT_PROMPT));
    assert!(!out.contains(DATA_PROMPT));
}

#[test]
fn test_bad_hex_reported() {
    let out = run("11\n0102000\n");
    assert!(out.contains("Invalid hex data"));
}

#[test]
fn test_not_enough_data() {
    let out = run("11\n\n");
    assert!(out.contains("Not enough data"));
}
