//! Interactive downlink console.
//!
//! Prompts for a port and a hex payload, prints the decoded command and its
//! re-encoding, and repeats until the input ends.

use std::io::{BufRead, Write};

use tracing::info;

use crate::hexdata::parse_hex;
use crate::translate::translate_downlink;
use crate::Result;

/// Port prompt.
pub const PORT_PROMPT: &str = "Enter port (decimal): ";
/// Payload prompt.
pub const DATA_PROMPT: &str = "Enter downlink (hex format): ";

/// Run the console over arbitrary input and output streams.
///
/// Transcoding errors are printed and the loop continues. Only I/O errors
/// end it early.
pub fn run_console<R: BufRead, W: Write>(mut input: R, output: &mut W) -> Result<()> {
    info!("Console started");
    let mut rounds = 0usize;

    loop {
        let Some(port) = prompt(&mut input, output, PORT_PROMPT)? else {
            break;
        };
        let Some(data) = prompt(&mut input, output, DATA_PROMPT)? else {
            break;
        };
        rounds += 1;

        let port = match port.trim().parse::<u16>() {
            Ok(port) => port,
            Err(_) => {
                writeln!(output, "Invalid port: {}", port.trim())?;
                continue;
            }
        };
        let bytes = match parse_hex(&data) {
            Ok(bytes) => bytes,
            Err(e) => {
                writeln!(output, "{}", e)?;
                continue;
            }
        };

        match translate_downlink(port, &bytes) {
            Ok(t) => {
                writeln!(output, "Decoded:       {}", serde_json::to_string(&t.decoded)?)?;
                writeln!(output, "Encoded again: {}", serde_json::to_string(&t.encoded)?)?;
                for warning in &t.warnings {
                    writeln!(output, "WARN: {}", warning)?;
                }
            }
            Err(e) => writeln!(output, "{}", e)?,
        }
    }

    info!(rounds, "Console finished");
    Ok(())
}

/// Write a prompt and read one line. `None` at end of input.
fn prompt<R: BufRead, W: Write>(input: &mut R, output: &mut W, text: &str) -> Result<Option<String>> {
    write!(output, "{}", text)?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        writeln!(output)?;
        return Ok(None);
    }
    Ok(Some(line))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(input: &str) -> String {
        let mut out = Vec::new();
        run_console(input.as_bytes(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_single_round() {
        let out = run("11\n010200000003\n");
        assert!(out.contains(r#"Decoded:       {"cmd":"Set setting","BASE_POLL_INTERVAL""#));
        assert!(out.contains(r#"Encoded again: {"data":"010200000003","port":11}"#));
        assert!(!out.contains("WARN"));
    }

    #[test]
    fn test_upper_case_hex_is_not_a_difference() {
        let out = run("10\n08003C\n");
        assert!(out.contains(r#""minutes":60"#));
        assert!(!out.contains("WARN"));
    }

    #[test]
    fn test_errors_keep_looping() {
        let out = run("999\n01\nabc\n01\n11\n0201\n");
        assert!(out.contains("Unrecognized downlink"));
        assert!(out.contains("Invalid port: abc"));
        assert!(out.contains(r#""cmd":"Get setting""#));
        assert_eq!(out.matches(PORT_PROMPT).count(), 4);
    }

    #[test]
    fn test_warns_on_lossy_round_trip() {
        let out = run("11\n01020000000102000000ff\n");
        assert!(out.contains("WARN: Encode result is different from decode result"));
    }
}
