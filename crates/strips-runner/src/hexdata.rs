//! Hex payload parsing.

use crate::{Result, RunnerError};

/// Parse a payload given as hex digits.
///
/// Surrounding whitespace is ignored. Upper and lower case digits are both
/// accepted; the digit count must be even.
pub fn parse_hex(text: &str) -> Result<Vec<u8>> {
    let digits = text.trim();
    if digits.len() % 2 != 0 {
        return Err(RunnerError::invalid_hex(format!(
            "odd number of digits ({})",
            digits.len()
        )));
    }
    hex::decode(digits).map_err(|e| RunnerError::invalid_hex(e.to_string()))
}
