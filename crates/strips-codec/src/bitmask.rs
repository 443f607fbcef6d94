//! Named bit-set codecs.
//!
//! Bitmask settings travel as 4-byte integers but are presented as a
//! `|`-separated list of names. Two tables are supported:
//!
//! - the report registry, indexed by `report_bit`
//! - the sensor configuration bits
//!
//! The two encoders differ on unknown tokens: an unknown report name is an
//! error, an unknown configuration token is dropped.

use crate::constants::MASK_SEPARATOR;
use crate::reports::{report_by_name, REPORTS};
use crate::{StripsError, StripsResult};

/// Sensor configuration bits and their names.
pub const SENSOR_CONFIG_BITS: [(&str, u32); 2] = [
    ("INVERT_DOOR", 1 << 0),
    ("HIGH_POWER_PROXIMITY", 1 << 1),
];

/// Bits of the reports-enabled mask that name a report.
pub fn known_report_bits() -> u32 {
    REPORTS.iter().fold(0, |mask, r| mask | (1u32 << r.report_bit))
}

/// Bits of the sensor configuration mask that have a name.
pub fn known_sensor_config_bits() -> u32 {
    SENSOR_CONFIG_BITS.iter().fold(0, |mask, (_, bit)| mask | bit)
}

fn join_names<'a>(names: impl Iterator<Item = &'a str>) -> String {
    let mut out = String::new();
    for name in names {
        if !out.is_empty() {
            out.push(MASK_SEPARATOR);
        }
        out.push_str(name);
    }
    out
}

/// Render a reports-enabled mask as report names in registry order.
pub fn decode_reports_mask(mask: u32) -> String {
    join_names(
        REPORTS
            .iter()
            .filter(|r| mask & (1u32 << r.report_bit) != 0)
            .map(|r| r.name),
    )
}

/// Parse report names into a reports-enabled mask.
///
/// Empty tokens are skipped, so `""` encodes as `0`.
pub fn encode_reports_mask(names: &str) -> StripsResult<u32> {
    let mut mask = 0u32;
    for token in names.split(MASK_SEPARATOR).filter(|t| !t.is_empty()) {
        let report =
            report_by_name(token).ok_or_else(|| StripsError::UnknownReport(token.to_string()))?;
        mask |= 1u32 << report.report_bit;
    }
    Ok(mask)
}

/// Render a sensor configuration mask as bit names.
pub fn decode_sensor_config(mask: u32) -> String {
    join_names(
        SENSOR_CONFIG_BITS
            .iter()
            .filter(|(_, bit)| mask & bit != 0)
            .map(|(name, _)| *name),
    )
}

/// Parse sensor configuration bit names. Unknown tokens are ignored.
pub fn encode_sensor_config(names: &str) -> u32 {
    names
        .split(MASK_SEPARATOR)
        .filter_map(|token| {
            SENSOR_CONFIG_BITS
                .iter()
                .find(|(name, _)| *name == token)
                .map(|(_, bit)| *bit)
        })
        .fold(0, |mask, bit| mask | bit)
}
