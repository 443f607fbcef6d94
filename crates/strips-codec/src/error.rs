//! Error types for strips-codec.

use thiserror::Error;

/// Errors that can occur while transcoding a Strips payload.
///
/// Every error is terminal for the call that produced it; no partial result
/// is ever returned alongside one.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StripsError {
    /// Payload too short to contain even a command byte.
    #[error("Not enough data")]
    NotEnoughData,

    /// No port-command entry matches the `(port, cmd)` pair.
    #[error("Unrecognized downlink: port {port}, command 0x{cmd:02x}")]
    UnrecognizedDownlink {
        /// LoRaWAN port the downlink arrived on.
        port: u16,
        /// First payload byte.
        cmd: u8,
    },

    /// Uplink tuple header names a channel with no report.
    #[error("Unknown channel: {0}")]
    UnknownChannel(u8),

    /// Setting id with no registry entry.
    #[error("Unknown setting: {0}")]
    UnknownSetting(u8),

    /// Setting id repeated in a Get Setting payload.
    #[error("Duplicate setting: {0}")]
    DuplicateSetting(u8),

    /// Profile id with no registry entry.
    #[error("Unknown profile: {0}")]
    UnknownProfile(u8),

    /// Profile key with no registry entry.
    #[error("Unknown profile: {0}")]
    UnknownProfileName(String),

    /// Report name with no registry entry.
    #[error("Invalid report id: {0}")]
    UnknownReport(String),

    /// Payload length differs from the fixed size a command requires.
    #[error("{command} command: Bad package size (expected {expected} bytes, got {actual})")]
    BadPackageSize {
        /// Display name of the command.
        command: &'static str,
        /// Required length of the whole packet, command byte included.
        expected: usize,
        /// Actual length of the whole packet.
        actual: usize,
    },

    /// A variable-length payload ends with an incomplete group.
    #[error("Set settings: Bad data size ({remaining} trailing bytes)")]
    BadDataSize {
        /// Bytes left over when a full group was expected.
        remaining: usize,
    },

    /// Set Setting downlink without any setting groups.
    #[error("No settings to set")]
    NoSettingsToSet,

    /// Uplink tuple claims more bytes than remain.
    #[error("Incomplete data: channel {channel} needs {needed} bytes at offset {offset}, {available} available")]
    IncompleteData {
        /// Channel of the truncated tuple.
        channel: u8,
        /// Byte offset of the tuple header.
        offset: usize,
        /// Value bytes required by the report codec.
        needed: usize,
        /// Value bytes actually present.
        available: usize,
    },

    /// No uplink decoder is registered for the port.
    #[error("No function for decoding uplinks on port {0}")]
    NoDecoderForPort(u16),

    /// Structured input carries no command reference.
    #[error("Bad object for encode, null or missing cmd.")]
    MissingCommand,

    /// Structured input names a command that is not registered.
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// Structured input lacks a field its command requires.
    #[error("{command} requires field '{field}'")]
    MissingRequiredField {
        /// Display name of the command.
        command: &'static str,
        /// Name of the missing field.
        field: String,
    },

    /// A structured value cannot be converted to its wire form.
    #[error("Invalid value for {field}: {value}")]
    InvalidValue {
        /// Field or setting the value belongs to.
        field: String,
        /// The offending value, as text.
        value: String,
    },
}

impl StripsError {
    /// Create an invalid value error.
    pub fn invalid_value(field: impl Into<String>, value: impl ToString) -> Self {
        StripsError::InvalidValue {
            field: field.into(),
            value: value.to_string(),
        }
    }

    /// Create a missing field error.
    pub fn missing_field(command: &'static str, field: impl Into<String>) -> Self {
        StripsError::MissingRequiredField {
            command,
            field: field.into(),
        }
    }
}

/// Result type alias for transcoding operations.
pub type StripsResult<T> = Result<T, StripsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StripsError::UnrecognizedDownlink { port: 999, cmd: 1 };
        assert!(err.to_string().contains("port 999"));

        let err = StripsError::BadPackageSize {
            command: "Unjoin",
            expected: 3,
            actual: 2,
        };
        assert!(err.to_string().starts_with("Unjoin command: Bad package size"));

        let err = StripsError::invalid_value("BASE_POLL_INTERVAL", "abc");
        assert!(err.to_string().contains("BASE_POLL_INTERVAL"));
    }
}
