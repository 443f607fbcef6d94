//! Error types for strips-runner.

use strips_codec::StripsError;
use thiserror::Error;

/// Errors raised by the command-line tools and the translate service.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// I/O failure on a socket, file or terminal.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The transcoder rejected the payload or command.
    #[error(transparent)]
    Strips(#[from] StripsError),

    /// Structured input or output could not be (de)serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Payload text is not an even-length string of hex digits.
    #[error("Invalid hex data: {reason}")]
    InvalidHex {
        /// What is wrong with the input.
        reason: String,
    },

    /// The listen address could not be parsed.
    #[error("Invalid listen address: {0}")]
    InvalidAddress(String),
}

impl RunnerError {
    /// Create an invalid hex error.
    pub fn invalid_hex(reason: impl Into<String>) -> Self {
        RunnerError::InvalidHex {
            reason: reason.into(),
        }
    }
}

/// Result type alias for runner operations.
pub type Result<T> = std::result::Result<T, RunnerError>;
