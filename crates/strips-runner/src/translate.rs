//! Decode plus re-encode checks shared by the CLI, console and service.

use serde::Serialize;
use strips_codec::{decode_downlink, encode_downlink, DownlinkCommand, EncodedDownlink, StripsResult};
use tracing::{debug, warn};

/// Re-encoding produced different bytes.
pub const WARN_DATA_DIFFERS: &str = "Encode result is different from decode result";
/// Decoding the re-encoded payload and encoding it again produced different bytes.
pub const WARN_REENCODE_DIFFERS: &str = "Re-decoded and encoded data differs";

/// A decoded downlink together with its re-encoding.
#[derive(Debug, Clone, Serialize)]
pub struct DownlinkTranslation {
    /// Structured command.
    pub decoded: DownlinkCommand,
    /// The command encoded again.
    pub encoded: EncodedDownlink,
    /// Round-trip discrepancies, empty when the bytes reproduce exactly.
    #[serde(rename = "roundtrip")]
    pub warnings: Vec<String>,
}

impl DownlinkTranslation {
    /// Whether the round trip reproduced the input.
    pub fn is_exact(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Decode a downlink, encode it again and check both directions agree.
pub fn translate_downlink(port: u16, bytes: &[u8]) -> StripsResult<DownlinkTranslation> {
    let decoded = decode_downlink(port, bytes)?;
    let encoded = encode_downlink(&decoded)?;
    debug!(port, data = %encoded.data, cmd = decoded.name(), "Downlink decoded");

    let mut warnings = Vec::new();
    if encoded.payload != bytes {
        warnings.push(WARN_DATA_DIFFERS.to_string());
    }
    if encoded.port != port {
        warnings.push(format!("Encoded port {} differs from port.", encoded.port));
    }

    let again = encode_downlink(&decode_downlink(encoded.port, &encoded.payload)?)?;
    if again.payload != encoded.payload {
        warnings.push(WARN_REENCODE_DIFFERS.to_string());
    }

    for warning in &warnings {
        warn!(port, input = %hex::encode(bytes), "{}", warning);
    }

    Ok(DownlinkTranslation {
        decoded,
        encoded,
        warnings,
    })
}
