//! Protocol constants
//!
//! Port numbers, command codes and framing values used by Strips firmware
//! on the LoRaWAN application layer.

// ============================================================================
// Downlink Ports
// ============================================================================

/// Port carrying the history retrieval command.
pub const PORT_HISTORY_REQUEST: u16 = 2;
/// Port carrying device-wide commands (profile, unjoin).
pub const PORT_DEVICE_COMMAND: u16 = 10;
/// Port carrying setting reads and writes.
pub const PORT_SETTINGS: u16 = 11;
/// LoRaWAN certification test port.
pub const PORT_COMPLIANCE_TEST: u16 = 224;

// ============================================================================
// Downlink Command Codes
// ============================================================================

/// Write one or more settings (port 11).
pub const CMD_SET_SETTING: u8 = 1;
/// Read one or more settings (port 11).
pub const CMD_GET_SETTING: u8 = 2;
/// Request a range of history items (port 2).
pub const CMD_GET_HISTORY: u8 = 1;
/// Select a behaviour profile (port 10).
pub const CMD_SET_PROFILE: u8 = 1;
/// Leave the network for a number of minutes (port 10).
pub const CMD_UNJOIN: u8 = 8;
/// Leave compliance test mode (port 224).
pub const CMD_END_COMPLIANCE_TEST: u8 = 6;

// ============================================================================
// Uplink Ports
// ============================================================================

/// Port carrying current report values.
pub const UPLINK_PORT_DIRECT: u16 = 1;
/// Port carrying history backlog items.
pub const UPLINK_PORT_HISTORY: u16 = 2;

// ============================================================================
// Framing
// ============================================================================

/// Uplink tuple header bit marking a historical item.
pub const HISTORY_ITEM_FLAG: u8 = 0x80;
/// Uplink tuple header bits holding the channel id.
pub const CHANNEL_MASK: u8 = 0x7F;
/// Size of one `(id, value)` group in a Set Setting payload.
pub const SETTING_GROUP_SIZE: usize = 1 + SETTING_VALUE_SIZE;
/// Size of a setting value on the wire.
pub const SETTING_VALUE_SIZE: usize = 4;
/// Separator used in the textual form of bitmask settings.
pub const MASK_SEPARATOR: char = '|';
