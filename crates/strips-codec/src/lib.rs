//! Strips LoRaWAN Payload Transcoder
//!
//! This crate converts the application-layer payloads exchanged with Strips
//! sensors into structured commands and reports, and converts structured
//! commands back into the exact bytes the firmware expects.
//!
//! # Protocol Overview
//!
//! Payloads travel on numbered LoRaWAN ports:
//!
//! - **Downlinks** (server → device): the first byte selects the command
//!   within the port, see [`decode_downlink`] and [`encode_downlink`]
//! - **Uplinks** (device → server): a sequence of `(channel, value)` tuples,
//!   see [`decode_uplink`]
//!
//! All lookups go through static registries ([`SETTINGS`], [`REPORTS`],
//! [`PROFILES`], [`PORT_COMMANDS`]). Nothing here performs I/O or keeps
//! state between calls.
//!
//! # Example
//!
//! ```rust
//! use strips_codec::{decode_downlink, encode_downlink, DownlinkCommand};
//!
//! let cmd = decode_downlink(11, &[0x01, 0x02, 0x00, 0x00, 0x00, 0x03]).unwrap();
//! assert!(matches!(cmd, DownlinkCommand::SetSetting(_)));
//!
//! let encoded = encode_downlink(&cmd).unwrap();
//! assert_eq!((encoded.port, encoded.data.as_str()), (11, "010200000003"));
//! ```

mod bitmask;
mod constants;
mod downlink;
mod error;
mod port_commands;
mod primitives;
mod profiles;
mod reports;
mod settings;
mod uplink;

pub use bitmask::*;
pub use constants::*;
pub use downlink::*;
pub use error::*;
pub use port_commands::*;
pub use primitives::*;
pub use profiles::*;
pub use reports::*;
pub use settings::*;
pub use uplink::*;
