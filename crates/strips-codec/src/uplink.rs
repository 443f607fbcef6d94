//! Uplink transcoding.
//!
//! Uplinks are a sequence of self-describing tuples:
//!
//! ```text
//! +---+------------+----------------------------+
//! | H | channel(7) | value (codec-defined size) |  ... repeated
//! +---+------------+----------------------------+
//! ```
//!
//! `H` marks an item replayed from the device history. The channel selects
//! the report, and the report's codec gives the value size.

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::constants::{CHANNEL_MASK, HISTORY_ITEM_FLAG, UPLINK_PORT_DIRECT, UPLINK_PORT_HISTORY};
use crate::primitives::{read_u8, ReportValue};
use crate::reports::{report_by_channel, ReportDescriptor};
use crate::{StripsError, StripsResult};

/// Ports that carry uplink reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum UplinkPort {
    /// Current values.
    Direct,
    /// History backlog.
    History,
}

impl UplinkPort {
    /// Map a LoRaWAN port to an uplink port.
    pub fn from_port(port: u16) -> StripsResult<Self> {
        match port {
            UPLINK_PORT_DIRECT => Ok(UplinkPort::Direct),
            UPLINK_PORT_HISTORY => Ok(UplinkPort::History),
            other => Err(StripsError::NoDecoderForPort(other)),
        }
    }

    /// LoRaWAN port number.
    pub fn port(&self) -> u16 {
        match self {
            UplinkPort::Direct => UPLINK_PORT_DIRECT,
            UplinkPort::History => UPLINK_PORT_HISTORY,
        }
    }
}

/// One decoded tuple.
#[derive(Debug, Clone, PartialEq)]
pub struct UplinkItem {
    /// Report carried by the tuple.
    pub report: &'static ReportDescriptor,
    /// Whether the history flag was set.
    pub historical: bool,
    /// Decoded value.
    pub value: ReportValue,
}

impl Serialize for UplinkItem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(5))?;
        map.serialize_entry("report", self.report.name)?;
        map.serialize_entry("channel", &self.report.channel)?;
        map.serialize_entry("historical", &self.historical)?;
        map.serialize_entry("value", &self.value)?;
        map.serialize_entry("unit", self.report.unit)?;
        map.end()
    }
}

/// A decoded uplink.
///
/// Serializes as a flat object: one member per report name holding its
/// latest value, then `historyItemCount`, `timestamp` and `items`.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSet {
    /// Port the uplink arrived on.
    pub port: UplinkPort,
    /// Every tuple in wire order.
    pub items: Vec<UplinkItem>,
    /// Number of tuples with the history flag set.
    pub history_item_count: usize,
    /// When the uplink was decoded.
    pub timestamp: DateTime<Utc>,
}

impl ReportSet {
    /// Latest value of a report, by name.
    pub fn get(&self, name: &str) -> Option<&ReportValue> {
        self.items
            .iter()
            .rev()
            .find(|item| item.report.name == name)
            .map(|item| &item.value)
    }

    /// Report names with their latest values, in first-seen order.
    pub fn reports(&self) -> Vec<(&'static str, &ReportValue)> {
        let mut out: Vec<(&'static str, &ReportValue)> = Vec::with_capacity(self.items.len());
        for item in &self.items {
            match out.iter_mut().find(|(name, _)| *name == item.report.name) {
                Some(slot) => slot.1 = &item.value,
                None => out.push((item.report.name, &item.value)),
            }
        }
        out
    }

    /// Whether the uplink carried no tuples.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Serialize for ReportSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (name, value) in self.reports() {
            map.serialize_entry(name, value)?;
        }
        map.serialize_entry("historyItemCount", &self.history_item_count)?;
        map.serialize_entry("timestamp", &self.timestamp)?;
        map.serialize_entry("items", &self.items)?;
        map.end()
    }
}

/// Decode an uplink received on `port`, stamped with the current time.
pub fn decode_uplink(port: u16, bytes: &[u8]) -> StripsResult<ReportSet> {
    decode_uplink_at(port, bytes, Utc::now())
}

/// Decode an uplink received on `port` with an explicit timestamp.
pub fn decode_uplink_at(
    port: u16,
    bytes: &[u8],
    timestamp: DateTime<Utc>,
) -> StripsResult<ReportSet> {
    let port = UplinkPort::from_port(port)?;

    let mut items = Vec::new();
    let mut history_item_count = 0;
    let mut pos = 0;
    while pos < bytes.len() {
        let offset = pos;
        let (header, next) = read_u8(bytes, pos);
        let historical = header & HISTORY_ITEM_FLAG != 0;
        let channel = header & CHANNEL_MASK;
        let report = report_by_channel(channel).ok_or(StripsError::UnknownChannel(channel))?;

        let needed = report.codec.size(bytes, next);
        let available = bytes.len() - next;
        if needed > available {
            return Err(StripsError::IncompleteData {
                channel,
                offset,
                needed,
                available,
            });
        }

        let (value, next) = report.codec.decode(bytes, next);
        if historical {
            history_item_count += 1;
        }
        items.push(UplinkItem {
            report,
            historical,
            value,
        });
        pos = next;
    }

    Ok(ReportSet {
        port,
        items,
        history_item_count,
        timestamp,
    })
}

/// Encode one tuple: the header byte followed by the value bytes.
pub fn encode_uplink_item(
    report: &ReportDescriptor,
    value: &ReportValue,
    historical: bool,
) -> StripsResult<Vec<u8>> {
    let value = report.codec.encode(value)?;
    let mut buf = Vec::with_capacity(1 + value.len());
    let flag = if historical { HISTORY_ITEM_FLAG } else { 0 };
    buf.push(report.channel | flag);
    buf.extend_from_slice(&value);
    Ok(buf)
}
