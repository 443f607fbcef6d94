//! Downlink transcoding.
//!
//! A downlink is `(port, bytes)` where `bytes[0]` selects the command within
//! the port. [`decode_downlink`] turns that into a [`DownlinkCommand`] and
//! [`encode_downlink`] produces the exact bytes back again.
//!
//! # Wire Format
//!
//! ```text
//! +---------+-------------------------------+
//! | cmd (1) | command payload (0..N bytes)  |
//! +---------+-------------------------------+
//! ```
//!
//! | Command             | Port | cmd | Payload                         |
//! |---------------------|------|-----|---------------------------------|
//! | Set setting         | 11   | 1   | N x (id u8, value u32)          |
//! | Get setting         | 11   | 2   | N x id u8                       |
//! | Get history         | 2    | 1   | first u16, last u16             |
//! | Set profile         | 10   | 1   | profile id u8                   |
//! | Unjoin              | 10   | 8   | minutes u16                     |
//! | End compliance test | 224  | 6   | (none)                          |

use bytes::BufMut;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::constants::SETTING_GROUP_SIZE;
use crate::port_commands::{command_by_name, command_by_port, PortCommand};
use crate::primitives::{read_u16, read_u32, read_u8};
use crate::profiles::{profile_by_id, profile_by_key, ProfileDescriptor};
use crate::settings::{setting_by_id, setting_by_key, SettingDescriptor};
use crate::{StripsError, StripsResult};

// ============================================================================
// Setting collections
// ============================================================================

/// One setting write: the descriptor and the rendered value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingValue {
    /// The setting being written.
    pub setting: &'static SettingDescriptor,
    /// Value in the setting codec's textual form.
    pub value: String,
}

impl SettingValue {
    /// Create a setting write.
    pub fn new(setting: &'static SettingDescriptor, value: impl Into<String>) -> Self {
        Self {
            setting,
            value: value.into(),
        }
    }

    /// Raw 4-byte value.
    pub fn raw(&self) -> StripsResult<u32> {
        self.setting.codec.encode(self.setting.key, &self.value)
    }
}

#[derive(Serialize)]
struct SettingView<'a> {
    id: u8,
    name: &'a str,
    unit: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<&'a str>,
}

impl<'a> SettingView<'a> {
    fn new(setting: &'a SettingDescriptor, value: Option<&'a str>) -> Self {
        Self {
            id: setting.id,
            name: setting.name,
            unit: setting.unit,
            value,
        }
    }
}

/// Ordered setting writes, at most one per setting.
///
/// Inserting a setting that is already present replaces its value but keeps
/// its original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingValues {
    entries: Vec<SettingValue>,
}

impl SettingValues {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a setting write.
    pub fn insert(&mut self, entry: SettingValue) {
        match self.entries.iter_mut().find(|e| e.setting.id == entry.setting.id) {
            Some(existing) => existing.value = entry.value,
            None => self.entries.push(entry),
        }
    }

    /// Look up a write by setting key.
    pub fn get(&self, key: &str) -> Option<&SettingValue> {
        self.entries.iter().find(|e| e.setting.key == key)
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &SettingValue> {
        self.entries.iter()
    }

    /// Number of settings.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no setting is present.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<SettingValue> for SettingValues {
    fn from_iter<I: IntoIterator<Item = SettingValue>>(iter: I) -> Self {
        let mut values = SettingValues::new();
        for entry in iter {
            values.insert(entry);
        }
        values
    }
}

/// Ordered setting reads, at most one per setting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingQuery {
    settings: Vec<&'static SettingDescriptor>,
}

impl SettingQuery {
    /// Create an empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a setting unless it is already queried.
    pub fn insert(&mut self, setting: &'static SettingDescriptor) {
        if !self.contains(setting.key) {
            self.settings.push(setting);
        }
    }

    /// Whether the setting with `key` is queried.
    pub fn contains(&self, key: &str) -> bool {
        self.settings.iter().any(|s| s.key == key)
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &'static SettingDescriptor> + '_ {
        self.settings.iter().copied()
    }

    /// Number of settings.
    pub fn len(&self) -> usize {
        self.settings.len()
    }

    /// Whether no setting is queried.
    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
    }
}

impl FromIterator<&'static SettingDescriptor> for SettingQuery {
    fn from_iter<I: IntoIterator<Item = &'static SettingDescriptor>>(iter: I) -> Self {
        let mut query = SettingQuery::new();
        for setting in iter {
            query.insert(setting);
        }
        query
    }
}

// ============================================================================
// Command
// ============================================================================

/// A decoded downlink command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownlinkCommand {
    /// Write settings.
    SetSetting(SettingValues),
    /// Read settings.
    GetSetting(SettingQuery),
    /// Request history items `first..=last`.
    GetHistory {
        /// First item.
        first: u16,
        /// Last item.
        last: u16,
    },
    /// Select a profile.
    SetProfile(&'static ProfileDescriptor),
    /// Leave the network.
    Unjoin {
        /// Minutes before rejoining.
        minutes: u16,
    },
    /// Leave compliance test mode.
    EndComplianceTest,
}

impl DownlinkCommand {
    /// The command tag, which selects port and command byte.
    pub fn port_command(&self) -> PortCommand {
        match self {
            DownlinkCommand::SetSetting(_) => PortCommand::SetSetting,
            DownlinkCommand::GetSetting(_) => PortCommand::GetSetting,
            DownlinkCommand::GetHistory { .. } => PortCommand::GetHistory,
            DownlinkCommand::SetProfile(_) => PortCommand::SetProfile,
            DownlinkCommand::Unjoin { .. } => PortCommand::Unjoin,
            DownlinkCommand::EndComplianceTest => PortCommand::EndComplianceTest,
        }
    }

    /// Display name of the command.
    pub fn name(&self) -> &'static str {
        self.port_command().name()
    }

    /// Parse the structured form produced by serializing a command.
    ///
    /// The `cmd` member holds the command's display name (an object with a
    /// `name` member is accepted too). Setting commands ignore members that
    /// are not setting keys.
    pub fn from_json(value: &Value) -> StripsResult<Self> {
        let object = value.as_object().ok_or(StripsError::MissingCommand)?;
        let name = object
            .get("cmd")
            .and_then(|cmd| cmd.as_str().or_else(|| cmd.get("name").and_then(Value::as_str)))
            .ok_or(StripsError::MissingCommand)?;
        let descriptor =
            command_by_name(name).ok_or_else(|| StripsError::UnknownCommand(name.to_string()))?;
        let command = descriptor.name;

        match descriptor.command {
            PortCommand::SetSetting => {
                let mut values = SettingValues::new();
                for (key, member) in object {
                    let Some(setting) = setting_by_key(key) else {
                        continue;
                    };
                    let value = member
                        .get("value")
                        .ok_or_else(|| StripsError::missing_field(command, format!("{key}.value")))?;
                    let text = match value {
                        Value::String(s) => s.clone(),
                        Value::Number(n) => n.to_string(),
                        other => return Err(StripsError::invalid_value(key.as_str(), other)),
                    };
                    setting.codec.encode(setting.key, &text)?;
                    values.insert(SettingValue::new(setting, text));
                }
                Ok(DownlinkCommand::SetSetting(values))
            }
            PortCommand::GetSetting => Ok(DownlinkCommand::GetSetting(
                object.keys().filter_map(|key| setting_by_key(key)).collect(),
            )),
            PortCommand::GetHistory => Ok(DownlinkCommand::GetHistory {
                first: u16_field(object, command, "first")?,
                last: u16_field(object, command, "last")?,
            }),
            PortCommand::SetProfile => {
                let id = object
                    .get("id")
                    .or_else(|| object.get("key"))
                    .ok_or_else(|| StripsError::missing_field(command, "id"))?;
                let profile = match id {
                    Value::String(key) => profile_by_key(key)
                        .ok_or_else(|| StripsError::UnknownProfileName(key.clone()))?,
                    other => {
                        let id = other
                            .as_u64()
                            .and_then(|v| u8::try_from(v).ok())
                            .ok_or_else(|| StripsError::invalid_value("id", other))?;
                        profile_by_id(id).ok_or(StripsError::UnknownProfile(id))?
                    }
                };
                Ok(DownlinkCommand::SetProfile(profile))
            }
            PortCommand::Unjoin => Ok(DownlinkCommand::Unjoin {
                minutes: u16_field(object, command, "minutes")?,
            }),
            PortCommand::EndComplianceTest => Ok(DownlinkCommand::EndComplianceTest),
        }
    }
}

fn u16_field(object: &Map<String, Value>, command: &'static str, field: &str) -> StripsResult<u16> {
    let value = object
        .get(field)
        .ok_or_else(|| StripsError::missing_field(command, field))?;
    value
        .as_u64()
        .and_then(|v| u16::try_from(v).ok())
        .ok_or_else(|| StripsError::invalid_value(field, value))
}

impl Serialize for DownlinkCommand {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("cmd", self.name())?;
        match self {
            DownlinkCommand::SetSetting(values) => {
                for entry in values.iter() {
                    let view = SettingView::new(entry.setting, Some(entry.value.as_str()));
                    map.serialize_entry(entry.setting.key, &view)?;
                }
            }
            DownlinkCommand::GetSetting(query) => {
                for setting in query.iter() {
                    map.serialize_entry(setting.key, &SettingView::new(setting, None))?;
                }
            }
            DownlinkCommand::GetHistory { first, last } => {
                map.serialize_entry("first", first)?;
                map.serialize_entry("last", last)?;
            }
            DownlinkCommand::SetProfile(profile) => {
                map.serialize_entry("profile", profile.name)?;
                map.serialize_entry("id", &profile.id)?;
                map.serialize_entry("key", profile.key)?;
            }
            DownlinkCommand::Unjoin { minutes } => {
                map.serialize_entry("minutes", minutes)?;
            }
            DownlinkCommand::EndComplianceTest => {}
        }
        map.end()
    }
}

// ============================================================================
// Decoding
// ============================================================================

/// Decode a downlink received on `port`.
pub fn decode_downlink(port: u16, bytes: &[u8]) -> StripsResult<DownlinkCommand> {
    let (&cmd, payload) = bytes.split_first().ok_or(StripsError::NotEnoughData)?;
    let descriptor =
        command_by_port(port, cmd).ok_or(StripsError::UnrecognizedDownlink { port, cmd })?;

    match descriptor.command {
        PortCommand::SetSetting => decode_set_setting(payload),
        PortCommand::GetSetting => decode_get_setting(payload),
        PortCommand::GetHistory => {
            expect_len(PortCommand::GetHistory, payload, 4)?;
            let (first, pos) = read_u16(payload, 0);
            let (last, _) = read_u16(payload, pos);
            Ok(DownlinkCommand::GetHistory { first, last })
        }
        PortCommand::SetProfile => {
            expect_len(PortCommand::SetProfile, payload, 1)?;
            let (id, _) = read_u8(payload, 0);
            let profile = profile_by_id(id).ok_or(StripsError::UnknownProfile(id))?;
            Ok(DownlinkCommand::SetProfile(profile))
        }
        PortCommand::Unjoin => {
            expect_len(PortCommand::Unjoin, payload, 2)?;
            let (minutes, _) = read_u16(payload, 0);
            Ok(DownlinkCommand::Unjoin { minutes })
        }
        PortCommand::EndComplianceTest => {
            expect_len(PortCommand::EndComplianceTest, payload, 0)?;
            Ok(DownlinkCommand::EndComplianceTest)
        }
    }
}

/// Sizes are reported for the whole packet, command byte included.
fn expect_len(command: PortCommand, payload: &[u8], len: usize) -> StripsResult<()> {
    if payload.len() != len {
        return Err(StripsError::BadPackageSize {
            command: command.name(),
            expected: len + 1,
            actual: payload.len() + 1,
        });
    }
    Ok(())
}

fn decode_set_setting(payload: &[u8]) -> StripsResult<DownlinkCommand> {
    if payload.is_empty() {
        return Err(StripsError::NoSettingsToSet);
    }

    let mut values = SettingValues::new();
    let mut pos = 0;
    while pos < payload.len() {
        let remaining = payload.len() - pos;
        if remaining < SETTING_GROUP_SIZE {
            return Err(StripsError::BadDataSize { remaining });
        }
        let (id, next) = read_u8(payload, pos);
        let (raw, next) = read_u32(payload, next);
        let setting = setting_by_id(id).ok_or(StripsError::UnknownSetting(id))?;
        values.insert(SettingValue::new(setting, setting.codec.decode(setting.key, raw)?));
        pos = next;
    }

    Ok(DownlinkCommand::SetSetting(values))
}

fn decode_get_setting(payload: &[u8]) -> StripsResult<DownlinkCommand> {
    let mut query = SettingQuery::new();
    for &id in payload {
        let setting = setting_by_id(id).ok_or(StripsError::UnknownSetting(id))?;
        if query.contains(setting.key) {
            return Err(StripsError::DuplicateSetting(id));
        }
        query.insert(setting);
    }
    Ok(DownlinkCommand::GetSetting(query))
}

// ============================================================================
// Encoding
// ============================================================================

/// An encoded downlink ready to be scheduled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncodedDownlink {
    /// Lower-case hex of the payload.
    pub data: String,
    /// LoRaWAN port.
    pub port: u16,
    /// Raw payload bytes.
    #[serde(skip)]
    pub payload: Vec<u8>,
}

/// Encode a command to its port and payload.
pub fn encode_downlink(command: &DownlinkCommand) -> StripsResult<EncodedDownlink> {
    let descriptor = command.port_command().descriptor();
    let mut buf = Vec::with_capacity(8);
    buf.put_u8(descriptor.cmd);

    match command {
        DownlinkCommand::SetSetting(values) => {
            buf.reserve(values.len() * SETTING_GROUP_SIZE);
            for entry in values.iter() {
                buf.put_u8(entry.setting.id);
                buf.put_u32(entry.raw()?);
            }
        }
        DownlinkCommand::GetSetting(query) => {
            for setting in query.iter() {
                buf.put_u8(setting.id);
            }
        }
        DownlinkCommand::GetHistory { first, last } => {
            buf.put_u16(*first);
            buf.put_u16(*last);
        }
        DownlinkCommand::SetProfile(profile) => {
            buf.put_u8(profile.id);
        }
        DownlinkCommand::Unjoin { minutes } => {
            buf.put_u16(*minutes);
        }
        DownlinkCommand::EndComplianceTest => {}
    }

    Ok(EncodedDownlink {
        data: hex::encode(&buf),
        port: descriptor.port,
        payload: buf,
    })
}

/// Parse a structured command and encode it.
pub fn encode_downlink_json(value: &Value) -> StripsResult<EncodedDownlink> {
    encode_downlink(&DownlinkCommand::from_json(value)?)
}
