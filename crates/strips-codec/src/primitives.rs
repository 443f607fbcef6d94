//! Primitive field codecs.
//!
//! Every reader takes the payload and a cursor position and returns the
//! decoded value together with the position just past the consumed bytes.
//! Callers check the payload length against [`ValueCodec::size`] before
//! decoding; the readers themselves index the slice directly.
//!
//! All multi-byte integers are big-endian.

use bytes::BufMut;
use serde::Serialize;

use crate::{StripsError, StripsResult};

// ============================================================================
// Readers
// ============================================================================

/// Read one unsigned byte.
pub fn read_u8(bytes: &[u8], pos: usize) -> (u8, usize) {
    (bytes[pos], pos + 1)
}

/// Read a 2-byte unsigned integer.
pub fn read_u16(bytes: &[u8], pos: usize) -> (u16, usize) {
    (u16::from_be_bytes([bytes[pos], bytes[pos + 1]]), pos + 2)
}

/// Read a 3-byte unsigned integer.
pub fn read_u24(bytes: &[u8], pos: usize) -> (u32, usize) {
    (
        u32::from_be_bytes([0, bytes[pos], bytes[pos + 1], bytes[pos + 2]]),
        pos + 3,
    )
}

/// Read a 4-byte unsigned integer.
pub fn read_u32(bytes: &[u8], pos: usize) -> (u32, usize) {
    (
        u32::from_be_bytes([bytes[pos], bytes[pos + 1], bytes[pos + 2], bytes[pos + 3]]),
        pos + 4,
    )
}

/// Read a 2-byte two's-complement signed integer.
pub fn read_i16(bytes: &[u8], pos: usize) -> (i16, usize) {
    (i16::from_be_bytes([bytes[pos], bytes[pos + 1]]), pos + 2)
}

/// Read a boolean byte; any non-zero value is `true`.
pub fn read_bool(bytes: &[u8], pos: usize) -> (bool, usize) {
    (bytes[pos] != 0, pos + 1)
}

// ============================================================================
// Fixed-point scaling
// ============================================================================

/// Divisor for 0.1 resolution values (temperatures in °C).
pub const TENTHS: f64 = 10.0;
/// Divisor for 0.5 resolution values (relative humidity in %).
pub const HALVES: f64 = 2.0;

fn unscale(raw: i64, divisor: f64) -> f64 {
    raw as f64 / divisor
}

/// Multiply, round and range-check a scaled value before it goes on the wire.
fn scale(value: f64, divisor: f64, min: i64, max: i64, field: &str) -> StripsResult<i64> {
    let raw = (value * divisor).round();
    if !raw.is_finite() || raw < min as f64 || raw > max as f64 {
        return Err(StripsError::invalid_value(field, value));
    }
    Ok(raw as i64)
}

// ============================================================================
// Values
// ============================================================================

/// A decoded report value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReportValue {
    /// Plain unsigned integer.
    Unsigned(u32),
    /// Plain signed integer.
    Signed(i32),
    /// Fixed-point value after scaling.
    Scaled(f64),
    /// Boolean state.
    Flag(bool),
    /// High/low alarm pair.
    Alarm {
        /// Bit 0.
        high: bool,
        /// Bit 1.
        low: bool,
    },
    /// Firmware git revision and debug id, as 8 hex digits each.
    Revision {
        /// Git revision.
        git: String,
        /// Debug data.
        idd: String,
    },
    /// Combined temperature (°C) and relative humidity (%).
    TempHumidity {
        /// Temperature in °C.
        temp: f64,
        /// Relative humidity in %.
        humidity: f64,
    },
    /// Combined door state and temperature (°C).
    DoorTemp {
        /// Door open/closed.
        door: bool,
        /// Temperature in °C.
        temp: f64,
    },
}

// ============================================================================
// Codecs
// ============================================================================

/// The closed set of value layouts used by reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueCodec {
    /// 1-byte unsigned.
    U8,
    /// 2-byte unsigned.
    U16,
    /// 3-byte unsigned.
    U24,
    /// 4-byte unsigned.
    U32,
    /// 2-byte signed.
    I16,
    /// 1-byte unsigned, 0.5 resolution.
    HalvesU8,
    /// 2-byte signed, 0.1 resolution.
    TenthsI16,
    /// 1-byte boolean.
    Bool,
    /// 1 byte, bit 0 = high alarm, bit 1 = low alarm.
    HighLowAlarm,
    /// 4-byte git revision followed by 4-byte debug id.
    GitRevision,
    /// 2-byte signed temperature (0.1) then 2-byte unsigned humidity (0.5).
    TempHumidity,
    /// Door boolean byte then 2-byte signed temperature (0.1).
    DoorTemp,
}

impl ValueCodec {
    /// Human-readable description of the layout.
    pub fn name(&self) -> &'static str {
        match self {
            ValueCodec::U8 => "1 byte",
            ValueCodec::U16 => "2 bytes unsigned",
            ValueCodec::U24 => "3 bytes unsigned",
            ValueCodec::U32 => "4 bytes unsigned",
            ValueCodec::I16 => "2 bytes signed",
            ValueCodec::HalvesU8 => "1 byte fp .5",
            ValueCodec::TenthsI16 => "2 bytes signed fp .1",
            ValueCodec::Bool => "1 byte boolean",
            ValueCodec::HighLowAlarm => "Tmp alarm",
            ValueCodec::GitRevision => "Git revision and debug data",
            ValueCodec::TempHumidity => "Temp and humidity combined",
            ValueCodec::DoorTemp => "Door and temp combined",
        }
    }

    /// Number of value bytes this codec consumes at `pos`.
    ///
    /// None of the current layouts depend on content, but the payload is
    /// passed so composite layouts can.
    pub fn size(&self, bytes: &[u8], pos: usize) -> usize {
        match self {
            ValueCodec::U8 | ValueCodec::HalvesU8 | ValueCodec::Bool | ValueCodec::HighLowAlarm => 1,
            ValueCodec::U16 | ValueCodec::I16 | ValueCodec::TenthsI16 => 2,
            ValueCodec::U24 => 3,
            ValueCodec::U32 => 4,
            ValueCodec::GitRevision => ValueCodec::U32.size(bytes, pos) * 2,
            ValueCodec::TempHumidity => {
                ValueCodec::TenthsI16.size(bytes, pos) + ValueCodec::U16.size(bytes, pos + 2)
            }
            ValueCodec::DoorTemp => {
                ValueCodec::Bool.size(bytes, pos) + ValueCodec::TenthsI16.size(bytes, pos + 1)
            }
        }
    }

    /// Decode a value at `pos`, returning it with the position after it.
    ///
    /// # Panics
    ///
    /// Panics if fewer than [`ValueCodec::size`] bytes remain at `pos`.
    pub fn decode(&self, bytes: &[u8], pos: usize) -> (ReportValue, usize) {
        match self {
            ValueCodec::U8 => {
                let (v, pos) = read_u8(bytes, pos);
                (ReportValue::Unsigned(v.into()), pos)
            }
            ValueCodec::U16 => {
                let (v, pos) = read_u16(bytes, pos);
                (ReportValue::Unsigned(v.into()), pos)
            }
            ValueCodec::U24 => {
                let (v, pos) = read_u24(bytes, pos);
                (ReportValue::Unsigned(v), pos)
            }
            ValueCodec::U32 => {
                let (v, pos) = read_u32(bytes, pos);
                (ReportValue::Unsigned(v), pos)
            }
            ValueCodec::I16 => {
                let (v, pos) = read_i16(bytes, pos);
                (ReportValue::Signed(v.into()), pos)
            }
            ValueCodec::HalvesU8 => {
                let (v, pos) = read_u8(bytes, pos);
                (ReportValue::Scaled(unscale(v.into(), HALVES)), pos)
            }
            ValueCodec::TenthsI16 => {
                let (v, pos) = read_i16(bytes, pos);
                (ReportValue::Scaled(unscale(v.into(), TENTHS)), pos)
            }
            ValueCodec::Bool => {
                let (v, pos) = read_bool(bytes, pos);
                (ReportValue::Flag(v), pos)
            }
            ValueCodec::HighLowAlarm => {
                let (v, pos) = read_u8(bytes, pos);
                let value = ReportValue::Alarm {
                    high: v & 0x01 != 0,
                    low: v & 0x02 != 0,
                };
                (value, pos)
            }
            ValueCodec::GitRevision => {
                let (git, pos) = read_u32(bytes, pos);
                let (idd, pos) = read_u32(bytes, pos);
                let value = ReportValue::Revision {
                    git: format!("{:08x}", git),
                    idd: format!("{:08x}", idd),
                };
                (value, pos)
            }
            ValueCodec::TempHumidity => {
                let (temp, pos) = read_i16(bytes, pos);
                let (humidity, pos) = read_u16(bytes, pos);
                let value = ReportValue::TempHumidity {
                    temp: unscale(temp.into(), TENTHS),
                    humidity: unscale(humidity.into(), HALVES),
                };
                (value, pos)
            }
            ValueCodec::DoorTemp => {
                let (door, pos) = read_bool(bytes, pos);
                let (temp, pos) = read_i16(bytes, pos);
                let value = ReportValue::DoorTemp {
                    door,
                    temp: unscale(temp.into(), TENTHS),
                };
                (value, pos)
            }
        }
    }

    /// Encode a value back to its wire bytes.
    pub fn encode(&self, value: &ReportValue) -> StripsResult<Vec<u8>> {
        let field = self.name();
        let mut buf = Vec::with_capacity(8);

        match (self, value) {
            (ValueCodec::U8, ReportValue::Unsigned(v)) => {
                let v = u8::try_from(*v).map_err(|_| StripsError::invalid_value(field, v))?;
                buf.put_u8(v);
            }
            (ValueCodec::U16, ReportValue::Unsigned(v)) => {
                let v = u16::try_from(*v).map_err(|_| StripsError::invalid_value(field, v))?;
                buf.put_u16(v);
            }
            (ValueCodec::U24, ReportValue::Unsigned(v)) => {
                if *v > 0x00FF_FFFF {
                    return Err(StripsError::invalid_value(field, v));
                }
                buf.extend_from_slice(&v.to_be_bytes()[1..]);
            }
            (ValueCodec::U32, ReportValue::Unsigned(v)) => {
                buf.put_u32(*v);
            }
            (ValueCodec::I16, ReportValue::Signed(v)) => {
                let v = i16::try_from(*v).map_err(|_| StripsError::invalid_value(field, v))?;
                buf.put_i16(v);
            }
            (ValueCodec::HalvesU8, ReportValue::Scaled(v)) => {
                buf.put_u8(scale(*v, HALVES, 0, u8::MAX.into(), field)? as u8);
            }
            (ValueCodec::TenthsI16, ReportValue::Scaled(v)) => {
                buf.put_i16(scale(*v, TENTHS, i16::MIN.into(), i16::MAX.into(), field)? as i16);
            }
            (ValueCodec::Bool, ReportValue::Flag(v)) => {
                buf.put_u8(u8::from(*v));
            }
            (ValueCodec::HighLowAlarm, ReportValue::Alarm { high, low }) => {
                buf.put_u8(u8::from(*high) | (u8::from(*low) << 1));
            }
            (ValueCodec::GitRevision, ReportValue::Revision { git, idd }) => {
                buf.put_u32(parse_hex_word(git, field)?);
                buf.put_u32(parse_hex_word(idd, field)?);
            }
            (ValueCodec::TempHumidity, ReportValue::TempHumidity { temp, humidity }) => {
                buf.put_i16(scale(*temp, TENTHS, i16::MIN.into(), i16::MAX.into(), field)? as i16);
                buf.put_u16(scale(*humidity, HALVES, 0, u16::MAX.into(), field)? as u16);
            }
            (ValueCodec::DoorTemp, ReportValue::DoorTemp { door, temp }) => {
                buf.put_u8(u8::from(*door));
                buf.put_i16(scale(*temp, TENTHS, i16::MIN.into(), i16::MAX.into(), field)? as i16);
            }
            (_, other) => {
                return Err(StripsError::invalid_value(field, format!("{:?}", other)));
            }
        }

        Ok(buf)
    }
}

fn parse_hex_word(text: &str, field: &str) -> StripsResult<u32> {
    u32::from_str_radix(text, 16).map_err(|_| StripsError::invalid_value(field, text))
}
