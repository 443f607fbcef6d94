//! Settings registry.
//!
//! Every setting is a 4-byte value on the wire. How that value is shown to
//! humans depends on the setting's [`SettingCodec`].

use crate::bitmask::{
    decode_reports_mask, decode_sensor_config, encode_reports_mask, encode_sensor_config,
    known_report_bits, known_sensor_config_bits,
};
use crate::{StripsError, StripsResult};

/// Textual representation of a 4-byte setting value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingCodec {
    /// `0x`-prefixed lower-case hexadecimal.
    U32Hex,
    /// Decimal.
    U32Dec,
    /// Report names from the reports-enabled mask.
    ReportsMask,
    /// Sensor configuration bit names.
    SensorConfig,
}

impl SettingCodec {
    /// Render a raw value.
    ///
    /// Mask codecs reject set bits that have no name, since those could not
    /// be encoded back. `field` names the setting in any error.
    pub fn decode(&self, field: &str, raw: u32) -> StripsResult<String> {
        match self {
            SettingCodec::U32Hex => Ok(format!("0x{:x}", raw)),
            SettingCodec::U32Dec => Ok(raw.to_string()),
            SettingCodec::ReportsMask => {
                reject_unnamed_bits(field, raw, known_report_bits())?;
                Ok(decode_reports_mask(raw))
            }
            SettingCodec::SensorConfig => {
                reject_unnamed_bits(field, raw, known_sensor_config_bits())?;
                Ok(decode_sensor_config(raw))
            }
        }
    }

    /// Parse a rendered value back to its raw form.
    ///
    /// `field` names the setting in any error.
    pub fn encode(&self, field: &str, text: &str) -> StripsResult<u32> {
        match self {
            SettingCodec::U32Hex => {
                // "Ox" is what older tooling produced.
                let digits = ["0x", "0X", "Ox"]
                    .iter()
                    .find_map(|prefix| text.strip_prefix(*prefix))
                    .unwrap_or(text);
                if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
                    return Err(StripsError::invalid_value(field, text));
                }
                u32::from_str_radix(digits, 16).map_err(|_| StripsError::invalid_value(field, text))
            }
            SettingCodec::U32Dec => {
                let digits = text.trim();
                if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(StripsError::invalid_value(field, text));
                }
                digits
                    .parse::<u32>()
                    .map_err(|_| StripsError::invalid_value(field, text))
            }
            SettingCodec::ReportsMask => encode_reports_mask(text),
            SettingCodec::SensorConfig => Ok(encode_sensor_config(text)),
        }
    }
}

fn reject_unnamed_bits(field: &str, raw: u32, known: u32) -> StripsResult<()> {
    if raw & !known != 0 {
        return Err(StripsError::invalid_value(field, format!("0x{:08x}", raw)));
    }
    Ok(())
}

/// Static description of one device setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingDescriptor {
    /// Wire id.
    pub id: u8,
    /// Symbolic key used in structured commands.
    pub key: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Unit of the value.
    pub unit: &'static str,
    /// Value representation.
    pub codec: SettingCodec,
}

const fn setting(
    id: u8,
    key: &'static str,
    unit: &'static str,
    codec: SettingCodec,
    name: &'static str,
) -> SettingDescriptor {
    SettingDescriptor {
        id,
        key,
        name,
        unit,
        codec,
    }
}

use SettingCodec::{ReportsMask, SensorConfig, U32Dec, U32Hex};

/// All settings, in id order.
pub static SETTINGS: [SettingDescriptor; 51] = [
    setting(0x00, "NONE", "none", U32Hex, "None"),
    setting(0x01, "VERSION", "version", U32Hex, "Version"),
    setting(0x02, "BASE_POLL_INTERVAL", "ms", U32Dec, "Base poll interval"),
    setting(0x03, "REPORTS_ENABLED", "reports", ReportsMask, "Reports enabled"),
    setting(0x04, "TEMP_POLL_INTERVAL", "s", U32Dec, "Temp poll interval"),
    setting(0x05, "TEMP_SEND_IMMEDIATELY_TRESHOLD", "mC", U32Dec, "Temp send immediately treshold"),
    setting(0x06, "TEMP_SEND_THROTTLED_TRESHOLD", "mC", U32Dec, "Temp send throttled treshold"),
    setting(0x07, "TEMP_SEND_THROTTLED_TIME", "s", U32Dec, "Temp send throttled time"),
    setting(0x08, "TEMP_LOW_ALARM", "mC", U32Dec, "Temp low alarm"),
    setting(0x09, "TEMP_HIGH_ALARM", "mC", U32Dec, "Temp high alarm"),
    setting(0x0A, "TEMP_ALARM_HYSTERESIS", "mC", U32Dec, "Temp alarm hysteresis"),
    setting(0x0B, "AVGTEMP_AVERAGE_TIME", "s", U32Dec, "Average temp average time"),
    setting(0x0C, "AVGTEMP_MIN_TEMP", "mC", U32Dec, "Average temp min temp"),
    setting(0x0D, "AVGTEMP_SEND_IMMEDIATELY_TRESHOLD", "mC", U32Dec, "Averate temp send immediately treshold"),
    setting(0x0E, "AVGTEMP_LOW_ALARM", "mC", U32Dec, "Average temp low alarm"),
    setting(0x0F, "AVGTEMP_HIGH_ALARM", "mC", U32Dec, "Average temp high alarm"),
    setting(0x10, "AVGTEMP_ALARM_HYSTERESIS", "mC", U32Dec, "Average temp hysteresis"),
    setting(0x11, "HUMIDITY_POLL_INTERVAL", "s", U32Dec, "Humidity poll interval"),
    setting(0x12, "HUMIDITY_TRESHOLD", "%", U32Dec, "Humidity treshold"),
    setting(0x13, "LUX_POLL_INTERVAL", "s", U32Dec, "Lux poll interval"),
    setting(0x14, "LUX_HIGH_LEVEL_1", "Lux", U32Dec, "Lux high level 1"),
    setting(0x15, "LUX_LOW_LEVEL_1", "Lux", U32Dec, "Lux low level 1"),
    setting(0x16, "LUX_HIGH_LEVEL_2", "Lux", U32Dec, "Lux high level 2"),
    setting(0x17, "LUX_LOW_LEVEL_2", "Lux", U32Dec, "Lux low level 2"),
    setting(0x18, "FLOOD_POLL_INTERVAL", "s", U32Dec, "Flood poll interval"),
    setting(0x19, "FLOOD_CAPACITANCE_MIN", "capacitance", U32Dec, "Flood capacitance min"),
    setting(0x1A, "FLOOD_CAPACITANCE_MAX", "capacitance", U32Dec, "Flood capacitance max"),
    setting(0x1B, "FLOOD_REPORT_INTERVAL", "s", U32Dec, "Flood report interval"),
    setting(0x1C, "FLOOD_ALARM_TRESHOLD", "%", U32Dec, "Flood alarm treshold"),
    setting(0x1D, "FLOOD_ALARM_HYSTERESIS", "%", U32Dec, "Flood alarm hysteresis"),
    setting(0x1E, "SETTINGS_FOIL_TRESHOLD", "capacitance", U32Dec, "Foil treshold"),
    setting(0x1F, "CAPACITANCE_FLOOD_REPORT_INTERVAL", "s", U32Dec, "Cap flood report interval"),
    setting(0x20, "CAPACITANCE_PAD_REPORT_INTERVAL", "s", U32Dec, "Cap pad report interval"),
    setting(0x21, "CAPACITANCE_END_REPORT_INTERVAL", "s", U32Dec, "Cap end report interval"),
    setting(0x22, "SENSORS_COMBINED_1", "reports", ReportsMask, "Combined sensors 1"),
    setting(0x23, "SENSORS_COMBINED_2", "reports", ReportsMask, "Combined sensors 2"),
    setting(0x24, "SENSORS_COMBINED_3", "reports", ReportsMask, "Combined sensors 3"),
    setting(0x25, "HISTORY_REPORTS", "reports", ReportsMask, "History reports"),
    setting(0x26, "DEMO_TRYJOIN_INTERVAL", "min", U32Dec, "Try join interval"),
    setting(0x27, "LUX_PLASTIC_COMP", "%", U32Dec, "Lux plastic comp"),
    setting(0x28, "LORA_DATA_RATE", "datarate", U32Dec, "Lora data rate"),
    setting(0x29, "LED_LEVEL", "ledlevel", U32Dec, "Led level"),
    setting(0x2A, "LINK_CHECK_INTERVAL", "unknown", U32Dec, "Link check interval"),
    setting(0x2B, "RESEND_RESET_TIME", "unknown", U32Dec, "Resend reset time"),
    setting(0x2C, "LUX_LOW_CUTOFF", "lux", U32Dec, "Lux low cutoff"),
    setting(0x2D, "DOOR_COUNT_REPORT_INTERVAL", "s", U32Dec, "Door count interval"),
    setting(0x2E, "IR_PROXIMITY_REPORT_INTERVAL", "s", U32Dec, "IR Proximity report interval"),
    setting(0x2F, "PRESENCE_POLL_INTERVAL", "s", U32Dec, "Presence poll interval"),
    setting(0x30, "PRESENCE_TRESHOLD", "reflection", U32Dec, "Presence treshold"),
    setting(0x31, "PRESENCE_TIMEOUT", "s", U32Dec, "Presence timeout"),
    setting(0x32, "SENSOR_CONFIGURATION", "config", SensorConfig, "Sensor configuration"),
];

/// Find a setting by wire id.
pub fn setting_by_id(id: u8) -> Option<&'static SettingDescriptor> {
    SETTINGS.iter().find(|s| s.id == id)
}

/// Find a setting by its symbolic key.
pub fn setting_by_key(key: &str) -> Option<&'static SettingDescriptor> {
    SETTINGS.iter().find(|s| s.key == key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_setting_per_id() {
        for (i, s) in SETTINGS.iter().enumerate() {
            assert_eq!(s.id as usize, i, "{} out of order", s.key);
        }
        assert_eq!(SETTINGS.last().map(|s| s.id), Some(0x32));
    }

    #[test]
    fn test_lookup() {
        let s = setting_by_id(0x02).unwrap();
        assert_eq!(s.key, "BASE_POLL_INTERVAL");
        assert_eq!(s.unit, "ms");
        assert_eq!(setting_by_key("SENSOR_CONFIGURATION").map(|s| s.id), Some(0x32));
        assert!(setting_by_id(0x33).is_none());
        assert!(setting_by_key("Base poll interval").is_none());
    }

    #[test]
    fn test_hex_codec() {
        assert_eq!(U32Hex.decode("VERSION", 0x00010203).unwrap(), "0x10203");
        assert_eq!(U32Hex.encode("VERSION", "0x10203").unwrap(), 0x00010203);
        assert_eq!(U32Hex.encode("VERSION", "Ox10203").unwrap(), 0x00010203);
        assert!(U32Hex.encode("VERSION", "0xzz").is_err());
    }

    #[test]
    fn test_numeric_codecs_reject_signs() {
        assert!(U32Hex.encode("VERSION", "0x+1f").is_err());
        assert!(U32Hex.encode("VERSION", "+1f").is_err());
        assert!(U32Hex.encode("VERSION", "0x").is_err());
        assert!(U32Dec.encode("BASE_POLL_INTERVAL", "+5").is_err());
        assert!(U32Dec.encode("BASE_POLL_INTERVAL", "").is_err());
        assert_eq!(U32Dec.encode("BASE_POLL_INTERVAL", " 5\n").unwrap(), 5);
    }

    #[test]
    fn test_mask_decode_rejects_unnamed_bits() {
        assert_eq!(
            ReportsMask.decode("REPORTS_ENABLED", 0x2000_0000),
            Err(StripsError::invalid_value("REPORTS_ENABLED", "0x20000000"))
        );
        assert!(SensorConfig.decode("SENSOR_CONFIGURATION", 0x04).is_err());
        assert_eq!(
            SensorConfig.decode("SENSOR_CONFIGURATION", 0x03).unwrap(),
            "INVERT_DOOR|HIGH_POWER_PROXIMITY"
        );
    }

    #[test]
    fn test_decimal_codec() {
        assert_eq!(U32Dec.decode("VERSION", 4_294_967_295).unwrap(), "4294967295");
        assert_eq!(U32Dec.encode("TEMP_LOW_ALARM", "1500").unwrap(), 1500);
        let err = U32Dec.encode("TEMP_LOW_ALARM", "-3").unwrap_err();
        assert_eq!(err, StripsError::invalid_value("TEMP_LOW_ALARM", "-3"));
    }

    #[test]
    fn test_mask_codecs() {
        assert_eq!(ReportsMask.decode("REPORTS_ENABLED", 0x200).unwrap(), "DoorReport");
        assert_eq!(ReportsMask.encode("REPORTS_ENABLED", "DoorReport").unwrap(), 0x200);
        assert_eq!(SensorConfig.encode("SENSOR_CONFIGURATION", "X|INVERT_DOOR").unwrap(), 1);
    }
}
