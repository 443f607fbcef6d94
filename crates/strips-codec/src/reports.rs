//! Report registry.
//!
//! Each report has two independent numbers: the `report_bit` indexing the
//! 32-bit "reports enabled" mask, and the `channel` used as the key in
//! uplink tuple framing. Registry order follows `report_bit`, and that order
//! is the order names appear in a decoded mask.

use std::fmt;
use std::ops::BitOr;

use crate::primitives::ValueCodec;

/// Set of logical sensors a report depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SensorMask(u16);

impl SensorMask {
    /// User button.
    pub const BUTTON: SensorMask = SensorMask(1 << 1);
    /// Battery gauge.
    pub const BATTERY: SensorMask = SensorMask(1 << 2);
    /// Temperature.
    pub const TEMP: SensorMask = SensorMask(1 << 3);
    /// Relative humidity.
    pub const HUMID: SensorMask = SensorMask(1 << 4);
    /// Ambient light.
    pub const LUX: SensorMask = SensorMask(1 << 5);
    /// Door magnet.
    pub const DOOR: SensorMask = SensorMask(1 << 6);
    /// Tamper switch.
    pub const TAMPER: SensorMask = SensorMask(1 << 7);
    /// Capacitive sensing.
    pub const CAP: SensorMask = SensorMask(1 << 8);
    /// IR proximity.
    pub const PROX: SensorMask = SensorMask(1 << 9);

    /// The empty set.
    pub const fn empty() -> Self {
        SensorMask(0)
    }

    /// Union of two sets, usable in const context.
    pub const fn union(self, other: SensorMask) -> Self {
        SensorMask(self.0 | other.0)
    }

    /// Whether every sensor in `other` is also in `self`.
    pub const fn contains(self, other: SensorMask) -> bool {
        self.0 & other.0 == other.0
    }

    /// Raw bit value.
    pub const fn bits(self) -> u16 {
        self.0
    }
}

impl BitOr for SensorMask {
    type Output = SensorMask;

    fn bitor(self, rhs: SensorMask) -> SensorMask {
        self.union(rhs)
    }
}

impl fmt::Display for SensorMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(SensorMask, &str); 9] = [
            (SensorMask::BUTTON, "BUTTON"),
            (SensorMask::BATTERY, "BATTERY"),
            (SensorMask::TEMP, "TEMP"),
            (SensorMask::HUMID, "HUMID"),
            (SensorMask::LUX, "LUX"),
            (SensorMask::DOOR, "DOOR"),
            (SensorMask::TAMPER, "TAMPER"),
            (SensorMask::CAP, "CAP"),
            (SensorMask::PROX, "PROX"),
        ];
        let mut first = true;
        for (mask, name) in NAMES {
            if self.contains(mask) {
                if !first {
                    write!(f, "|")?;
                }
                write!(f, "{}", name)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Static description of one report type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportDescriptor {
    /// Report name, also its token in mask strings.
    pub name: &'static str,
    /// Bit in the reports-enabled mask.
    pub report_bit: u8,
    /// Sensors the report requires.
    pub sensors: SensorMask,
    /// Uplink channel id (7 bits on the wire).
    pub channel: u8,
    /// Layout of the value bytes.
    pub codec: ValueCodec,
    /// Unit of the decoded value.
    pub unit: &'static str,
}

const fn report(
    name: &'static str,
    report_bit: u8,
    sensors: SensorMask,
    channel: u8,
    codec: ValueCodec,
    unit: &'static str,
) -> ReportDescriptor {
    ReportDescriptor {
        name,
        report_bit,
        sensors,
        channel,
        codec,
        unit,
    }
}

const TEMP_HUMID: SensorMask = SensorMask::TEMP.union(SensorMask::HUMID);
const TEMP_DOOR: SensorMask = SensorMask::TEMP.union(SensorMask::DOOR);

/// All reports, in `report_bit` order.
pub static REPORTS: [ReportDescriptor; 29] = [
    report("UserButton1Alarm", 0, SensorMask::BUTTON, 110, ValueCodec::GitRevision, "data"),
    report("BatteryReport", 1, SensorMask::BATTERY, 1, ValueCodec::U8, "%"),
    report("TempReport", 2, SensorMask::TEMP, 2, ValueCodec::TenthsI16, "C"),
    report("TempAlarm", 3, SensorMask::TEMP, 3, ValueCodec::HighLowAlarm, "pair"),
    report("AverageTempReport", 4, SensorMask::TEMP, 4, ValueCodec::TenthsI16, "C"),
    report("AverageTempAlarm", 5, SensorMask::TEMP, 5, ValueCodec::HighLowAlarm, "pair"),
    report("HumidityReport", 6, SensorMask::HUMID, 6, ValueCodec::HalvesU8, "%"),
    report("LuxReport", 7, SensorMask::LUX, 7, ValueCodec::U16, "Lux"),
    report("LuxReport2", 8, SensorMask::LUX, 8, ValueCodec::U16, "Lux"),
    report("DoorReport", 9, SensorMask::DOOR, 9, ValueCodec::Bool, "bool"),
    report("DoorAlarm", 10, SensorMask::DOOR, 10, ValueCodec::Bool, "bool"),
    report("TamperReport", 11, SensorMask::TAMPER, 11, ValueCodec::Bool, "bool"),
    report("TamperAlarm", 12, SensorMask::TAMPER, 12, ValueCodec::Bool, "bool"),
    report("FloodReport", 13, SensorMask::CAP, 13, ValueCodec::U8, "%"),
    report("FloodAlarm", 14, SensorMask::CAP, 14, ValueCodec::Bool, "bool"),
    report("FoilAlarm", 15, SensorMask::CAP, 15, ValueCodec::Bool, "bool"),
    report("TempHumReport", 16, TEMP_HUMID, 80, ValueCodec::TempHumidity, "C/%"),
    report("AvgTempHumReport", 17, TEMP_HUMID, 81, ValueCodec::TempHumidity, "C/%"),
    report("TempDoorReport", 18, TEMP_DOOR, 82, ValueCodec::DoorTemp, "bool/C"),
    report("CapacitanceFloodReport", 19, SensorMask::CAP, 112, ValueCodec::U16, "uF"),
    report("CapacitancePadReport", 20, SensorMask::CAP, 113, ValueCodec::U16, "uF"),
    report("CapacitanceEndReport", 21, SensorMask::CAP, 114, ValueCodec::U16, "uF"),
    report("UserSwitch1Alarm", 22, SensorMask::TAMPER, 16, ValueCodec::Bool, "bool"),
    report("DoorCountReport", 23, SensorMask::TAMPER, 17, ValueCodec::U16, "u16"),
    report("PresenceReport", 24, SensorMask::PROX, 18, ValueCodec::Bool, "bool"),
    report("IRProximityReport", 25, SensorMask::PROX, 19, ValueCodec::U16, "u16"),
    report("IRCloseProximityReport", 26, SensorMask::PROX, 20, ValueCodec::U16, "u16"),
    report("CloseProximityAlarm", 27, SensorMask::PROX, 21, ValueCodec::Bool, "bool"),
    report("DisinfectAlarm", 28, SensorMask::PROX, 22, ValueCodec::U8, "enum"),
];

/// Find the report carried on an uplink channel.
pub fn report_by_channel(channel: u8) -> Option<&'static ReportDescriptor> {
    REPORTS.iter().find(|r| r.channel == channel)
}

/// Find a report by exact (case-sensitive) name.
pub fn report_by_name(name: &str) -> Option<&'static ReportDescriptor> {
    REPORTS.iter().find(|r| r.name == name)
}

/// Reports whose sensors are all present in `available`.
pub fn reports_for_sensors(available: SensorMask) -> impl Iterator<Item = &'static ReportDescriptor> {
    REPORTS.iter().filter(move |r| available.contains(r.sensors))
}
