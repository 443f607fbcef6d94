//! Profile registry.

/// A device-wide behaviour preset selectable with the Set Profile command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileDescriptor {
    /// Wire id.
    pub id: u8,
    /// Symbolic key.
    pub key: &'static str,
    /// Display name.
    pub name: &'static str,
}

const fn profile(key: &'static str, id: u8, name: &'static str) -> ProfileDescriptor {
    ProfileDescriptor { id, key, name }
}

/// All profiles.
pub static PROFILES: [ProfileDescriptor; 11] = [
    profile("DEFAULT", 0x00, "Default"),
    profile("COMFORT_TEMP", 0x01, "Comfort Temp"),
    profile("COMFORT_TEMP_LUX", 0x02, "Comfort Temp and Lux"),
    profile("COMFORT_AVGTEMP", 0x03, "Comfort Average Temp"),
    profile("GUARD_STD", 0x04, "Guard Standard"),
    profile("DRIP_STD", 0x05, "Drip Standard"),
    profile("PRESENCE_OFFICE", 0x06, "Presence Office"),
    profile("PRESENCE_PUBLIC", 0x07, "Presence Public"),
    profile("DISINFECT_OFFICE", 0x08, "Disinfect Office"),
    profile("CLOSE_PROXIMITY_SLOW", 0x09, "Close Proximity Slow"),
    profile("ALL_CAP_SENSORS_RAW", 0xF0, "All cap sensors raw"),
];

/// Find a profile by wire id.
pub fn profile_by_id(id: u8) -> Option<&'static ProfileDescriptor> {
    PROFILES.iter().find(|p| p.id == id)
}

/// Find a profile by symbolic key.
pub fn profile_by_key(key: &str) -> Option<&'static ProfileDescriptor> {
    PROFILES.iter().find(|p| p.key == key)
}
