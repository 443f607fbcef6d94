//! Port-command registry.
//!
//! A downlink is identified by the LoRaWAN port it arrives on together with
//! its first byte. Several commands share a port.

use serde::Serialize;

use crate::constants::*;

/// The closed set of downlink commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PortCommand {
    /// Write settings.
    SetSetting,
    /// Read settings.
    GetSetting,
    /// Request history items.
    GetHistory,
    /// Select a profile.
    SetProfile,
    /// Leave the network for a while.
    Unjoin,
    /// Leave compliance test mode.
    EndComplianceTest,
}

/// Static description of one downlink command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortCommandDescriptor {
    /// Command tag.
    pub command: PortCommand,
    /// Symbolic key.
    pub key: &'static str,
    /// LoRaWAN port.
    pub port: u16,
    /// First payload byte.
    pub cmd: u8,
    /// Display name.
    pub name: &'static str,
}

/// All downlink commands.
pub static PORT_COMMANDS: [PortCommandDescriptor; 6] = [
    PortCommandDescriptor {
        command: PortCommand::SetSetting,
        key: "SET_SETTING",
        port: PORT_SETTINGS,
        cmd: CMD_SET_SETTING,
        name: "Set setting",
    },
    PortCommandDescriptor {
        command: PortCommand::GetSetting,
        key: "GET_SETTING",
        port: PORT_SETTINGS,
        cmd: CMD_GET_SETTING,
        name: "Get setting",
    },
    PortCommandDescriptor {
        command: PortCommand::GetHistory,
        key: "GET_HISTORY",
        port: PORT_HISTORY_REQUEST,
        cmd: CMD_GET_HISTORY,
        name: "Get history",
    },
    PortCommandDescriptor {
        command: PortCommand::SetProfile,
        key: "SET_PROFILE",
        port: PORT_DEVICE_COMMAND,
        cmd: CMD_SET_PROFILE,
        name: "Set profile",
    },
    PortCommandDescriptor {
        command: PortCommand::Unjoin,
        key: "CMD_UNJOIN",
        port: PORT_DEVICE_COMMAND,
        cmd: CMD_UNJOIN,
        name: "Unjoin",
    },
    PortCommandDescriptor {
        command: PortCommand::EndComplianceTest,
        key: "CMD_ENDCOMP",
        port: PORT_COMPLIANCE_TEST,
        cmd: CMD_END_COMPLIANCE_TEST,
        name: "End compliance test",
    },
];

impl PortCommand {
    /// Registry entry for this command.
    pub fn descriptor(&self) -> &'static PortCommandDescriptor {
        match self {
            PortCommand::SetSetting => &PORT_COMMANDS[0],
            PortCommand::GetSetting => &PORT_COMMANDS[1],
            PortCommand::GetHistory => &PORT_COMMANDS[2],
            PortCommand::SetProfile => &PORT_COMMANDS[3],
            PortCommand::Unjoin => &PORT_COMMANDS[4],
            PortCommand::EndComplianceTest => &PORT_COMMANDS[5],
        }
    }

    /// Display name.
    pub fn name(&self) -> &'static str {
        self.descriptor().name
    }
}

/// Find the command for a `(port, cmd)` pair.
pub fn command_by_port(port: u16, cmd: u8) -> Option<&'static PortCommandDescriptor> {
    PORT_COMMANDS.iter().find(|c| c.port == port && c.cmd == cmd)
}

/// Find a command by display name.
pub fn command_by_name(name: &str) -> Option<&'static PortCommandDescriptor> {
    PORT_COMMANDS.iter().find(|c| c.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_dispatch_key_unique() {
        let keys: HashSet<(u16, u8)> = PORT_COMMANDS.iter().map(|c| (c.port, c.cmd)).collect();
        assert_eq!(keys.len(), PORT_COMMANDS.len());
    }

    #[test]
    fn test_descriptor_matches_tag() {
        for entry in PORT_COMMANDS.iter() {
            assert_eq!(entry.command.descriptor(), entry);
        }
    }

    #[test]
    fn test_shared_port() {
        assert_eq!(command_by_port(10, 1).map(|c| c.command), Some(PortCommand::SetProfile));
        assert_eq!(command_by_port(10, 8).map(|c| c.command), Some(PortCommand::Unjoin));
        assert!(command_by_port(10, 2).is_none());
        assert!(command_by_port(999, 1).is_none());
    }

    #[test]
    fn test_by_name() {
        assert_eq!(command_by_name("Get history").map(|c| c.port), Some(2));
        assert!(command_by_name("GET_HISTORY").is_none());
    }
}
