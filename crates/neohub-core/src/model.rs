// ── Domain model ──
//
// What one poll cycle produces. A snapshot is constructed fresh per
// successful cycle, fanned out to every sink, and dropped -- cycles
// replace, they never merge.

use serde::{Deserialize, Serialize};

/// Hub-wide temperature unit, read from the configuration block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Celsius => "°C",
            Self::Fahrenheit => "°F",
        }
    }
}

/// Decoded status of one device, in the hub's native unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceStatus {
    /// Device name as configured on the hub -- the key handlers use to
    /// find their own record.
    pub name: String,
    pub temperature: Option<f64>,
    pub set_temperature: Option<f64>,
    pub floor_temperature: Option<f64>,
    pub standby: bool,
    pub heating: bool,
    pub timer_on: bool,
    pub offline: bool,
    pub low_battery: bool,
    pub holiday: bool,
}

/// The full decoded result of one status poll.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub devices: Vec<DeviceStatus>,
}

impl StatusSnapshot {
    /// Look up one device's record by its hub-configured name.
    pub fn device(&self, name: &str) -> Option<&DeviceStatus> {
        self.devices.iter().find(|d| d.name == name)
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}
