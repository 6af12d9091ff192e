// ── API-to-domain conversion ──
//
// Maps the raw wire records from neohub-api into domain types. The hub
// sends temperatures as decimal strings and uses 255.255 as a "no sensor
// fitted" marker; both quirks are absorbed here so the rest of the crate
// only sees clean optional floats.

use neohub_api::responses::{DeviceRecord, InfoResponse};

use crate::model::{DeviceStatus, StatusSnapshot};

/// Magic reading the hub reports for an absent sensor.
const SENSOR_ABSENT: f64 = 255.0;

fn parse_temperature(raw: Option<&str>) -> Option<f64> {
    let value: f64 = raw?.trim().parse().ok()?;
    if value >= SENSOR_ABSENT {
        return None;
    }
    Some(value)
}

impl From<&DeviceRecord> for DeviceStatus {
    fn from(record: &DeviceRecord) -> Self {
        Self {
            name: record.name.clone(),
            temperature: parse_temperature(record.current_temperature.as_deref()),
            set_temperature: parse_temperature(record.current_set_temperature.as_deref()),
            floor_temperature: parse_temperature(record.current_floor_temperature.as_deref()),
            standby: record.standby,
            heating: record.heating,
            timer_on: record.timer_on,
            offline: record.offline,
            low_battery: record.low_battery,
            holiday: record.holiday,
        }
    }
}

impl From<InfoResponse> for StatusSnapshot {
    fn from(info: InfoResponse) -> Self {
        Self {
            devices: info.devices.iter().map(DeviceStatus::from).collect(),
        }
    }
}
