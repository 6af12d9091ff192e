// Response payload models
//
// The hub answers INFO and READ_DCB with flat JSON objects whose field
// names are fixed by the firmware (mostly SHOUTING_CASE). These types keep
// the payload raw: temperatures stay as the strings the hub sends, and no
// unit conversion happens here. `neohub-core` converts into domain types.

use serde::Deserialize;

use crate::error::Error;

fn decode<'a, T: Deserialize<'a>>(raw: &'a str) -> Result<T, Error> {
    serde_json::from_str(raw).map_err(|e| Error::Deserialization {
        message: e.to_string(),
        body: raw.to_owned(),
    })
}

// ── INFO ────────────────────────────────────────────────────────────

/// Decoded `{"INFO":0}` response: the full status of every paired device.
///
/// A structurally valid payload may still carry no devices (`devices`
/// absent or empty) -- the caller decides whether that is acceptable.
#[derive(Debug, Clone, Deserialize)]
pub struct InfoResponse {
    #[serde(default)]
    pub devices: Vec<DeviceRecord>,
}

impl InfoResponse {
    /// Decode a raw INFO payload. Malformed JSON is a
    /// [`Error::Deserialization`] carrying the body.
    pub fn parse(raw: &str) -> Result<Self, Error> {
        decode(raw)
    }
}

/// One device's raw status record inside an INFO response.
///
/// Temperature fields arrive as decimal strings ("21.5"); absent fields are
/// normal (sensor-only devices report no set temperature, for example).
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceRecord {
    /// Device name as configured on the hub. This is the stable key device
    /// handlers use to find their own record in the snapshot.
    #[serde(rename = "device")]
    pub name: String,

    #[serde(rename = "CURRENT_TEMPERATURE", default)]
    pub current_temperature: Option<String>,

    #[serde(rename = "CURRENT_SET_TEMPERATURE", default)]
    pub current_set_temperature: Option<String>,

    #[serde(rename = "CURRENT_FLOOR_TEMPERATURE", default)]
    pub current_floor_temperature: Option<String>,

    #[serde(rename = "DEVICE_TYPE", default)]
    pub device_type: Option<i32>,

    #[serde(rename = "STANDBY", default)]
    pub standby: bool,

    #[serde(rename = "HEATING", default)]
    pub heating: bool,

    #[serde(rename = "TIMER_ON", default)]
    pub timer_on: bool,

    #[serde(rename = "OFFLINE", default)]
    pub offline: bool,

    #[serde(rename = "LOW_BATTERY", default)]
    pub low_battery: bool,

    #[serde(rename = "HOLIDAY", default)]
    pub holiday: bool,
}

// ── READ_DCB ────────────────────────────────────────────────────────

/// Decoded `{"READ_DCB":100}` response.
///
/// Only the temperature unit is consumed; the rest of the configuration
/// block is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct DcbResponse {
    /// "C" or "F". Older firmware omits the field entirely.
    #[serde(rename = "CORF", default)]
    pub corf: Option<String>,
}

impl DcbResponse {
    /// Decode a raw READ_DCB payload.
    pub fn parse(raw: &str) -> Result<Self, Error> {
        decode(raw)
    }

    /// Whether the hub is configured for Fahrenheit. Anything other than an
    /// explicit "F" (including a missing field) reads as Celsius.
    pub fn fahrenheit(&self) -> bool {
        matches!(self.corf.as_deref(), Some("F"))
    }
}
