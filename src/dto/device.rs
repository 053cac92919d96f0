//! Raw payloads exchanged with the pressure-sensing device.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
/// Loosely-typed reading posted by the sensing device.
///
/// Firmware revisions disagree on field names, so the pad identifier is
/// accepted under `pad`, `fsr`, or `color`, and the magnitude under `force`
/// or `pressure`. Every field is optional; a payload that matches nothing
/// deserializes to a blank reading instead of an error.
pub struct DeviceReading {
    /// Identifier of the pressed pad, in whatever casing the device sent.
    #[serde(default, alias = "fsr", alias = "color")]
    pub pad: Option<String>,
    /// Reported press magnitude; normalized downstream to 0..=100.
    #[serde(default, alias = "pressure")]
    pub force: Option<i64>,
    /// Press duration in seconds, when the firmware reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    /// Press counter maintained by the firmware, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
}

impl DeviceReading {
    /// Best-effort conversion from an arbitrary JSON body.
    ///
    /// Unparseable payloads map to a blank reading; downstream consumers
    /// treat the missing pad as "no match" rather than an error.
    pub fn from_value(value: serde_json::Value) -> Self {
        serde_json::from_value(value).unwrap_or_default()
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Acknowledgement returned to the device after an ingress POST.
///
/// Acknowledges receipt only; it says nothing about whether any subscriber
/// was attached to receive the fan-out.
pub struct DeviceAck {
    /// Human-readable confirmation message.
    pub message: String,
}

impl DeviceAck {
    /// Standard acknowledgement payload.
    pub fn received() -> Self {
        Self {
            message: "data received".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_legacy_field_names() {
        let reading = DeviceReading::from_value(json!({ "fsr": "red", "pressure": 42 }));
        assert_eq!(reading.pad.as_deref(), Some("red"));
        assert_eq!(reading.force, Some(42));

        let reading = DeviceReading::from_value(json!({ "color": "BLUE", "force": 7 }));
        assert_eq!(reading.pad.as_deref(), Some("BLUE"));
        assert_eq!(reading.force, Some(7));
    }

    #[test]
    fn malformed_payload_becomes_blank_reading() {
        let reading = DeviceReading::from_value(json!({ "pad": 17, "force": "strong" }));
        assert!(reading.pad.is_none());
        assert!(reading.force.is_none());

        let reading = DeviceReading::from_value(json!("not an object"));
        assert!(reading.pad.is_none());
    }

    #[test]
    fn extra_fields_are_ignored() {
        let reading = DeviceReading::from_value(json!({
            "pad": "GREEN",
            "force": 88,
            "duration": 2,
            "count": 14,
            "battery": 97
        }));
        assert_eq!(reading.pad.as_deref(), Some("GREEN"));
        assert_eq!(reading.duration, Some(2));
        assert_eq!(reading.count, Some(14));
    }
}
