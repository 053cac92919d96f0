//! Canonical sensor event produced from heterogeneous device payloads.

use tokio::time::Instant;

use crate::dto::device::DeviceReading;

/// One normalized press signal, alive only for the duration of a dispatch.
#[derive(Debug, Clone)]
pub struct SensorEvent {
    /// Uppercased pad identifier; empty when the device sent none.
    pub pad: String,
    /// Press magnitude clamped to 0..=100.
    pub force: u8,
    /// When the relay received the signal.
    pub occurred_at: Instant,
}

impl SensorEvent {
    /// Normalize a raw reading into the canonical event shape.
    ///
    /// Never fails: a missing pad becomes an empty string (matched by no
    /// target) and a missing or out-of-range force saturates into 0..=100.
    pub fn normalize(reading: &DeviceReading) -> Self {
        let pad = reading
            .pad
            .as_deref()
            .unwrap_or_default()
            .trim()
            .to_uppercase();
        let force = reading.force.unwrap_or(0).clamp(0, 100) as u8;

        Self {
            pad,
            force,
            occurred_at: Instant::now(),
        }
    }

    /// Whether the event carries no usable pad identifier.
    pub fn is_blank(&self) -> bool {
        self.pad.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pad_is_uppercased_for_case_insensitive_matching() {
        let reading = DeviceReading {
            pad: Some("  green ".into()),
            force: Some(55),
            ..Default::default()
        };
        let event = SensorEvent::normalize(&reading);
        assert_eq!(event.pad, "GREEN");
        assert_eq!(event.force, 55);
        assert!(!event.is_blank());
    }

    #[test]
    fn missing_fields_default_instead_of_failing() {
        let event = SensorEvent::normalize(&DeviceReading::default());
        assert!(event.is_blank());
        assert_eq!(event.force, 0);
    }

    #[test]
    fn force_is_clamped_into_range() {
        let reading = DeviceReading {
            pad: Some("RED".into()),
            force: Some(1024),
            ..Default::default()
        };
        assert_eq!(SensorEvent::normalize(&reading).force, 100);

        let reading = DeviceReading {
            pad: Some("RED".into()),
            force: Some(-3),
            ..Default::default()
        };
        assert_eq!(SensorEvent::normalize(&reading).force, 0);
    }
}
