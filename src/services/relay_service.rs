use tracing::debug;

use crate::{
    dto::device::{DeviceAck, DeviceReading},
    services::sse_events,
    state::SharedState,
};

/// Accept a raw device payload, fan it out to SSE subscribers, and hand it to
/// the session engine.
///
/// The relay is deliberately tolerant: any JSON body is acknowledged, and a
/// payload that matches no known field names is forwarded as a blank reading.
pub fn ingest(state: &SharedState, payload: serde_json::Value) -> DeviceAck {
    let reading = DeviceReading::from_value(payload);
    debug!(pad = ?reading.pad, force = ?reading.force, "device reading received");

    sse_events::broadcast_reading(state.sse(), &reading);
    state.signals().publish(reading);

    DeviceAck::received()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use serde_json::json;

    use crate::{config::AppConfig, dao::NoopSessionStore, state::AppState};

    #[tokio::test]
    async fn ingest_acknowledges_and_fans_out() {
        let state = AppState::new(AppConfig::default(), Arc::new(NoopSessionStore));
        let mut events = state.sse().subscribe();
        let mut readings = state.signals().subscribe();

        let ack = ingest(&state, json!({ "fsr": "red", "pressure": 64 }));
        assert_eq!(ack.message, "data received");

        let event = events.recv().await.expect("event broadcast");
        assert_eq!(event.event.as_deref(), Some("fsr_update"));

        let reading = readings.recv().await.expect("reading forwarded");
        assert_eq!(reading.pad.as_deref(), Some("red"));
        assert_eq!(reading.force, Some(64));
    }

    #[tokio::test]
    async fn unusable_payload_is_still_acknowledged() {
        let state = AppState::new(AppConfig::default(), Arc::new(NoopSessionStore));
        let mut readings = state.signals().subscribe();

        ingest(&state, json!("not an object"));
        let reading = readings.recv().await.expect("reading forwarded");
        assert!(reading.pad.is_none());
    }
}
