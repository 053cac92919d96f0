use serde::Serialize;
use tracing::warn;

use crate::{
    dto::{
        device::DeviceReading,
        game::SessionView,
        sse::{
            FeedbackEvent, PhaseChangedEvent, RoundResolvedEvent, RoundStartedEvent, ServerEvent,
            SessionFinishedEvent,
        },
    },
    engine::session::{FeedbackCue, SessionSummary},
    state::SseHub,
};

const EVENT_FSR_UPDATE: &str = "fsr_update";
const EVENT_PHASE_CHANGED: &str = "phase_changed";
const EVENT_ROUND_STARTED: &str = "round_started";
const EVENT_ROUND_RESOLVED: &str = "round_resolved";
const EVENT_FEEDBACK: &str = "feedback";
const EVENT_SESSION_FINISHED: &str = "session_finished";

/// Broadcast a raw device reading, exactly as it was received.
pub fn broadcast_reading(hub: &SseHub, reading: &DeviceReading) {
    send_event(hub, EVENT_FSR_UPDATE, reading);
}

/// Broadcast the full session projection after a state change.
pub fn broadcast_phase_changed(hub: &SseHub, view: &SessionView) {
    send_event(hub, EVENT_PHASE_CHANGED, &PhaseChangedEvent(view.clone()));
}

/// Broadcast that a new round opened with the given target.
pub fn broadcast_round_started(hub: &SseHub, level: usize, round: u32, target_pad: String) {
    let payload = RoundStartedEvent {
        level,
        round,
        target_pad,
    };
    send_event(hub, EVENT_ROUND_STARTED, &payload);
}

/// Broadcast a round resolution together with the updated scores.
pub fn broadcast_round_resolved(hub: &SseHub, points: u32, cue: FeedbackCue, view: &SessionView) {
    let payload = RoundResolvedEvent {
        points,
        cue,
        score: view.score,
        level_score: view.level_score,
    };
    send_event(hub, EVENT_ROUND_RESOLVED, &payload);
}

/// Broadcast an audio/visual cue with its feedback message.
pub fn broadcast_feedback(hub: &SseHub, cue: FeedbackCue, message: &str) {
    let payload = FeedbackEvent {
        cue,
        message: message.to_string(),
    };
    send_event(hub, EVENT_FEEDBACK, &payload);
}

/// Broadcast the terminal session summary.
pub fn broadcast_session_finished(hub: &SseHub, summary: &SessionSummary) {
    send_event(
        hub,
        EVENT_SESSION_FINISHED,
        &SessionFinishedEvent(summary.clone()),
    );
}

fn send_event(hub: &SseHub, event: &str, payload: &impl Serialize) {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(event) => hub.broadcast(event),
        Err(err) => warn!(event, error = %err, "failed to serialize SSE payload"),
    }
}
