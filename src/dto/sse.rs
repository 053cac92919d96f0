use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    dto::game::SessionView,
    engine::session::{FeedbackCue, SessionSummary},
};

#[derive(Clone, Debug)]
/// Dispatched payload carried across the SSE channel.
pub struct ServerEvent {
    /// Optional event name used by `EventSource` listeners.
    pub event: Option<String>,
    /// Pre-serialized data field.
    pub data: String,
}

impl ServerEvent {
    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
/// Broadcast whenever the session state changes.
pub struct PhaseChangedEvent(pub SessionView);

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when a new round opens.
pub struct RoundStartedEvent {
    /// 1-based level index.
    pub level: usize,
    /// 1-based round number.
    pub round: u32,
    /// Pad the learner must press.
    pub target_pad: String,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when a round resolves, by success or timeout.
pub struct RoundResolvedEvent {
    /// Points awarded for this round (0 on timeout).
    pub points: u32,
    /// Cue for the presentation layer.
    pub cue: FeedbackCue,
    /// Total score after the resolution.
    pub score: u32,
    /// Level score after the resolution.
    pub level_score: u32,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast for feedback that does not resolve a round, and for the
/// level-up and failure cues.
pub struct FeedbackEvent {
    /// Cue for the presentation layer.
    pub cue: FeedbackCue,
    /// Human-readable feedback message.
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
/// Broadcast once when the session reaches its terminal state.
pub struct SessionFinishedEvent(pub SessionSummary);
