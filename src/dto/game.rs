use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::phase::VisiblePhase,
    engine::session::{SessionEngine, SessionSummary},
};

/// Payload starting a new session for a learner.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct StartSessionRequest {
    /// Learner the session belongs to.
    #[validate(range(min = 1, message = "learner_id must be positive"))]
    pub learner_id: i64,
    /// Activity identifier in the surrounding portal.
    #[validate(range(min = 1, message = "activity_id must be positive"))]
    pub activity_id: i64,
}

/// Payload recording the learner's display-mode choice.
#[derive(Debug, Deserialize, ToSchema)]
pub struct FullscreenRequest {
    /// Whether the frontend entered fullscreen mode.
    pub enabled: bool,
}

/// Full projection of the session state, returned by every session route and
/// broadcast on the SSE stream whenever the state changes.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SessionView {
    /// Current phase.
    pub phase: VisiblePhase,
    /// Identifier of the running (or last finished) session.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<Uuid>,
    /// 1-based index of the current level.
    pub level: usize,
    /// Number of configured levels.
    pub level_count: usize,
    /// Name of the current level, when the index is valid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level_name: Option<String>,
    /// Goal statement of the current level.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level_goal: Option<String>,
    /// 1-based round number within the level.
    pub round: u32,
    /// Rounds played per level.
    pub round_count: u32,
    /// Target pad of the open round, when one is open.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_pad: Option<String>,
    /// Total score across the session.
    pub score: u32,
    /// Score accumulated in the current level.
    pub level_score: u32,
    /// Pass threshold of the current level.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pass_score: Option<u32>,
    /// Timeouts recorded so far.
    pub mistakes: u32,
    /// Latest feedback message for the presentation layer.
    pub message: String,
    /// Display-mode choice, once prompted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fullscreen: Option<bool>,
    /// Active-play seconds accrued so far.
    pub elapsed_seconds: u64,
    /// Seconds left on the level countdown, when armed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level_time_remaining: Option<u64>,
    /// Seconds left on the round countdown, when armed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub round_time_remaining: Option<u64>,
    /// Terminal summary, present once the session finished.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<SessionSummary>,
}

impl SessionView {
    /// Project the engine state into the client-facing shape.
    pub fn snapshot(engine: &SessionEngine) -> Self {
        let level = engine.current_level();
        Self {
            phase: engine.phase().into(),
            session_id: Some(engine.session_id()).filter(|id| !id.is_nil()),
            level: engine.level_index(),
            level_count: engine.config().level_count(),
            level_name: level.map(|l| l.name.clone()),
            level_goal: level.map(|l| l.goal.clone()),
            round: engine.round_index(),
            round_count: level.map(|l| l.round_count).unwrap_or_default(),
            target_pad: engine.target_pad().map(str::to_owned),
            score: engine.total_score(),
            level_score: engine.level_score(),
            pass_score: level.map(|l| l.pass_score),
            mistakes: engine.mistake_count(),
            message: engine.message().to_owned(),
            fullscreen: engine.fullscreen(),
            elapsed_seconds: engine.total_elapsed_secs(),
            level_time_remaining: engine.level_time_remaining(),
            round_time_remaining: engine.round_time_remaining(),
            summary: engine.summary().cloned(),
        }
    }
}
