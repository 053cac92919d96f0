use serde::Serialize;
use utoipa::ToSchema;

use crate::engine::session::Phase;

/// Session phase as exposed to HTTP and SSE clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum VisiblePhase {
    /// No session is running.
    Idle,
    /// Waiting for the display-mode choice.
    FullscreenPrompt,
    /// Showing the current level's instructions.
    Instructions,
    /// A round is open.
    Playing,
    /// Dwell period after a round resolved.
    Feedback,
    /// Evaluating the level score against the pass threshold.
    CheckingPass,
    /// Level passed; waiting for the next-level action.
    LevelComplete,
    /// Level failed; waiting for the finish action.
    Failed,
    /// Session is over and its summary has been produced.
    Finished,
}

impl From<Phase> for VisiblePhase {
    fn from(phase: Phase) -> Self {
        match phase {
            Phase::Idle => VisiblePhase::Idle,
            Phase::FullscreenPrompt => VisiblePhase::FullscreenPrompt,
            Phase::Instructions => VisiblePhase::Instructions,
            Phase::Playing => VisiblePhase::Playing,
            Phase::Feedback => VisiblePhase::Feedback,
            Phase::CheckingPass => VisiblePhase::CheckingPass,
            Phase::LevelComplete => VisiblePhase::LevelComplete,
            Phase::Failed => VisiblePhase::Failed,
            Phase::Finished => VisiblePhase::Finished,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_in_snake_case() {
        let json = serde_json::to_string(&VisiblePhase::FullscreenPrompt).unwrap();
        assert_eq!(json, "\"fullscreen_prompt\"");
        let json = serde_json::to_string(&VisiblePhase::LevelComplete).unwrap();
        assert_eq!(json, "\"level_complete\"");
    }
}
