//! Session state machine orchestrating level and round progression.
//!
//! The engine owns every piece of mutable session state and is only ever
//! driven from the single runner task, so handlers run strictly one at a
//! time. Sensor events received outside the `Playing` phase are discarded,
//! which also resolves the race between a human press and a round timeout
//! firing in the same tick.

use std::{sync::Arc, time::Duration};

use serde::Serialize;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    config::AppConfig,
    engine::{
        event::SensorEvent,
        levels::LevelConfig,
        scoring::{
            Engagement, TIMEOUT_PENALTY_SECS, check_level_pass, classify_engagement, score_success,
        },
        timers::{TimerCoordinator, TimerKind},
    },
};

/// Dwell period between a round resolution and the automatic advance.
pub const FEEDBACK_DWELL: Duration = Duration::from_millis(1500);

/// Phases the session can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No session is running.
    Idle,
    /// Waiting for the learner to pick a display mode.
    FullscreenPrompt,
    /// Showing the current level's instructions.
    Instructions,
    /// A round is open and sensor events are accepted.
    Playing,
    /// Dwell period after a round resolved, before the auto-advance.
    Feedback,
    /// Transient evaluation of the level score against the pass threshold.
    CheckingPass,
    /// Level passed; waiting for the learner to proceed.
    LevelComplete,
    /// Level failed; gameplay is over but the summary is not yet saved.
    Failed,
    /// Terminal state; the session summary has been produced.
    Finished,
}

impl Phase {
    /// Whether the session has reached its terminal state.
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Finished)
    }
}

/// How a finished session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Every configured level was passed.
    Completed,
    /// A level's pass check failed and the learner saved their progress.
    Failed,
    /// The session was ended early by an explicit action.
    Cancelled,
    /// The level countdown ran out mid-gameplay.
    LevelTimeExpired,
}

/// One open target prompt. Created when a round begins and replaced when it
/// resolves; wrong-pad presses leave it in place.
#[derive(Debug, Clone)]
pub struct RoundState {
    /// 1-based level the round belongs to.
    pub level_index: usize,
    /// 1-based round number within the level.
    pub round_index: u32,
    /// Pad the learner must press.
    pub target_pad: String,
    /// When the prompt was shown, for reaction-time measurement.
    pub started_at: Instant,
}

/// Terminal artifact handed to the persistence collaborator exactly once.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SessionSummary {
    /// Identifier assigned to this session at start.
    pub session_id: Uuid,
    /// Learner the session belongs to.
    pub learner_id: i64,
    /// Activity identifier in the surrounding portal.
    pub activity_id: i64,
    /// Final total score across all levels.
    pub total_score: u32,
    /// Active-play time in whole seconds.
    pub total_duration_seconds: u64,
    /// Post-hoc engagement classification.
    pub engagement_level: Engagement,
    /// Highest level reached (1-based).
    pub reached_level: u32,
    /// How the session ended.
    pub outcome: Outcome,
}

/// Audio/visual cue hint for the presentation layer. The engine emits cues
/// instead of playing effects so it stays free of I/O.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackCue {
    /// Correct pad with sufficient force.
    Success,
    /// Round timeout or level failure.
    Fail,
    /// Level passed.
    LevelUp,
    /// Wrong pad or insufficient force; the round stays open.
    Wrong,
}

/// Side effects a handler asks the runner to perform.
#[derive(Debug, Clone)]
pub enum Effect {
    /// The phase (or the projected view) changed and should be broadcast.
    PhaseChanged,
    /// A new round opened with the given target.
    RoundStarted {
        /// 1-based level index.
        level: usize,
        /// 1-based round number.
        round: u32,
        /// Pad the learner must press.
        target_pad: String,
    },
    /// A round resolved with the given points.
    RoundResolved {
        /// Points awarded (0 for a timeout).
        points: u32,
        /// Cue for the presentation layer.
        cue: FeedbackCue,
    },
    /// Feedback that does not resolve the round (wrong pad, weak press).
    Feedback {
        /// Cue for the presentation layer.
        cue: FeedbackCue,
    },
    /// The session reached its terminal state; persist the summary.
    Finished(SessionSummary),
}

/// Error returned when an action cannot be applied in the current phase.
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    /// The requested action is not valid from the current phase.
    #[error("invalid transition: `{action}` cannot be applied while in {phase:?}")]
    InvalidTransition {
        /// Action that was attempted.
        action: &'static str,
        /// Phase the engine was in.
        phase: Phase,
    },
    /// The engine task is no longer running.
    #[error("session engine is not running")]
    Unavailable,
}

/// State machine for one learner session.
pub struct SessionEngine {
    config: Arc<AppConfig>,
    timers: TimerCoordinator,
    phase: Phase,
    session_id: Uuid,
    learner_id: i64,
    activity_id: i64,
    fullscreen: Option<bool>,
    level_index: usize,
    round_index: u32,
    round: Option<RoundState>,
    level_score: u32,
    total_score: u32,
    reaction_samples: Vec<f64>,
    mistakes: u32,
    message: String,
    summary: Option<SessionSummary>,
}

impl SessionEngine {
    /// Fresh engine in the idle phase.
    pub fn new(config: Arc<AppConfig>) -> Self {
        Self {
            config,
            timers: TimerCoordinator::new(),
            phase: Phase::Idle,
            session_id: Uuid::nil(),
            learner_id: 0,
            activity_id: 0,
            fullscreen: None,
            level_index: 1,
            round_index: 1,
            round: None,
            level_score: 0,
            total_score: 0,
            reaction_samples: Vec::new(),
            mistakes: 0,
            message: "Press start to begin".into(),
            summary: None,
        }
    }

    /// Begin a new session, resetting every counter and timer.
    pub fn start(&mut self, learner_id: i64, activity_id: i64) -> Result<Vec<Effect>, EngineError> {
        if !matches!(self.phase, Phase::Idle | Phase::Finished) {
            return Err(self.invalid("start"));
        }

        self.session_id = Uuid::new_v4();
        self.learner_id = learner_id;
        self.activity_id = activity_id;
        self.fullscreen = None;
        self.level_index = 1;
        self.round_index = 1;
        self.round = None;
        self.level_score = 0;
        self.total_score = 0;
        self.reaction_samples.clear();
        self.mistakes = 0;
        self.summary = None;
        self.timers.reset();
        self.phase = Phase::FullscreenPrompt;
        self.message = "Choose your display mode".into();

        Ok(vec![Effect::PhaseChanged])
    }

    /// Record the display-mode choice and advance to the instructions.
    pub fn choose_fullscreen(&mut self, enabled: bool) -> Result<Vec<Effect>, EngineError> {
        if self.phase != Phase::FullscreenPrompt {
            return Err(self.invalid("choose_fullscreen"));
        }

        self.fullscreen = Some(enabled);
        self.phase = Phase::Instructions;
        self.message = self.level_intro();
        Ok(vec![Effect::PhaseChanged])
    }

    /// Leave the instructions and start the current level's first round.
    pub fn acknowledge_instructions(&mut self) -> Result<Vec<Effect>, EngineError> {
        if self.phase != Phase::Instructions {
            return Err(self.invalid("acknowledge_instructions"));
        }

        let config = Arc::clone(&self.config);
        let Some(level) = config.level(self.level_index) else {
            warn!(level = self.level_index, "level missing from table");
            return Err(self.invalid("acknowledge_instructions"));
        };

        self.timers
            .arm_level(level.level_time_limit_secs.map(Duration::from_secs));
        self.timers.resume_total();
        self.phase = Phase::Playing;
        let started = self.start_round(level);
        Ok(vec![Effect::PhaseChanged, started])
    }

    /// Advance past a completed level, or finish the session after the last.
    pub fn proceed_next_level(&mut self) -> Result<Vec<Effect>, EngineError> {
        if self.phase != Phase::LevelComplete {
            return Err(self.invalid("proceed_next_level"));
        }

        if self.level_index >= self.config.level_count() {
            return Ok(self.finish_with(Outcome::Completed));
        }

        self.level_index += 1;
        self.level_score = 0;
        self.round_index = 1;
        self.phase = Phase::Instructions;
        self.message = self.level_intro();
        Ok(vec![Effect::PhaseChanged])
    }

    /// End the session early, preserving whatever score and time accrued.
    ///
    /// From `Failed` this is the explicit "finish and save" action and the
    /// outcome is `failed`; from any other non-terminal state the outcome is
    /// `cancelled`.
    pub fn finish_early(&mut self) -> Result<Vec<Effect>, EngineError> {
        match self.phase {
            Phase::Idle | Phase::Finished => Err(self.invalid("finish")),
            Phase::Failed => Ok(self.finish_with(Outcome::Failed)),
            _ => Ok(self.finish_with(Outcome::Cancelled)),
        }
    }

    /// Feed one normalized sensor event into the session.
    ///
    /// Events are discarded outside of `Playing`, so a press that loses the
    /// race against a timeout can never score an already-resolved round.
    pub fn handle_sensor(&mut self, event: SensorEvent) -> Vec<Effect> {
        if self.phase != Phase::Playing {
            debug!(phase = ?self.phase, pad = %event.pad, "discarding sensor event");
            return Vec::new();
        }
        let Some(target) = self.round.as_ref().map(|r| r.target_pad.clone()) else {
            return Vec::new();
        };
        let config = Arc::clone(&self.config);
        let Some(level) = config.level(self.level_index) else {
            return Vec::new();
        };

        if !event.is_blank() && event.pad == target {
            if event.force >= level.min_force {
                return self.resolve_success(level);
            }
            self.message = format!("Push harder! (force {}%)", event.force);
            return vec![Effect::Feedback {
                cue: FeedbackCue::Wrong,
            }];
        }

        self.message = if event.is_blank() {
            format!("No pad detected. Find {target}")
        } else {
            format!("Wrong! That was {}. Find {target}", event.pad)
        };
        vec![Effect::Feedback {
            cue: FeedbackCue::Wrong,
        }]
    }

    /// React to an expired deadline. The deadline is cleared first so a
    /// stale expiry can never be observed twice.
    pub fn handle_timer(&mut self, kind: TimerKind) -> Vec<Effect> {
        self.timers.cancel(kind);
        match kind {
            TimerKind::Round => self.on_round_timeout(),
            TimerKind::Feedback => self.on_feedback_elapsed(),
            TimerKind::Level => self.on_level_expired(),
        }
    }

    /// Earliest armed deadline for the runner's select loop.
    pub fn next_deadline(&self) -> Option<(TimerKind, Instant)> {
        self.timers.next_deadline()
    }

    fn resolve_success(&mut self, level: &LevelConfig) -> Vec<Effect> {
        let Some(round) = self.round.take() else {
            return Vec::new();
        };

        self.timers.cancel(TimerKind::Round);
        let reaction = round.started_at.elapsed().as_secs_f64();
        let points = score_success(level, reaction);
        self.reaction_samples.push(reaction);
        self.level_score += points;
        self.total_score += points;
        self.message = format!("Great! +{points} pts");
        self.enter_feedback();

        vec![
            Effect::RoundResolved {
                points,
                cue: FeedbackCue::Success,
            },
            Effect::PhaseChanged,
        ]
    }

    fn on_round_timeout(&mut self) -> Vec<Effect> {
        if self.phase != Phase::Playing {
            warn!(phase = ?self.phase, "ignoring stale round timeout");
            return Vec::new();
        }

        self.round = None;
        self.mistakes += 1;
        self.reaction_samples.push(TIMEOUT_PENALTY_SECS);
        self.message = "Time's up! (0 points)".into();
        self.enter_feedback();

        vec![
            Effect::RoundResolved {
                points: 0,
                cue: FeedbackCue::Fail,
            },
            Effect::PhaseChanged,
        ]
    }

    fn on_feedback_elapsed(&mut self) -> Vec<Effect> {
        if self.phase != Phase::Feedback {
            warn!(phase = ?self.phase, "ignoring stale feedback dwell");
            return Vec::new();
        }

        let config = Arc::clone(&self.config);
        let Some(level) = config.level(self.level_index) else {
            return Vec::new();
        };

        if self.round_index < level.round_count {
            self.round_index += 1;
            self.phase = Phase::Playing;
            let started = self.start_round(level);
            return vec![Effect::PhaseChanged, started];
        }

        self.phase = Phase::CheckingPass;
        self.resolve_pass_check(level)
    }

    fn resolve_pass_check(&mut self, level: &LevelConfig) -> Vec<Effect> {
        if check_level_pass(self.level_score, level.pass_score) {
            self.timers.cancel(TimerKind::Level);
            self.timers.pause_total();
            self.phase = Phase::LevelComplete;
            self.message = format!("Level {} complete!", self.level_index);
            vec![
                Effect::Feedback {
                    cue: FeedbackCue::LevelUp,
                },
                Effect::PhaseChanged,
            ]
        } else {
            self.timers.cancel_deadlines();
            self.timers.pause_total();
            self.phase = Phase::Failed;
            self.message = format!(
                "You scored {} points on level {}; {} needed to continue",
                self.level_score, self.level_index, level.pass_score
            );
            vec![
                Effect::Feedback {
                    cue: FeedbackCue::Fail,
                },
                Effect::PhaseChanged,
            ]
        }
    }

    fn on_level_expired(&mut self) -> Vec<Effect> {
        if !matches!(
            self.phase,
            Phase::Playing | Phase::Feedback | Phase::CheckingPass
        ) {
            warn!(phase = ?self.phase, "ignoring stale level expiry");
            return Vec::new();
        }
        self.finish_with(Outcome::LevelTimeExpired)
    }

    fn finish_with(&mut self, outcome: Outcome) -> Vec<Effect> {
        self.timers.cancel_deadlines();
        self.timers.pause_total();
        self.round = None;

        let summary = SessionSummary {
            session_id: self.session_id,
            learner_id: self.learner_id,
            activity_id: self.activity_id,
            total_score: self.total_score,
            total_duration_seconds: self.timers.total_elapsed().as_secs(),
            engagement_level: classify_engagement(&self.reaction_samples, self.mistakes),
            reached_level: self.level_index as u32,
            outcome,
        };

        self.summary = Some(summary.clone());
        self.phase = Phase::Finished;
        self.message = match outcome {
            Outcome::Completed => "Mission accomplished!".into(),
            Outcome::Failed => "Session ended".into(),
            Outcome::Cancelled => "Session cancelled".into(),
            Outcome::LevelTimeExpired => "Level time expired".into(),
        };

        vec![Effect::PhaseChanged, Effect::Finished(summary)]
    }

    fn start_round(&mut self, level: &LevelConfig) -> Effect {
        let target = {
            use rand::Rng;
            let pads = &self.config.pads;
            pads[rand::rng().random_range(0..pads.len())].clone()
        };

        self.message = if level.min_force >= 50 {
            format!("Press {target} HARD!")
        } else {
            format!("Press {target}")
        };
        self.round = Some(RoundState {
            level_index: self.level_index,
            round_index: self.round_index,
            target_pad: target.clone(),
            started_at: Instant::now(),
        });
        self.timers
            .arm_round(level.round_time_limit_secs.map(Duration::from_secs));

        Effect::RoundStarted {
            level: self.level_index,
            round: self.round_index,
            target_pad: target,
        }
    }

    fn enter_feedback(&mut self) {
        self.phase = Phase::Feedback;
        self.timers.arm_feedback(FEEDBACK_DWELL);
    }

    fn level_intro(&self) -> String {
        match self.config.level(self.level_index) {
            Some(level) => format!(
                "Level {}: {} - {}",
                self.level_index, level.name, level.description
            ),
            None => format!("Level {}", self.level_index),
        }
    }

    fn invalid(&self, action: &'static str) -> EngineError {
        EngineError::InvalidTransition {
            action,
            phase: self.phase,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Identifier of the running (or last) session.
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Shared configuration backing this engine.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Settings of the current level, when the index is valid.
    pub fn current_level(&self) -> Option<&LevelConfig> {
        self.config.level(self.level_index)
    }

    /// 1-based index of the current level.
    pub fn level_index(&self) -> usize {
        self.level_index
    }

    /// 1-based number of the current round within the level.
    pub fn round_index(&self) -> u32 {
        self.round_index
    }

    /// Target pad of the open round, if one is open.
    pub fn target_pad(&self) -> Option<&str> {
        self.round.as_ref().map(|r| r.target_pad.as_str())
    }

    /// Score accumulated across the whole session.
    pub fn total_score(&self) -> u32 {
        self.total_score
    }

    /// Score accumulated in the current level.
    pub fn level_score(&self) -> u32 {
        self.level_score
    }

    /// Timeouts recorded so far.
    pub fn mistake_count(&self) -> u32 {
        self.mistakes
    }

    /// Display-mode choice made at session start, once prompted.
    pub fn fullscreen(&self) -> Option<bool> {
        self.fullscreen
    }

    /// Latest feedback message for the presentation layer.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Terminal summary, present once the session finished.
    pub fn summary(&self) -> Option<&SessionSummary> {
        self.summary.as_ref()
    }

    /// Active-play seconds accrued so far.
    pub fn total_elapsed_secs(&self) -> u64 {
        self.timers.total_elapsed().as_secs()
    }

    /// Seconds left on the level countdown, when armed.
    pub fn level_time_remaining(&self) -> Option<u64> {
        self.timers.remaining_secs(TimerKind::Level)
    }

    /// Seconds left on the round countdown, when armed.
    pub fn round_time_remaining(&self) -> Option<u64> {
        self.timers.remaining_secs(TimerKind::Round)
    }
}
