//! Static level table driving round counts, pass thresholds, and timing rules.

use serde::Serialize;
use utoipa::ToSchema;

/// Number of rounds played per level unless overridden by configuration.
pub const DEFAULT_ROUND_COUNT: u32 = 5;

/// Pads shipped with the binary when no configuration file overrides them.
pub const DEFAULT_PADS: [&str; 3] = ["RED", "BLUE", "GREEN"];

#[derive(Debug, Clone, Serialize, ToSchema)]
/// Settings for one level of the color-match assessment.
///
/// Levels are indexed starting at 1. A level without a round time limit is
/// untimed: successes score a flat amount and no countdown is shown.
pub struct LevelConfig {
    /// Human readable level name (e.g. "Association").
    pub name: String,
    /// Rounds that must be played before the pass check runs.
    pub round_count: u32,
    /// Minimum accumulated level score required to pass (inclusive).
    pub pass_score: u32,
    /// Per-round countdown in seconds; `None` disables the round timer.
    pub round_time_limit_secs: Option<u64>,
    /// Whole-level countdown in seconds; `None` disables the level timer.
    pub level_time_limit_secs: Option<u64>,
    /// Minimum press force (0..=100) required for a match to count.
    pub min_force: u8,
    /// Instructional text shown before the level starts.
    pub description: String,
    /// Short goal statement for the level.
    pub goal: String,
}

impl LevelConfig {
    /// Whether successes in this level are speed-scored.
    pub fn is_timed(&self) -> bool {
        self.round_time_limit_secs.is_some()
    }
}

/// Built-in level table shipped with the binary.
pub fn default_levels() -> Vec<LevelConfig> {
    vec![
        LevelConfig {
            name: "Association".into(),
            round_count: DEFAULT_ROUND_COUNT,
            pass_score: 80,
            round_time_limit_secs: None,
            level_time_limit_secs: None,
            min_force: 10,
            description: "Take your time. Match 5 colors.".into(),
            goal: "Match each color at your own pace".into(),
        },
        LevelConfig {
            name: "Pacing".into(),
            round_count: DEFAULT_ROUND_COUNT,
            pass_score: 60,
            round_time_limit_secs: Some(10),
            level_time_limit_secs: None,
            min_force: 10,
            description: "You have 10 seconds! Be quick for high scores.".into(),
            goal: "Answer before the countdown runs out".into(),
        },
        LevelConfig {
            name: "Speed".into(),
            round_count: DEFAULT_ROUND_COUNT,
            pass_score: 75,
            round_time_limit_secs: Some(5),
            level_time_limit_secs: None,
            min_force: 10,
            description: "Fast! 5 seconds only.".into(),
            goal: "React as fast as you can".into(),
        },
        LevelConfig {
            name: "Strength".into(),
            round_count: DEFAULT_ROUND_COUNT,
            pass_score: 60,
            round_time_limit_secs: Some(5),
            level_time_limit_secs: None,
            min_force: 80,
            description: "Press HARD within 5 seconds!".into(),
            goal: "Combine speed with a firm press".into(),
        },
    ]
}
