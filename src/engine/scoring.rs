//! Pure scoring and post-session engagement classification.

use serde::Serialize;
use utoipa::ToSchema;

use crate::engine::levels::LevelConfig;

/// Points awarded for any success in an untimed level.
pub const UNTIMED_SUCCESS_POINTS: u32 = 20;
/// Base points for a success in a timed level, before the speed bonus.
pub const TIMED_BASE_POINTS: u32 = 10;
/// Maximum speed bonus on top of the timed base.
pub const MAX_SPEED_BONUS: i64 = 10;
/// Reaction-time sample recorded for a round that timed out, keeping the
/// average meaningful when no press arrived at all.
pub const TIMEOUT_PENALTY_SECS: f64 = 10.0;

/// Post-hoc qualitative engagement classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Engagement {
    /// Slow reactions or many mistakes.
    Low,
    /// Everything in between; also the fallback for empty sessions.
    Medium,
    /// Fast reactions and few mistakes.
    High,
}

/// Points for a successful round.
///
/// Untimed levels award a flat score regardless of reaction time. Timed levels
/// award a base plus a speed bonus that loses one point per half second of
/// reaction time, so the total stays within `[10, 20]`.
pub fn score_success(level: &LevelConfig, reaction_secs: f64) -> u32 {
    if !level.is_timed() {
        return UNTIMED_SUCCESS_POINTS;
    }

    let halves = (reaction_secs * 2.0).floor() as i64;
    let bonus = (MAX_SPEED_BONUS - halves).clamp(0, MAX_SPEED_BONUS) as u32;
    TIMED_BASE_POINTS + bonus
}

/// Whether the accumulated level score meets the pass threshold (inclusive).
pub fn check_level_pass(level_score: u32, pass_score: u32) -> bool {
    level_score >= pass_score
}

/// Classify engagement from the recorded reaction-time samples and mistakes.
///
/// Samples include the fixed timeout penalty for rounds that expired. A
/// session with no samples at all (cancelled before any round resolved) is
/// classified as `Medium`.
pub fn classify_engagement(samples: &[f64], mistakes: u32) -> Engagement {
    if samples.is_empty() {
        return Engagement::Medium;
    }

    let average = samples.iter().sum::<f64>() / samples.len() as f64;

    if average < 2.5 && mistakes < 3 {
        Engagement::High
    } else if average > 5.0 || mistakes > 5 {
        Engagement::Low
    } else {
        Engagement::Medium
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::levels::default_levels;

    fn level(index: usize) -> LevelConfig {
        default_levels()[index - 1].clone()
    }

    #[test]
    fn untimed_level_awards_flat_points() {
        let association = level(1);
        assert_eq!(score_success(&association, 0.1), 20);
        assert_eq!(score_success(&association, 42.0), 20);
    }

    #[test]
    fn timed_level_scores_stay_within_bounds() {
        let speed = level(3);
        assert_eq!(score_success(&speed, 0.0), 20);
        assert_eq!(score_success(&speed, 0.4), 20);
        assert_eq!(score_success(&speed, 2.0), 16);
        assert_eq!(score_success(&speed, 4.9), 11);
        assert_eq!(score_success(&speed, 5.0), 10);
        assert_eq!(score_success(&speed, 60.0), 10);
    }

    #[test]
    fn timed_score_never_increases_with_reaction_time() {
        let pacing = level(2);
        let mut previous = u32::MAX;
        for tenths in 0..120 {
            let points = score_success(&pacing, f64::from(tenths) / 10.0);
            assert!(points <= previous);
            assert!((10..=20).contains(&points));
            previous = points;
        }
    }

    #[test]
    fn pass_threshold_is_inclusive() {
        assert!(check_level_pass(60, 60));
        assert!(!check_level_pass(59, 60));
    }

    #[test]
    fn engagement_classification_matches_thresholds() {
        assert_eq!(classify_engagement(&[2.0], 1), Engagement::High);
        assert_eq!(classify_engagement(&[6.0], 0), Engagement::Low);
        assert_eq!(classify_engagement(&[3.0], 4), Engagement::Medium);
        // Many mistakes push an otherwise fast session down to Low.
        assert_eq!(classify_engagement(&[1.0, 1.0], 6), Engagement::Low);
    }

    #[test]
    fn empty_sample_set_defaults_to_medium() {
        assert_eq!(classify_engagement(&[], 0), Engagement::Medium);
    }
}
