//! Deadline bookkeeping for the session, level, round, and feedback timers.

use std::time::Duration;

use tokio::time::Instant;

/// Named countdown deadlines owned by the engine loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Whole-level countdown; expiry terminates the session.
    Level,
    /// Per-round countdown; expiry resolves the round with zero points.
    Round,
    /// Dwell delay between a round resolution and the next round.
    Feedback,
}

/// Tracks the three gameplay timers plus the total count-up clock.
///
/// Deadlines are plain instants polled by the engine loop rather than spawned
/// callbacks, so canceling one is a synchronous field clear and a stale expiry
/// can never fire into a later round or level.
#[derive(Debug, Default)]
pub struct TimerCoordinator {
    total_accumulated: Duration,
    total_running_since: Option<Instant>,
    level_deadline: Option<Instant>,
    round_deadline: Option<Instant>,
    feedback_deadline: Option<Instant>,
}

impl TimerCoordinator {
    /// Fresh coordinator with every timer stopped.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all deadlines and zero the total clock. Called when a new session
    /// starts.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Start (or resume) the total count-up clock.
    pub fn resume_total(&mut self) {
        if self.total_running_since.is_none() {
            self.total_running_since = Some(Instant::now());
        }
    }

    /// Pause the total clock, folding the running segment into the
    /// accumulated duration.
    pub fn pause_total(&mut self) {
        if let Some(since) = self.total_running_since.take() {
            self.total_accumulated += since.elapsed();
        }
    }

    /// Total active-play time accrued so far.
    pub fn total_elapsed(&self) -> Duration {
        let running = self
            .total_running_since
            .map(|since| since.elapsed())
            .unwrap_or_default();
        self.total_accumulated + running
    }

    /// Arm the level countdown, or clear it when the level has no limit.
    pub fn arm_level(&mut self, limit: Option<Duration>) {
        self.level_deadline = limit.map(|d| Instant::now() + d);
    }

    /// Arm the round countdown, or clear it when the level has no limit.
    pub fn arm_round(&mut self, limit: Option<Duration>) {
        self.round_deadline = limit.map(|d| Instant::now() + d);
    }

    /// Arm the feedback dwell delay.
    pub fn arm_feedback(&mut self, dwell: Duration) {
        self.feedback_deadline = Some(Instant::now() + dwell);
    }

    /// Clear one deadline without side effects.
    pub fn cancel(&mut self, kind: TimerKind) {
        match kind {
            TimerKind::Level => self.level_deadline = None,
            TimerKind::Round => self.round_deadline = None,
            TimerKind::Feedback => self.feedback_deadline = None,
        }
    }

    /// Clear every armed deadline. The total clock is left untouched.
    pub fn cancel_deadlines(&mut self) {
        self.level_deadline = None;
        self.round_deadline = None;
        self.feedback_deadline = None;
    }

    /// Seconds left on a countdown, saturating at zero. `None` when the timer
    /// is not armed.
    pub fn remaining_secs(&self, kind: TimerKind) -> Option<u64> {
        let deadline = match kind {
            TimerKind::Level => self.level_deadline,
            TimerKind::Round => self.round_deadline,
            TimerKind::Feedback => self.feedback_deadline,
        }?;
        Some(deadline.saturating_duration_since(Instant::now()).as_secs())
    }

    /// Earliest armed deadline, if any.
    ///
    /// The level timer wins ties so that a level expiry coinciding with a
    /// round expiry terminates the session rather than scoring a timeout.
    pub fn next_deadline(&self) -> Option<(TimerKind, Instant)> {
        let candidates = [
            (TimerKind::Level, self.level_deadline),
            (TimerKind::Round, self.round_deadline),
            (TimerKind::Feedback, self.feedback_deadline),
        ];

        let mut earliest: Option<(TimerKind, Instant)> = None;
        for (kind, deadline) in candidates {
            let Some(at) = deadline else { continue };
            match earliest {
                Some((_, best)) if best <= at => {}
                _ => earliest = Some((kind, at)),
            }
        }
        earliest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn total_clock_accumulates_only_while_running() {
        let mut timers = TimerCoordinator::new();
        timers.resume_total();
        tokio::time::advance(Duration::from_secs(3)).await;
        timers.pause_total();
        tokio::time::advance(Duration::from_secs(10)).await;
        assert_eq!(timers.total_elapsed().as_secs(), 3);

        timers.resume_total();
        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(timers.total_elapsed().as_secs(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn round_deadline_counts_down_and_cancels_cleanly() {
        let mut timers = TimerCoordinator::new();
        timers.arm_round(Some(Duration::from_secs(5)));
        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(timers.remaining_secs(TimerKind::Round), Some(3));

        timers.cancel(TimerKind::Round);
        assert_eq!(timers.remaining_secs(TimerKind::Round), None);
        assert!(timers.next_deadline().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn unlimited_round_has_no_deadline() {
        let mut timers = TimerCoordinator::new();
        timers.arm_round(None);
        assert!(timers.next_deadline().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn earliest_deadline_wins_and_level_breaks_ties() {
        let mut timers = TimerCoordinator::new();
        timers.arm_level(Some(Duration::from_secs(5)));
        timers.arm_round(Some(Duration::from_secs(2)));
        let (kind, _) = timers.next_deadline().expect("deadline armed");
        assert_eq!(kind, TimerKind::Round);

        timers.arm_round(Some(Duration::from_secs(5)));
        let (kind, _) = timers.next_deadline().expect("deadline armed");
        assert_eq!(kind, TimerKind::Level);
    }
}
