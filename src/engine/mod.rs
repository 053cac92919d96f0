//! Color-match game engine: levels, scoring, timers, and the session task.

/// Canonical sensor event derived from raw device readings.
pub mod event;
/// Level table and per-level settings.
pub mod levels;
/// Engine task, command channel, and view fan-out.
pub mod runner;
/// Pure scoring and engagement classification.
pub mod scoring;
/// Session state machine.
pub mod session;
/// Deadline bookkeeping for gameplay timers.
pub mod timers;
