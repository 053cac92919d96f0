//! Single-task runner that serializes every input to the session engine.
//!
//! HTTP handlers, sensor readings, and timer expirations all funnel into one
//! spawned task that owns the [`SessionEngine`]. Handlers therefore never
//! contend on a lock, and a timer can never observe the engine mid-update.
//! Deadlines are recomputed from the engine on every loop iteration, so a
//! deadline cleared by a handler simply stops being polled.

use std::sync::Arc;

use tokio::{
    sync::{broadcast, broadcast::error::RecvError, mpsc, oneshot, watch},
    time::{Instant, sleep_until},
};
use tracing::{debug, warn};

use crate::{
    config::AppConfig,
    dao::SessionStore,
    dto::{device::DeviceReading, game::SessionView},
    engine::{
        event::SensorEvent,
        session::{Effect, EngineError, SessionEngine},
    },
    services::sse_events,
    state::{SignalHub, SseHub},
};

type Reply = oneshot::Sender<Result<SessionView, EngineError>>;

/// Commands sent from HTTP handlers to the engine task.
enum EngineCommand {
    Start {
        learner_id: i64,
        activity_id: i64,
        reply: Reply,
    },
    ChooseFullscreen {
        enabled: bool,
        reply: Reply,
    },
    AcknowledgeInstructions {
        reply: Reply,
    },
    ProceedNextLevel {
        reply: Reply,
    },
    Finish {
        reply: Reply,
    },
}

/// Cheap handle to the engine task. Clones share the same command channel and
/// the same view watch channel.
#[derive(Clone)]
pub struct EngineHandle {
    commands: mpsc::UnboundedSender<EngineCommand>,
    view: watch::Receiver<SessionView>,
}

impl EngineHandle {
    /// Begin a new session.
    pub async fn start(
        &self,
        learner_id: i64,
        activity_id: i64,
    ) -> Result<SessionView, EngineError> {
        self.send(|reply| EngineCommand::Start {
            learner_id,
            activity_id,
            reply,
        })
        .await
    }

    /// Record the display-mode choice.
    pub async fn choose_fullscreen(&self, enabled: bool) -> Result<SessionView, EngineError> {
        self.send(|reply| EngineCommand::ChooseFullscreen { enabled, reply })
            .await
    }

    /// Leave the instructions and start the current level.
    pub async fn acknowledge_instructions(&self) -> Result<SessionView, EngineError> {
        self.send(|reply| EngineCommand::AcknowledgeInstructions { reply })
            .await
    }

    /// Advance past a completed level.
    pub async fn proceed_next_level(&self) -> Result<SessionView, EngineError> {
        self.send(|reply| EngineCommand::ProceedNextLevel { reply })
            .await
    }

    /// End the session early, preserving accrued score and time.
    pub async fn finish(&self) -> Result<SessionView, EngineError> {
        self.send(|reply| EngineCommand::Finish { reply }).await
    }

    /// Latest session projection.
    pub fn view(&self) -> SessionView {
        self.view.borrow().clone()
    }

    /// Subscribe to session projection updates.
    pub fn watch(&self) -> watch::Receiver<SessionView> {
        self.view.clone()
    }

    async fn send(
        &self,
        make: impl FnOnce(Reply) -> EngineCommand,
    ) -> Result<SessionView, EngineError> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(make(tx))
            .map_err(|_| EngineError::Unavailable)?;
        rx.await.map_err(|_| EngineError::Unavailable)?
    }
}

/// Spawn the engine task and return a handle to it.
pub fn spawn_engine(
    config: Arc<AppConfig>,
    signals: &SignalHub,
    sse: SseHub,
    store: Arc<dyn SessionStore>,
) -> EngineHandle {
    let engine = SessionEngine::new(config);
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let (view_tx, view_rx) = watch::channel(SessionView::snapshot(&engine));
    let readings = signals.subscribe();

    tokio::spawn(run(engine, cmd_rx, readings, view_tx, sse, store));

    EngineHandle {
        commands: cmd_tx,
        view: view_rx,
    }
}

async fn run(
    mut engine: SessionEngine,
    mut commands: mpsc::UnboundedReceiver<EngineCommand>,
    mut readings: broadcast::Receiver<DeviceReading>,
    view_tx: watch::Sender<SessionView>,
    sse: SseHub,
    store: Arc<dyn SessionStore>,
) {
    let mut signals_open = true;

    loop {
        let deadline = engine.next_deadline();

        tokio::select! {
            command = commands.recv() => {
                let Some(command) = command else {
                    debug!("all engine handles dropped; stopping engine task");
                    break;
                };
                apply_command(&mut engine, command, &view_tx, &sse, &store);
            }
            reading = readings.recv(), if signals_open => {
                match reading {
                    Ok(reading) => {
                        let event = SensorEvent::normalize(&reading);
                        let effects = engine.handle_sensor(event);
                        if !effects.is_empty() {
                            publish(&engine, &effects, &view_tx, &sse, &store);
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "sensor fan-out lagged; dropping readings");
                    }
                    Err(RecvError::Closed) => {
                        signals_open = false;
                    }
                }
            }
            _ = wait_until(deadline.map(|(_, at)| at)) => {
                if let Some((kind, _)) = deadline {
                    let effects = engine.handle_timer(kind);
                    if !effects.is_empty() {
                        publish(&engine, &effects, &view_tx, &sse, &store);
                    }
                }
            }
        }
    }
}

/// Sleep until the deadline, or forever when no timer is armed so the other
/// select branches stay in charge.
async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => sleep_until(at).await,
        None => std::future::pending().await,
    }
}

fn apply_command(
    engine: &mut SessionEngine,
    command: EngineCommand,
    view_tx: &watch::Sender<SessionView>,
    sse: &SseHub,
    store: &Arc<dyn SessionStore>,
) {
    let (result, reply) = match command {
        EngineCommand::Start {
            learner_id,
            activity_id,
            reply,
        } => (engine.start(learner_id, activity_id), reply),
        EngineCommand::ChooseFullscreen { enabled, reply } => {
            (engine.choose_fullscreen(enabled), reply)
        }
        EngineCommand::AcknowledgeInstructions { reply } => {
            (engine.acknowledge_instructions(), reply)
        }
        EngineCommand::ProceedNextLevel { reply } => (engine.proceed_next_level(), reply),
        EngineCommand::Finish { reply } => (engine.finish_early(), reply),
    };

    match result {
        Ok(effects) => {
            let view = publish(engine, &effects, view_tx, sse, store);
            let _ = reply.send(Ok(view));
        }
        Err(err) => {
            let _ = reply.send(Err(err));
        }
    }
}

/// Refresh the watch channel and turn the engine's effects into SSE events
/// and persistence calls.
fn publish(
    engine: &SessionEngine,
    effects: &[Effect],
    view_tx: &watch::Sender<SessionView>,
    sse: &SseHub,
    store: &Arc<dyn SessionStore>,
) -> SessionView {
    let view = SessionView::snapshot(engine);
    view_tx.send_replace(view.clone());

    for effect in effects {
        match effect {
            Effect::PhaseChanged => sse_events::broadcast_phase_changed(sse, &view),
            Effect::RoundStarted {
                level,
                round,
                target_pad,
            } => sse_events::broadcast_round_started(sse, *level, *round, target_pad.clone()),
            Effect::RoundResolved { points, cue } => {
                sse_events::broadcast_round_resolved(sse, *points, *cue, &view);
            }
            Effect::Feedback { cue } => sse_events::broadcast_feedback(sse, *cue, &view.message),
            Effect::Finished(summary) => {
                sse_events::broadcast_session_finished(sse, summary);
                let store = Arc::clone(store);
                let summary = summary.clone();
                tokio::spawn(async move {
                    if let Err(err) = store.log_session(&summary).await {
                        warn!(
                            error = %err,
                            session_id = %summary.session_id,
                            "failed to persist session summary"
                        );
                    }
                });
            }
        }
    }

    view
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{sync::Mutex, time::Duration};

    use futures::future::BoxFuture;

    use crate::{
        dao::StoreResult,
        dto::phase::VisiblePhase,
        engine::{
            levels::{LevelConfig, default_levels},
            session::{Outcome, SessionSummary},
        },
    };

    struct RecordingStore {
        summaries: Mutex<Vec<SessionSummary>>,
    }

    impl SessionStore for RecordingStore {
        fn log_session(&self, summary: &SessionSummary) -> BoxFuture<'_, StoreResult<()>> {
            self.summaries.lock().unwrap().push(summary.clone());
            Box::pin(async { Ok(()) })
        }
    }

    fn harness(levels: Vec<LevelConfig>) -> (EngineHandle, SignalHub, SseHub, Arc<RecordingStore>) {
        let config = Arc::new(AppConfig {
            pads: vec!["RED".into(), "BLUE".into(), "GREEN".into()],
            levels,
        });
        let signals = SignalHub::new(16);
        let sse = SseHub::new(64);
        let store = Arc::new(RecordingStore {
            summaries: Mutex::new(Vec::new()),
        });
        let dyn_store: Arc<dyn SessionStore> = store.clone();
        let handle = spawn_engine(config, &signals, sse.clone(), dyn_store);
        (handle, signals, sse, store)
    }

    async fn wait_for(
        rx: &mut watch::Receiver<SessionView>,
        pred: impl Fn(&SessionView) -> bool,
    ) -> SessionView {
        loop {
            let view = rx.borrow_and_update().clone();
            if pred(&view) {
                return view;
            }
            rx.changed().await.expect("engine task alive");
        }
    }

    fn press(signals: &SignalHub, pad: &str, force: i64) {
        signals.publish(DeviceReading {
            pad: Some(pad.into()),
            force: Some(force),
            ..Default::default()
        });
    }

    async fn drain_spawned_tasks() {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn a_full_untimed_level_plays_through_the_handle() {
        let (handle, signals, sse, store) = harness(vec![default_levels()[0].clone()]);
        let mut rx = handle.watch();
        let mut events = sse.subscribe();

        let view = handle.start(7, 1).await.unwrap();
        assert_eq!(view.phase, VisiblePhase::FullscreenPrompt);
        let event = events.recv().await.unwrap();
        assert_eq!(event.event.as_deref(), Some("phase_changed"));

        handle.choose_fullscreen(true).await.unwrap();
        let view = handle.acknowledge_instructions().await.unwrap();
        assert_eq!(view.phase, VisiblePhase::Playing);
        assert_eq!(view.round, 1);

        for round in 1..=5u32 {
            let view = wait_for(&mut rx, |v| {
                v.phase == VisiblePhase::Playing && v.round == round
            })
            .await;
            let target = view.target_pad.expect("round open");
            press(&signals, &target, 100);
            wait_for(&mut rx, |v| v.phase == VisiblePhase::Feedback).await;
        }

        // 5 successes at 20 points each pass the threshold of 80.
        let view = wait_for(&mut rx, |v| v.phase == VisiblePhase::LevelComplete).await;
        assert_eq!(view.score, 100);

        let view = handle.proceed_next_level().await.unwrap();
        assert_eq!(view.phase, VisiblePhase::Finished);

        drain_spawned_tasks().await;
        let summaries = store.summaries.lock().unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].outcome, Outcome::Completed);
        assert_eq!(summaries[0].total_score, 100);
        assert_eq!(summaries[0].learner_id, 7);
    }

    #[tokio::test(start_paused = true)]
    async fn an_idle_round_times_out_on_its_own() {
        // "Pacing": 10 second rounds. No presses at all.
        let (handle, _signals, _sse, _store) = harness(vec![default_levels()[1].clone()]);
        let mut rx = handle.watch();

        handle.start(7, 1).await.unwrap();
        handle.choose_fullscreen(false).await.unwrap();
        handle.acknowledge_instructions().await.unwrap();

        let view = wait_for(&mut rx, |v| {
            v.phase == VisiblePhase::Playing && v.round == 2
        })
        .await;
        assert_eq!(view.mistakes, 1);
        assert_eq!(view.score, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn reaction_time_drives_the_timed_score() {
        // "Speed": 5 second rounds, pass threshold 75.
        let (handle, signals, _sse, store) = harness(vec![default_levels()[2].clone()]);
        let mut rx = handle.watch();

        handle.start(9, 2).await.unwrap();
        handle.choose_fullscreen(true).await.unwrap();
        handle.acknowledge_instructions().await.unwrap();

        for round in 1..=5u32 {
            let view = wait_for(&mut rx, |v| {
                v.phase == VisiblePhase::Playing && v.round == round
            })
            .await;
            tokio::time::advance(Duration::from_secs(2)).await;
            let target = view.target_pad.expect("round open");
            press(&signals, &target, 100);

            // Two seconds of reaction time cost four half-second bonus points.
            let view = wait_for(&mut rx, |v| v.phase == VisiblePhase::Feedback).await;
            assert_eq!(view.score, 16 * round);
        }

        wait_for(&mut rx, |v| v.phase == VisiblePhase::LevelComplete).await;
        let view = handle.proceed_next_level().await.unwrap();
        assert_eq!(view.phase, VisiblePhase::Finished);

        drain_spawned_tasks().await;
        let summaries = store.summaries.lock().unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].total_score, 80);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_mid_play_persists_exactly_one_summary() {
        let (handle, _signals, _sse, store) = harness(default_levels());

        handle.start(4, 1).await.unwrap();
        handle.choose_fullscreen(true).await.unwrap();
        handle.acknowledge_instructions().await.unwrap();

        let view = handle.finish().await.unwrap();
        assert_eq!(view.phase, VisiblePhase::Finished);
        assert!(handle.finish().await.is_err());

        drain_spawned_tasks().await;
        let summaries = store.summaries.lock().unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].outcome, Outcome::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn starting_twice_is_rejected_with_a_conflict() {
        let (handle, _signals, _sse, _store) = harness(default_levels());

        handle.start(1, 1).await.unwrap();
        let err = handle.start(1, 1).await.unwrap_err();
        assert!(matches!(err, EngineError::InvalidTransition { .. }));
    }
}
