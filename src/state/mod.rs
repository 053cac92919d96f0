//! Shared application state wiring the hubs and the engine handle together.

mod signals;
mod sse;

use std::sync::Arc;

use crate::{
    config::AppConfig,
    dao::SessionStore,
    engine::runner::{EngineHandle, spawn_engine},
};

pub use self::signals::SignalHub;
pub use self::sse::SseHub;

/// Cheaply clonable handle to the application state.
pub type SharedState = Arc<AppState>;

/// Central application state shared across every route handler.
pub struct AppState {
    config: Arc<AppConfig>,
    signals: SignalHub,
    sse: SseHub,
    engine: EngineHandle,
}

impl AppState {
    /// Construct the shared state and spawn the engine task.
    pub fn new(config: AppConfig, store: Arc<dyn SessionStore>) -> SharedState {
        let config = Arc::new(config);
        let signals = SignalHub::new(64);
        let sse = SseHub::new(16);
        let engine = spawn_engine(Arc::clone(&config), &signals, sse.clone(), store);

        Arc::new(Self {
            config,
            signals,
            sse,
            engine,
        })
    }

    /// Runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Hub carrying raw device readings to the engine.
    pub fn signals(&self) -> &SignalHub {
        &self.signals
    }

    /// Broadcast hub used for the SSE stream.
    pub fn sse(&self) -> &SseHub {
        &self.sse
    }

    /// Handle to the engine task.
    pub fn engine(&self) -> &EngineHandle {
        &self.engine
    }
}
