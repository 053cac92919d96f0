//! Persistence layer for finished session summaries.

/// HTTP-backed store posting summaries to the portal's logging endpoint.
pub mod session_log;

use std::error::Error;

use futures::future::BoxFuture;
use thiserror::Error;
use tracing::debug;

use crate::engine::session::SessionSummary;

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Error raised by session stores regardless of the underlying backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend could not be reached.
    #[error("session store unavailable: {message}")]
    Unavailable {
        /// What the store was doing when the failure occurred.
        message: String,
        /// Underlying transport failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// The backend answered but refused the record.
    #[error("session store rejected the record: {status}")]
    Rejected {
        /// HTTP status returned by the backend.
        status: reqwest::StatusCode,
    },
}

impl StoreError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StoreError::Unavailable {
            message,
            source: Box::new(source),
        }
    }
}

/// Abstraction over the persistence layer for finished sessions.
pub trait SessionStore: Send + Sync {
    /// Record one finished session. Called exactly once per session.
    fn log_session(&self, summary: &SessionSummary) -> BoxFuture<'_, StoreResult<()>>;
}

/// Store used when no logging endpoint is configured. Summaries are dropped
/// after a debug trace so the rest of the application behaves identically.
pub struct NoopSessionStore;

impl SessionStore for NoopSessionStore {
    fn log_session(&self, summary: &SessionSummary) -> BoxFuture<'_, StoreResult<()>> {
        debug!(
            session_id = %summary.session_id,
            score = summary.total_score,
            "no session store configured; dropping summary"
        );
        Box::pin(async { Ok(()) })
    }
}
