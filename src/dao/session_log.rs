//! Session store that posts finished summaries to the portal's REST endpoint.

use std::{env, sync::Arc};

use futures::future::BoxFuture;
use reqwest::Client;
use serde::Serialize;
use tracing::info;

use crate::{
    dao::{SessionStore, StoreError, StoreResult},
    engine::session::SessionSummary,
};

/// Environment variable holding the full URL of the logging endpoint.
const LOG_SESSION_URL_ENV: &str = "LOG_SESSION_URL";

/// Record shape expected by the portal's `log-session` endpoint.
#[derive(Debug, Serialize)]
struct LogSessionBody {
    learner_id: i64,
    activity_id: i64,
    performance_score: u32,
    duration: u64,
    engagement_level: crate::engine::scoring::Engagement,
}

impl From<&SessionSummary> for LogSessionBody {
    fn from(summary: &SessionSummary) -> Self {
        Self {
            learner_id: summary.learner_id,
            activity_id: summary.activity_id,
            performance_score: summary.total_score,
            duration: summary.total_duration_seconds,
            engagement_level: summary.engagement_level,
        }
    }
}

/// HTTP client for the portal's session-logging endpoint.
#[derive(Clone)]
pub struct HttpSessionStore {
    client: Client,
    endpoint: Arc<str>,
}

impl HttpSessionStore {
    /// Build a store targeting the given endpoint URL.
    pub fn new(endpoint: &str) -> StoreResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| StoreError::unavailable("building HTTP client".into(), source))?;

        Ok(Self {
            client,
            endpoint: Arc::from(endpoint),
        })
    }

    /// Build a store from the `LOG_SESSION_URL` environment variable.
    ///
    /// Returns `None` when the variable is unset or empty, letting the caller
    /// fall back to the no-op store.
    pub fn from_env() -> Option<StoreResult<Self>> {
        let endpoint = env::var(LOG_SESSION_URL_ENV).ok().filter(|v| !v.is_empty())?;
        info!(%endpoint, "session summaries will be posted to the portal");
        Some(Self::new(&endpoint))
    }
}

impl SessionStore for HttpSessionStore {
    fn log_session(&self, summary: &SessionSummary) -> BoxFuture<'_, StoreResult<()>> {
        let body = LogSessionBody::from(summary);
        Box::pin(async move {
            let response = self
                .client
                .post(self.endpoint.as_ref())
                .json(&body)
                .send()
                .await
                .map_err(|source| {
                    StoreError::unavailable("posting session summary".into(), source)
                })?;

            let status = response.status();
            if status.is_success() {
                Ok(())
            } else {
                Err(StoreError::Rejected { status })
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{scoring::Engagement, session::Outcome};
    use uuid::Uuid;

    #[test]
    fn log_body_flattens_the_summary() {
        let summary = SessionSummary {
            session_id: Uuid::new_v4(),
            learner_id: 7,
            activity_id: 3,
            total_score: 146,
            total_duration_seconds: 92,
            engagement_level: Engagement::High,
            reached_level: 4,
            outcome: Outcome::Completed,
        };

        let body = LogSessionBody::from(&summary);
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["learner_id"], 7);
        assert_eq!(json["performance_score"], 146);
        assert_eq!(json["duration"], 92);
        assert_eq!(json["engagement_level"], "high");
    }
}
