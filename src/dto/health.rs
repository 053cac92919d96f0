use serde::Serialize;
use utoipa::ToSchema;

use crate::dto::phase::VisiblePhase;

/// Simple health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status ("ok").
    pub status: String,
    /// Current session phase, as a cheap liveness hint for the frontend.
    pub phase: VisiblePhase,
}

impl HealthResponse {
    /// Create a health response indicating the system is operational.
    pub fn ok(phase: VisiblePhase) -> Self {
        Self {
            status: "ok".to_string(),
            phase,
        }
    }
}
