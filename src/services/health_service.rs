use crate::{dto::health::HealthResponse, state::SharedState};

/// Respond with a static health payload plus the current session phase.
pub fn health_status(state: &SharedState) -> HealthResponse {
    let view = state.engine().view();
    HealthResponse::ok(view.phase)
}
