use crate::{
    dto::game::{FullscreenRequest, SessionView, StartSessionRequest},
    error::ServiceError,
    state::SharedState,
};

/// Start a new session for the given learner and activity.
pub async fn start(
    state: &SharedState,
    request: StartSessionRequest,
) -> Result<SessionView, ServiceError> {
    let view = state
        .engine()
        .start(request.learner_id, request.activity_id)
        .await?;
    Ok(view)
}

/// Record the learner's display-mode choice.
pub async fn choose_fullscreen(
    state: &SharedState,
    request: FullscreenRequest,
) -> Result<SessionView, ServiceError> {
    let view = state.engine().choose_fullscreen(request.enabled).await?;
    Ok(view)
}

/// Acknowledge the level instructions and begin gameplay.
pub async fn acknowledge_instructions(state: &SharedState) -> Result<SessionView, ServiceError> {
    let view = state.engine().acknowledge_instructions().await?;
    Ok(view)
}

/// Advance past a completed level, finishing after the last one.
pub async fn proceed_next_level(state: &SharedState) -> Result<SessionView, ServiceError> {
    let view = state.engine().proceed_next_level().await?;
    Ok(view)
}

/// End the session early, preserving accrued score and time.
pub async fn finish(state: &SharedState) -> Result<SessionView, ServiceError> {
    let view = state.engine().finish().await?;
    Ok(view)
}

/// Current session projection.
pub fn current_view(state: &SharedState) -> SessionView {
    state.engine().view()
}
