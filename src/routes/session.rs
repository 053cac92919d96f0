use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use validator::Validate;

use crate::{
    dto::game::{FullscreenRequest, SessionView, StartSessionRequest},
    error::AppError,
    services::session_service,
    state::SharedState,
};

/// Routes driving the session lifecycle.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/session", get(current_session))
        .route("/session/start", post(start_session))
        .route("/session/fullscreen", post(choose_fullscreen))
        .route("/session/instructions/ack", post(acknowledge_instructions))
        .route("/session/next-level", post(proceed_next_level))
        .route("/session/finish", post(finish_session))
}

/// Start a new session for a learner.
#[utoipa::path(
    post,
    path = "/session/start",
    tag = "session",
    request_body = StartSessionRequest,
    responses(
        (status = 200, description = "Session started", body = SessionView),
        (status = 400, description = "Invalid identifiers"),
        (status = 409, description = "A session is already running")
    )
)]
pub async fn start_session(
    State(state): State<SharedState>,
    Json(payload): Json<StartSessionRequest>,
) -> Result<Json<SessionView>, AppError> {
    payload.validate()?;
    let view = session_service::start(&state, payload).await?;
    Ok(Json(view))
}

/// Record the learner's display-mode choice.
#[utoipa::path(
    post,
    path = "/session/fullscreen",
    tag = "session",
    request_body = FullscreenRequest,
    responses(
        (status = 200, description = "Choice recorded", body = SessionView),
        (status = 409, description = "Not waiting for a display-mode choice")
    )
)]
pub async fn choose_fullscreen(
    State(state): State<SharedState>,
    Json(payload): Json<FullscreenRequest>,
) -> Result<Json<SessionView>, AppError> {
    let view = session_service::choose_fullscreen(&state, payload).await?;
    Ok(Json(view))
}

/// Acknowledge the level instructions and begin gameplay.
#[utoipa::path(
    post,
    path = "/session/instructions/ack",
    tag = "session",
    responses(
        (status = 200, description = "Level started", body = SessionView),
        (status = 409, description = "Not showing instructions")
    )
)]
pub async fn acknowledge_instructions(
    State(state): State<SharedState>,
) -> Result<Json<SessionView>, AppError> {
    let view = session_service::acknowledge_instructions(&state).await?;
    Ok(Json(view))
}

/// Advance past a completed level, finishing the session after the last one.
#[utoipa::path(
    post,
    path = "/session/next-level",
    tag = "session",
    responses(
        (status = 200, description = "Advanced to the next level", body = SessionView),
        (status = 409, description = "No completed level to advance from")
    )
)]
pub async fn proceed_next_level(
    State(state): State<SharedState>,
) -> Result<Json<SessionView>, AppError> {
    let view = session_service::proceed_next_level(&state).await?;
    Ok(Json(view))
}

/// End the session early, preserving accrued score and time.
#[utoipa::path(
    post,
    path = "/session/finish",
    tag = "session",
    responses(
        (status = 200, description = "Session finished", body = SessionView),
        (status = 409, description = "No session to finish")
    )
)]
pub async fn finish_session(
    State(state): State<SharedState>,
) -> Result<Json<SessionView>, AppError> {
    let view = session_service::finish(&state).await?;
    Ok(Json(view))
}

/// Current session projection.
#[utoipa::path(
    get,
    path = "/session",
    tag = "session",
    responses(
        (status = 200, description = "Current session state", body = SessionView)
    )
)]
pub async fn current_session(State(state): State<SharedState>) -> Json<SessionView> {
    Json(session_service::current_view(&state))
}
