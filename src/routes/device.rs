use axum::{Json, Router, extract::State, routing::post};

use crate::{
    dto::device::{DeviceAck, DeviceReading},
    services::relay_service,
    state::SharedState,
};

/// Routes handling sensor ingress from the pressure-sensing device.
pub fn router() -> Router<SharedState> {
    Router::new().route("/api/fsr", post(ingest_reading))
}

/// Accept one raw reading from the device and fan it out.
#[utoipa::path(
    post,
    path = "/api/fsr",
    tag = "device",
    request_body = DeviceReading,
    responses(
        (status = 200, description = "Reading accepted", body = DeviceAck)
    )
)]
pub async fn ingest_reading(
    State(state): State<SharedState>,
    Json(payload): Json<serde_json::Value>,
) -> Json<DeviceAck> {
    Json(relay_service::ingest(&state, payload))
}
