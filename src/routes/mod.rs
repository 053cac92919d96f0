//! HTTP route trees.

use axum::Router;

use crate::state::SharedState;

/// Sensor ingress routes.
pub mod device;
/// Swagger UI routes.
pub mod docs;
/// Health check routes.
pub mod health;
/// Session lifecycle routes.
pub mod session;
/// Server-sent events routes.
pub mod sse;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(sse::router())
        .merge(device::router())
        .merge(session::router());

    let docs_router = docs::router(state.clone());

    api_router.merge(docs_router).with_state(state)
}
