//! Service layer sitting between the routes and the engine.

/// OpenAPI document assembly.
pub mod documentation;
/// Health status reporting.
pub mod health_service;
/// Device reading ingress and fan-out.
pub mod relay_service;
/// Session lifecycle operations bridging HTTP to the engine task.
pub mod session_service;
/// Typed SSE event construction and broadcasting.
pub mod sse_events;
/// SSE stream plumbing.
pub mod sse_service;
