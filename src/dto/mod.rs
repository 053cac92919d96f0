//! Request, response, and event payload shapes.

/// Raw payloads exchanged with the pressure-sensing device.
pub mod device;
/// Session requests and the client-facing state projection.
pub mod game;
/// Health check response shape.
pub mod health;
/// Client-facing session phase.
pub mod phase;
/// Server-sent event envelope and payloads.
pub mod sse;
