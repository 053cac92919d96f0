use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Color Match Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::sse::events_stream,
        crate::routes::device::ingest_reading,
        crate::routes::session::start_session,
        crate::routes::session::choose_fullscreen,
        crate::routes::session::acknowledge_instructions,
        crate::routes::session::proceed_next_level,
        crate::routes::session::finish_session,
        crate::routes::session::current_session,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::device::DeviceReading,
            crate::dto::device::DeviceAck,
            crate::dto::game::StartSessionRequest,
            crate::dto::game::FullscreenRequest,
            crate::dto::game::SessionView,
            crate::dto::phase::VisiblePhase,
            crate::dto::sse::RoundStartedEvent,
            crate::dto::sse::RoundResolvedEvent,
            crate::dto::sse::FeedbackEvent,
            crate::engine::levels::LevelConfig,
            crate::engine::scoring::Engagement,
            crate::engine::session::FeedbackCue,
            crate::engine::session::Outcome,
            crate::engine::session::SessionSummary,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "sse", description = "Server-sent events stream"),
        (name = "device", description = "Sensor ingress for the pressure pads"),
        (name = "session", description = "Color-match session lifecycle"),
    )
)]
pub struct ApiDoc;
