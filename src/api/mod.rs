//! REST API layer: diagnostic handlers, DTOs, router composition, and the
//! OpenAPI document.
//!
//! Resource endpoints are mounted under `/api/v1`; `/health` sits at the
//! root.

pub mod dto;
pub mod handlers;

use axum::Router;
use utoipa::OpenApi;

use crate::app_state::AppState;

/// OpenAPI description of the diagnostic surface.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "session-relay",
        description = "Diagnostics for the realtime therapist/client session relay."
    ),
    paths(
        handlers::system::health_handler,
        handlers::rooms::list_rooms,
        handlers::rooms::get_room,
    ),
    components(schemas(
        handlers::system::HealthResponse,
        dto::ActiveRoomsResponse,
        dto::ParticipantsDto,
        dto::RoomParticipantsResponse,
        crate::error::ErrorResponse,
        crate::error::ErrorBody,
    )),
    tags(
        (name = "System", description = "Service health"),
        (name = "Rooms", description = "Active room diagnostics"),
    )
)]
pub struct ApiDoc;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes())
}
