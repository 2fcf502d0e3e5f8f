//! Room diagnostics: list active rooms and inspect occupants.
//!
//! Operator-facing only; protocol participants never call these.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{ActiveRoomsResponse, RoomParticipantsResponse};
use crate::app_state::AppState;
use crate::domain::SessionId;
use crate::error::{ErrorResponse, RelayError};

/// `GET /rooms` — List session ids with an active room.
#[utoipa::path(
    get,
    path = "/api/v1/rooms",
    tag = "Rooms",
    summary = "List active rooms",
    description = "Returns the ids of every session that currently has at least one connected participant.",
    responses(
        (status = 200, description = "Active rooms", body = ActiveRoomsResponse),
    )
)]
pub async fn list_rooms(State(state): State<AppState>) -> impl IntoResponse {
    let sessions: Vec<String> = state
        .relay
        .active_sessions()
        .await
        .into_iter()
        .map(|id| id.to_string())
        .collect();

    Json(ActiveRoomsResponse {
        count: sessions.len(),
        sessions,
    })
}

/// `GET /rooms/{session_id}` — Who currently occupies a room.
///
/// # Errors
///
/// Returns [`RelayError::RoomNotFound`] if the session has no active room.
#[utoipa::path(
    get,
    path = "/api/v1/rooms/{session_id}",
    tag = "Rooms",
    summary = "Get room participants",
    description = "Returns the user ids occupying the therapist and client slots of an active room.",
    params(
        ("session_id" = String, Path, description = "Session identifier"),
    ),
    responses(
        (status = 200, description = "Room participants", body = RoomParticipantsResponse),
        (status = 404, description = "No active room", body = ErrorResponse),
    )
)]
pub async fn get_room(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<RoomParticipantsResponse>, RelayError> {
    let view = state
        .relay
        .room_participants(&SessionId::new(session_id.as_str()))
        .await
        .ok_or(RelayError::RoomNotFound(session_id))?;

    Ok(Json(view.into()))
}

/// Room diagnostics routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/rooms", get(list_rooms))
        .route("/rooms/{session_id}", get(get_room))
}
