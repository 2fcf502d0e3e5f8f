//! Room diagnostics DTOs.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{Participants, RoomParticipants};

/// Response body for `GET /api/v1/rooms`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ActiveRoomsResponse {
    /// Session ids with an active room, sorted.
    pub sessions: Vec<String>,
    /// Number of active rooms.
    pub count: usize,
}

/// Slot occupancy flags.
#[derive(Debug, Serialize, ToSchema)]
pub struct ParticipantsDto {
    /// Whether the therapist slot is occupied.
    pub therapist: bool,
    /// Whether the client slot is occupied.
    pub client: bool,
}

impl From<Participants> for ParticipantsDto {
    fn from(p: Participants) -> Self {
        Self {
            therapist: p.therapist,
            client: p.client,
        }
    }
}

/// Response body for `GET /api/v1/rooms/{session_id}`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoomParticipantsResponse {
    /// Session identifier.
    pub session_id: String,
    /// User id occupying the therapist slot.
    pub therapist_id: Option<String>,
    /// User id occupying the client slot.
    pub client_id: Option<String>,
    /// Slot occupancy flags.
    pub participants: ParticipantsDto,
    /// When the room was created.
    pub created_at: DateTime<Utc>,
}

impl From<RoomParticipants> for RoomParticipantsResponse {
    fn from(view: RoomParticipants) -> Self {
        Self {
            session_id: view.session_id.to_string(),
            therapist_id: view.therapist_id,
            client_id: view.client_id,
            participants: view.participants.into(),
            created_at: view.created_at,
        }
    }
}
