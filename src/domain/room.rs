//! Runtime state for one session's live connections.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{ConnectionHandle, ConnectionId, Participants, Role, SessionId};

/// Two role slots plus the identities authorized to fill them.
///
/// A `Room` only lives inside the [`super::RoomRegistry`]; the registry
/// removes it the moment both slots are empty.
#[derive(Debug)]
pub struct Room {
    /// Session this room belongs to (immutable after creation).
    pub session_id: SessionId,

    /// Creation timestamp (immutable after creation).
    pub created_at: DateTime<Utc>,

    therapist: Option<ConnectionHandle>,
    client: Option<ConnectionHandle>,
    therapist_user_id: Option<String>,
    client_user_id: Option<String>,
}

impl Room {
    /// Creates a room with both slots empty.
    #[must_use]
    pub fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            created_at: Utc::now(),
            therapist: None,
            client: None,
            therapist_user_id: None,
            client_user_id: None,
        }
    }

    /// Returns the connection in the given slot, if any.
    #[must_use]
    pub const fn slot(&self, role: Role) -> Option<&ConnectionHandle> {
        match role {
            Role::Therapist => self.therapist.as_ref(),
            Role::Client => self.client.as_ref(),
        }
    }

    /// Returns the user id recorded for a role, even if the slot is
    /// currently empty.
    #[must_use]
    pub fn recorded_user_id(&self, role: Role) -> Option<&str> {
        match role {
            Role::Therapist => self.therapist_user_id.as_deref(),
            Role::Client => self.client_user_id.as_deref(),
        }
    }

    /// Puts `handle` into the slot for `role`, returning the connection it
    /// displaced. The displaced connection is not closed.
    pub fn occupy(
        &mut self,
        role: Role,
        handle: ConnectionHandle,
        user_id: String,
    ) -> Option<ConnectionHandle> {
        let (slot, recorded) = match role {
            Role::Therapist => (&mut self.therapist, &mut self.therapist_user_id),
            Role::Client => (&mut self.client, &mut self.client_user_id),
        };
        *recorded = Some(user_id);
        slot.replace(handle)
    }

    /// Clears the slot for `role` if it is held by `connection_id`.
    ///
    /// Returns `true` if the slot was cleared.
    pub fn vacate(&mut self, role: Role, connection_id: ConnectionId) -> bool {
        let slot = match role {
            Role::Therapist => &mut self.therapist,
            Role::Client => &mut self.client,
        };
        if slot.as_ref().is_some_and(|h| h.id() == connection_id) {
            *slot = None;
            true
        } else {
            false
        }
    }

    /// Returns `true` if `connection_id` occupies either slot.
    #[must_use]
    pub fn holds(&self, connection_id: ConnectionId) -> bool {
        self.occupants().any(|(_, h)| h.id() == connection_id)
    }

    /// Iterates over occupied slots.
    pub fn occupants(&self) -> impl Iterator<Item = (Role, &ConnectionHandle)> {
        [
            (Role::Therapist, self.therapist.as_ref()),
            (Role::Client, self.client.as_ref()),
        ]
        .into_iter()
        .filter_map(|(role, handle)| handle.map(|h| (role, h)))
    }

    /// Returns `true` when neither slot is occupied.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.therapist.is_none() && self.client.is_none()
    }

    /// Returns the slot occupancy summary.
    #[must_use]
    pub const fn participants(&self) -> Participants {
        Participants {
            therapist: self.therapist.is_some(),
            client: self.client.is_some(),
        }
    }
}

/// Diagnostic view of who currently occupies a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomParticipants {
    /// Session identifier.
    pub session_id: SessionId,
    /// User id in the therapist slot, if occupied.
    pub therapist_id: Option<String>,
    /// User id in the client slot, if occupied.
    pub client_id: Option<String>,
    /// Slot occupancy summary.
    pub participants: Participants,
    /// When the room was created.
    pub created_at: DateTime<Utc>,
}

impl From<&Room> for RoomParticipants {
    fn from(room: &Room) -> Self {
        let occupied_id = |role| {
            room.slot(role)
                .and(room.recorded_user_id(role))
                .map(str::to_string)
        };
        Self {
            session_id: room.session_id.clone(),
            therapist_id: occupied_id(Role::Therapist),
            client_id: occupied_id(Role::Client),
            participants: room.participants(),
            created_at: room.created_at,
        }
    }
}
